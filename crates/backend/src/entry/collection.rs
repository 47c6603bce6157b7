use std::fmt;

use itertools::Itertools;

use super::{args_to_mich, ArgType, EntryArg};
use crate::error::InputError;

/// An entrypoint call: the entrypoint name and its validated arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    args: Vec<EntryArg>,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: vec![] }
    }

    pub fn add_arg(&mut self, name: &str, value: &str, ty: ArgType) -> Result<(), InputError> {
        self.args.push(EntryArg::new(name, value, ty)?);
        Ok(())
    }

    pub fn args(&self) -> &[EntryArg] {
        &self.args
    }

    pub fn arg_names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|arg| arg.name.as_str())
    }

    /// The call parameter.
    pub fn to_michelson(&self) -> String {
        args_to_mich(&self.args)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().join(", "))
    }
}

/// Initial storage of a run, one validated element per storage field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
    elements: Vec<EntryArg>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, name: &str, value: &str, ty: ArgType) -> Result<(), InputError> {
        self.elements.push(EntryArg::new(name, value, ty)?);
        Ok(())
    }

    pub fn elements(&self) -> &[EntryArg] {
        &self.elements
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|arg| arg.name.as_str())
    }

    /// The storage value, fields right-folded into pairs in declaration order.
    pub fn to_michelson(&self) -> String {
        args_to_mich(&self.elements)
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.elements.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entrypoint() {
        let mut ep = EntryPoint::new("exec");
        ep.add_arg("v", "2", ArgType::Nat).unwrap();
        ep.add_arg("msg", "\"hi\"", ArgType::String).unwrap();
        assert!(ep.add_arg("bad", "-2", ArgType::Nat).is_err());

        assert_eq!(ep.args().len(), 2);
        assert_eq!(ep.arg_names().collect::<Vec<_>>(), vec!["v", "msg"]);
        assert_eq!(ep.to_michelson(), "(Pair 2 \"hi\")");
        assert_eq!(ep.to_string(), "exec(v: nat = 2, msg: string = hi)");
        assert_eq!(EntryPoint::new("default").to_michelson(), "Unit");
    }

    #[test]
    fn test_storage() {
        let mut storage = Storage::new();
        storage.add_element("a", "0", ArgType::Nat).unwrap();
        storage.add_element("owner", "tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg", ArgType::Address).unwrap();
        storage.add_element("m", "{}", "(map nat nat)".parse().unwrap()).unwrap();

        assert_eq!(storage.names().collect::<Vec<_>>(), vec!["a", "owner", "m"]);
        assert_eq!(
            storage.to_michelson(),
            "(Pair 0 (Pair \"tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg\" {}))"
        );
        assert_eq!(storage.to_string(), "[a: nat = 0, owner: address = tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg, m: (map nat nat) = {}]");
    }
}
