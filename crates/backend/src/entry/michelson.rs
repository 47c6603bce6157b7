use serde::{Deserialize, Serialize};

use super::EntryArg;

/// Right-folds values into nested pairs: `Unit`, `a`, `(Pair a b)`, `(Pair a (Pair b c))`, ...
pub fn to_pair<S: AsRef<str>>(elements: &[S]) -> String {
    match elements {
        [] => "Unit".to_string(),
        [single] => single.as_ref().to_string(),
        [first, rest @ ..] => format!("(Pair {} {})", first.as_ref(), to_pair(rest)),
    }
}

/// Michelson value of an argument list, in the calling convention of the compiled contract.
pub fn args_to_mich(args: &[EntryArg]) -> String {
    let values: Vec<_> = args.iter().map(EntryArg::to_michelson).collect();
    to_pair(&values)
}

/// A named Michelson value substituted in generated code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstParam {
    pub name: String,
    pub value: String,
}

impl ConstParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// The placeholder the compiler emits for this parameter.
    pub fn placeholder(&self) -> String {
        format!("const_{}__", self.name)
    }

    /// The value as it must be spliced into code: compound values are parenthesized,
    /// sequences (`{ ... }`) are not.
    pub fn code_value(&self) -> String {
        let value = self.value.trim();
        let is_block = value.starts_with('{') && value.ends_with('}');
        if !is_block && value.contains(' ') {
            format!("({value})")
        } else {
            value.to_string()
        }
    }
}

/// Replaces every `const_<name>__` placeholder of `code` by the value of the parameter.
pub fn process_const_params(code: &str, params: &[ConstParam]) -> String {
    params.iter().fold(code.to_string(), |code, param| {
        code.replace(&param.placeholder(), &param.code_value())
    })
}
