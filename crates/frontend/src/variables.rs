use std::fmt;

use arldb_backend::artifact::StackItemValue;
use strum::{Display, EnumIter, EnumString};

/// Scopes shown in the variables view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum VariableCategory {
    Storage,
    Inputs,
    Locals,
    Constants,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl From<&StackItemValue> for Variable {
    fn from(item: &StackItemValue) -> Self {
        Self::new(&item.name, &item.value)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}
