use serde::{Deserialize, Serialize};

use super::micheline::{Bound, DeclBound, SourceRange};

/// A named stack slot at a given step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItemValue {
    pub name: String,
    pub value: String,
}

/// A source-level step of the debugger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub stack: Vec<StackItemValue>,
    /// Gas charged since the previous step, in milligas.
    pub gas: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decl_bound: Option<DeclBound>,
}

impl Step {
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.stack.iter().find(|item| item.name == name).map(|item| item.value.as_str())
    }

    /// Returns the declaration name if this step enters a declaration.
    pub fn entered_decl(&self) -> Option<&str> {
        self.decl_bound.as_ref().filter(|b| b.bound == Bound::Begin).map(|b| b.name.as_str())
    }

    pub fn line(&self) -> Option<u32> {
        self.range.as_ref().map(|r| r.end.line)
    }
}

/// The reconstructed source-level execution of a script run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    pub steps: Vec<Step>,
}

impl ArchetypeTrace {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total gas of the run, in milligas.
    pub fn total_gas(&self) -> f64 {
        self.steps.iter().map(|s| s.gas).sum()
    }
}
