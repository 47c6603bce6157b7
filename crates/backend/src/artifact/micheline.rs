use serde::{Deserialize, Serialize};

/// A node of the compiled contract in Micheline JSON form, as emitted by the compiler with
/// debug information attached to primitive applications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Micheline {
    Seq(Vec<Micheline>),
    Prim(Prim),
    Int { int: String },
    Bytes { bytes: String },
    String { string: String },
}

/// A primitive application, e.g. `{"prim": "PUSH", "args": [{"prim": "nat"}, {"int": "2"}]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prim {
    pub prim: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Micheline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugAnnotation>,
}

impl Micheline {
    pub fn prim(prim: impl Into<String>, args: Vec<Micheline>) -> Self {
        Self::Prim(Prim { prim: prim.into(), args, annots: vec![], debug: None })
    }

    /// Children in traversal order: the arguments of a primitive application or the elements
    /// of a sequence. Literals have none.
    pub fn children(&self) -> &[Micheline] {
        match self {
            Self::Seq(items) => items,
            Self::Prim(prim) => &prim.args,
            Self::Int { .. } | Self::Bytes { .. } | Self::String { .. } => &[],
        }
    }

    pub fn debug(&self) -> Option<&DebugAnnotation> {
        match self {
            Self::Prim(prim) => prim.debug.as_ref(),
            _ => None,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Seq(_) => "{ ... }",
            Self::Prim(prim) => &prim.prim,
            Self::Int { int } => int,
            Self::Bytes { bytes } => bytes,
            Self::String { string } => string,
        }
    }
}

/// Debug payload the compiler attaches to an instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugAnnotation {
    /// Source names of the stack slots, top of stack first.
    #[serde(default)]
    pub stack: Vec<StackName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decl_bound: Option<DeclBound>,
}

impl DebugAnnotation {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(|item| item.name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackName {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// Path of the source file.
    pub name: String,
    pub begin: Position,
    pub end: Position,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
    /// Character offset from the start of the file.
    pub char: u32,
}

/// Entry or exit of a declaration (entrypoint, view, function).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclBound {
    pub kind: String,
    pub name: String,
    pub bound: Bound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Begin,
    End,
}
