use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use super::{micheline::Micheline, Position};
use crate::{
    analysis::{build_execution, LocationMap},
    error::TraceError,
    trace::Trace,
};

/// The debug document produced by `archetype -t debug-trace`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugData {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<Interface>,
    /// The compiled contract, with debug annotations.
    pub contract: Micheline,
}

/// Declared surface of the contract.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub entrypoints: Vec<EntrypointDecl>,
    #[serde(default)]
    pub storage: Vec<FieldDecl>,
    #[serde(default)]
    pub const_params: Vec<FieldDecl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntrypointDecl {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DeclRange>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgDecl {
    pub name: String,
    #[serde(rename = "type_")]
    pub ty: String,
}

/// A storage field or a constant parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type_")]
    pub ty: String,
    /// Initial value, in Michelson syntax, when the source declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclRange {
    pub name: String,
    #[serde(rename = "begin_")]
    pub begin: Position,
    #[serde(rename = "end_")]
    pub end: Position,
}

impl DebugData {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).wrap_err("invalid debug document")
    }

    pub fn location_map(&self) -> LocationMap<'_> {
        LocationMap::build(&self.contract)
    }

    /// Reconstructs the source-level execution of `trace` against this contract.
    pub fn build_execution(&self, trace: &Trace) -> Result<super::ArchetypeTrace, TraceError> {
        build_execution(&self.location_map(), trace)
    }

    pub fn interface(&self) -> Interface {
        self.interface.clone().unwrap_or_default()
    }

    pub fn entrypoint(&self, name: &str) -> Option<&EntrypointDecl> {
        self.interface.as_ref()?.entrypoints.iter().find(|e| e.name == name)
    }

    pub fn storage_names(&self) -> Vec<&str> {
        self.interface
            .as_ref()
            .map(|i| i.storage.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Argument names of the entrypoint `name`.
    pub fn input_names(&self, name: &str) -> Vec<&str> {
        self.entrypoint(name).map(|e| e.args.iter().map(|a| a.name.as_str()).collect()).unwrap_or_default()
    }
}
