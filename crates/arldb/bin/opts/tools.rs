use std::path::PathBuf;

use arldb_utils::config::{ToolConfig, ToolOverrides};
use clap::Parser;
use eyre::Result;
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize, Parser)]
pub struct ToolOpts {
    /// The configuration file. If not provided, `~/.arldb/config.toml` is used when it exists.
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The archetype compiler.
    #[clap(long, env = "ARLDB_ARCHETYPE_BIN", value_name = "BIN")]
    pub archetype_bin: Option<PathBuf>,

    /// The octez client used to run scripts.
    #[clap(long, env = "ARLDB_OCTEZ_CLIENT", value_name = "BIN")]
    pub octez_client: Option<PathBuf>,

    /// The address deploying and calling the contract.
    #[clap(long, value_name = "ADDRESS")]
    pub caller: Option<String>,
}

impl ToolOpts {
    /// The configuration file, overridden by the command line.
    pub fn config(&self) -> Result<ToolConfig> {
        let config = ToolConfig::load(self.config.as_deref())?;
        Ok(config.merge(ToolOverrides {
            archetype_bin: self.archetype_bin.clone(),
            octez_client_bin: self.octez_client.clone(),
            caller: self.caller.clone(),
        }))
    }
}
