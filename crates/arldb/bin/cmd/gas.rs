use arldb_backend::analysis::GasMap;
use clap::Parser;
use eyre::Result;
use itertools::Itertools;
use yansi::Paint;

use super::steps::RunFiles;

/// CLI arguments for `arldb gas`.
#[derive(Clone, Debug, Parser)]
pub struct GasArgs {
    #[command(flatten)]
    pub files: RunFiles,

    /// Print the gas map as JSON.
    #[arg(long)]
    pub json: bool,
}

impl GasArgs {
    pub async fn run(self) -> Result<()> {
        let artifact = self.files.load().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&artifact.gas)?);
        } else {
            print!("{}", render_gas(&artifact.gas));
        }
        Ok(())
    }
}

/// One line per source line, each visit with its gas and the running total.
pub fn render_gas(gas: &GasMap) -> String {
    gas.iter()
        .map(|(line, visits)| {
            let visits = visits.iter().map(|v| format!("{} (total {})", v.gas, v.totalgas)).join(", ");
            format!("{} {visits}\n", format!("line {line}:").bold())
        })
        .collect()
}
