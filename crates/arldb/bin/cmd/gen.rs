use std::{path::PathBuf, str::FromStr};

use arldb_backend::tools::{Target, Toolchain};
use clap::Parser;
use eyre::{Result, WrapErr};
use yansi::Paint;

use crate::opts::ToolOpts;

/// CLI arguments for `arldb gen`.
#[derive(Clone, Debug, Parser)]
pub struct GenArgs {
    /// The Archetype contract.
    pub source: PathBuf,

    /// What to generate: michelson, michelson-storage, javascript, markdown, whyml or
    /// debug-trace.
    #[arg(long, short, value_parser = Target::from_str)]
    pub target: Target,

    /// Print the generated code instead of writing it next to the source.
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub tools: ToolOpts,
}

impl GenArgs {
    pub async fn run(self) -> Result<()> {
        let toolchain = Toolchain::new(self.tools.config()?);
        let code = toolchain.compile(&self.source, self.target).await?;

        if self.stdout {
            print!("{code}");
            return Ok(());
        }

        let output = self.target.output_path(&self.source);
        tokio::fs::write(&output, code)
            .await
            .wrap_err_with(|| format!("failed to write {}", output.display()))?;
        eprintln!("{} {}", "Generated".green(), output.display());
        Ok(())
    }
}
