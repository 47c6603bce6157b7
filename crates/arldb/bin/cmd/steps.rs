use std::path::PathBuf;

use arldb_backend::{
    analysis::GAS_SCALE,
    artifact::{Bound, DebugData, Step},
    reconstruct, DebugArtifact,
};
use clap::Parser;
use eyre::Result;
use itertools::Itertools;
use yansi::Paint;

use crate::utils::read_file;

/// A traced run and the debug information of its contract.
#[derive(Clone, Debug, Parser)]
pub struct RunFiles {
    /// The debug information generated by `archetype -t debug-trace`.
    #[arg(long, short = 'd', value_name = "FILE")]
    pub debug_json: PathBuf,

    /// The output of `octez-client run script ... --trace-stack`.
    pub trace: PathBuf,
}

impl RunFiles {
    pub async fn load(&self) -> Result<DebugArtifact> {
        let debug = DebugData::from_json(&read_file(&self.debug_json).await?)?;
        let raw = read_file(&self.trace).await?;
        reconstruct(debug, raw)
    }
}

/// CLI arguments for `arldb steps`.
#[derive(Clone, Debug, Parser)]
pub struct StepsArgs {
    #[command(flatten)]
    pub files: RunFiles,

    /// Print the steps as JSON.
    #[arg(long)]
    pub json: bool,
}

impl StepsArgs {
    pub async fn run(self) -> Result<()> {
        let artifact = self.files.load().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&*artifact.execution)?);
            return Ok(());
        }

        for (i, step) in artifact.execution.steps.iter().enumerate() {
            println!("{}", render_step(i, step));
        }
        if let Some(fail) = &artifact.execution.fail {
            println!("{} {fail}", "failed with".red());
        }
        Ok(())
    }
}

/// One line per step: index, position, gas and bindings.
pub fn render_step(index: usize, step: &Step) -> String {
    let position = match (&step.range, &step.decl_bound) {
        (Some(range), _) => format!(
            "{}:{}-{}:{}",
            range.begin.line, range.begin.col, range.end.line, range.end.col
        ),
        (None, Some(bound)) => {
            let side = match bound.bound {
                Bound::Begin => "begin",
                Bound::End => "end",
            };
            format!("{} {} {side}", bound.kind, bound.name)
        }
        (None, None) => String::new(),
    };
    let bindings = step.stack.iter().map(|item| format!("{} = {}", item.name, item.value)).join(", ");

    format!(
        "{} {position:<16} gas {:<8} {bindings}",
        format!("[{index}]").cyan(),
        step.gas / GAS_SCALE
    )
}
