use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use eyre::Result;

use crate::args::ArldbArgs;

/// CLI arguments for `arldb completions`.
#[derive(Clone, Debug, Parser)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    pub fn run(self) -> Result<()> {
        clap_complete::generate(self.shell, &mut ArldbArgs::command(), "arldb", &mut std::io::stdout());
        Ok(())
    }
}
