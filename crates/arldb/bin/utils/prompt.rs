use std::io::Write;

use arldb_backend::error::InputError;
use arldb_frontend::input::Prompt;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use yansi::Paint;

/// Asks questions on stderr and reads the answers from stdin.
pub struct StdinPrompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self { lines: BufReader::new(tokio::io::stdin()).lines() }
    }
}

#[async_trait]
impl Prompt for StdinPrompt {
    async fn ask(&mut self, question: &str) -> Option<String> {
        eprint!("{} ", format!("{question}:").bold());
        let _ = std::io::stderr().flush();

        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read from stdin: {e}");
                None
            }
        }
    }

    fn reject(&mut self, error: &InputError) {
        eprintln!("{}", error.red());
    }
}
