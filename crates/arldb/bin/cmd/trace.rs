use std::path::PathBuf;

use arldb_backend::trace::{parse_trace, Trace};
use clap::Parser;
use eyre::Result;
use itertools::Itertools;
use yansi::Paint;

use crate::utils::read_file;

/// CLI arguments for `arldb trace`.
#[derive(Clone, Debug, Parser)]
pub struct TraceArgs {
    /// The output of `octez-client run script ... --trace-stack`.
    pub trace: PathBuf,

    /// Print the lexed trace as JSON.
    #[arg(long)]
    pub json: bool,
}

impl TraceArgs {
    pub async fn run(self) -> Result<()> {
        let raw = read_file(&self.trace).await?;
        let trace = parse_trace(&raw)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&trace)?);
        } else {
            print!("{}", render(&trace));
        }
        Ok(())
    }
}

fn render(trace: &Trace) -> String {
    let mut out = String::new();
    for (i, item) in trace.items.iter().enumerate() {
        out.push_str(&format!(
            "{} location {} gas {}\n    [{}]\n",
            format!("#{i}").cyan(),
            item.location,
            item.gas,
            item.stack.iter().join(" | ")
        ));
    }
    if let Some(fail) = &trace.fail {
        out.push_str(&format!("{} {fail}\n", "failed with".red()));
    }
    out
}

#[cfg(test)]
mod tests {
    use arldb_backend::trace::RawTraceItem;

    use super::*;

    #[test]
    fn test_render() {
        yansi::disable();
        let trace = Trace {
            fail: Some("\"boom\"".to_string()),
            items: vec![RawTraceItem { location: 7, gas: 0.01, stack: vec!["1".to_string(), "Unit".to_string()] }],
        };
        assert_eq!(render(&trace), "#0 location 7 gas 0.01\n    [1 | Unit]\nfailed with \"boom\"\n");
    }
}
