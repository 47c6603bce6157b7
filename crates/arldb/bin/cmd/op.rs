use std::path::PathBuf;

use arldb_backend::operation::{parse_operation, Operation};
use clap::Parser;
use eyre::{Result, WrapErr};

use crate::utils::read_file;

/// CLI arguments for `arldb op`.
#[derive(Clone, Debug, Parser)]
pub struct OpArgs {
    /// JSON files holding one operation receipt or an array of them.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl OpArgs {
    pub async fn run(self) -> Result<()> {
        for file in &self.files {
            let content = read_file(file).await?;
            let operations = decode(&content).wrap_err_with(|| format!("in {}", file.display()))?;
            for op in operations {
                println!("#{} {}: {op}", op.nonce(), op.source());
            }
        }
        Ok(())
    }
}

fn decode(content: &str) -> Result<Vec<Operation>> {
    if content.trim_start().starts_with('[') {
        Ok(serde_json::from_str(content).wrap_err("not a list of tezos operations")?)
    } else {
        Ok(vec![parse_operation(content)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list() {
        let ops = decode(
            r#"[{"kind": "delegation", "source": "KT1A", "nonce": 1},
                {"kind": "event", "source": "KT1A", "nonce": 2, "type": {"prim": "nat"}, "payload": {"int": "1"}}]"#,
        )
        .unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].to_string(), "delegation withdrawal");
        assert_eq!(ops[1].nonce(), 2);
    }

    #[test]
    fn test_decode_single() {
        let ops = decode(r#"{"kind": "delegation", "source": "KT1A", "nonce": 0, "delegate": "tz1B"}"#).unwrap();
        assert_eq!(ops[0].to_string(), "delegation to tz1B");
        assert!(decode("{}").is_err());
    }
}
