//! Operations emitted by a contract call, as found in the JSON receipts of the sandbox.

use std::fmt;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Operation {
    Transaction {
        source: String,
        nonce: u64,
        amount: String,
        destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameters: Option<Parameters>,
    },
    Event {
        source: String,
        nonce: u64,
        #[serde(rename = "type")]
        ty: Value,
        payload: Value,
    },
    Delegation {
        source: String,
        nonce: u64,
        #[serde(default)]
        delegate: Option<String>,
    },
    Origination {
        source: String,
        nonce: u64,
        balance: String,
        script: Script,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub entrypoint: String,
    /// Micheline JSON of the argument.
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub code: Value,
    pub storage: Value,
}

impl Operation {
    pub fn source(&self) -> &str {
        match self {
            Self::Transaction { source, .. }
            | Self::Event { source, .. }
            | Self::Delegation { source, .. }
            | Self::Origination { source, .. } => source,
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            Self::Transaction { nonce, .. }
            | Self::Event { nonce, .. }
            | Self::Delegation { nonce, .. }
            | Self::Origination { nonce, .. } => *nonce,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction { amount, destination, parameters, .. } => {
                write!(f, "transaction of {amount} to {destination}")?;
                if let Some(p) = parameters {
                    write!(f, " (%{} {})", p.entrypoint, p.value)?;
                }
                Ok(())
            }
            Self::Event { ty, payload, .. } => write!(f, "event {ty}: {payload}"),
            Self::Delegation { delegate: Some(delegate), .. } => write!(f, "delegation to {delegate}"),
            Self::Delegation { delegate: None, .. } => write!(f, "delegation withdrawal"),
            Self::Origination { balance, .. } => write!(f, "origination with balance {balance}"),
        }
    }
}

/// Decodes one operation receipt.
pub fn parse_operation(data: &str) -> Result<Operation> {
    serde_json::from_str(data).wrap_err("not a tezos operation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction() {
        let op = parse_operation(
            r#"{"kind": "transaction", "source": "KT1A", "nonce": 0, "amount": "1000",
                "destination": "tz1B", "parameters": {"entrypoint": "exec", "value": {"int": "2"}}}"#,
        )
        .unwrap();
        assert_eq!(op.source(), "KT1A");
        assert_eq!(op.nonce(), 0);
        assert_eq!(op.to_string(), r#"transaction of 1000 to tz1B (%exec {"int":"2"})"#);
    }

    #[test]
    fn test_other_kinds() {
        let event = parse_operation(
            r#"{"kind": "event", "source": "KT1A", "nonce": 1, "type": {"prim": "nat"}, "payload": {"int": "3"}}"#,
        )
        .unwrap();
        assert_eq!(event.to_string(), r#"event {"prim":"nat"}: {"int":"3"}"#);

        let delegation =
            parse_operation(r#"{"kind": "delegation", "source": "KT1A", "nonce": 2}"#).unwrap();
        assert_eq!(delegation.to_string(), "delegation withdrawal");

        let origination = parse_operation(
            r#"{"kind": "origination", "source": "KT1A", "nonce": 3, "balance": "0",
                "script": {"code": [], "storage": {"int": "0"}}}"#,
        )
        .unwrap();
        assert_eq!(origination.nonce(), 3);
        assert!(matches!(origination, Operation::Origination { .. }));
    }

    #[test]
    fn test_invalid_operations() {
        assert!(parse_operation(r#"{"kind": "reveal", "source": "tz1", "nonce": 0}"#).is_err());
        assert!(parse_operation(r#"{"kind": "transaction", "source": "KT1A", "nonce": 0}"#).is_err());
        assert!(parse_operation("[]").is_err());
    }
}
