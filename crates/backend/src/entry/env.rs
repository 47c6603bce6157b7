use num_bigint::BigInt;

use super::arg::{is_address, is_nat, parse_integer};
use crate::{
    error::InputError,
    utils::date::{current_date_time, date_string_to_seconds, is_date},
};

const MUTEZ_PER_TEZ: u32 = 1_000_000;

/// Execution environment of a run: the values of `now`, `transferred`, `balance`, `level`,
/// `caller` and `source` as seen by the contract.
///
/// Amounts are in mutez, `now` is a local `YYYY-MM-DD hh:mm:ss` date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractEnv {
    now: String,
    transferred: String,
    balance: String,
    level: String,
    caller: String,
    source: String,
}

impl ContractEnv {
    /// Environment at the current time with nothing transferred, `caller` being both the
    /// sender and the source.
    pub fn new(caller: impl Into<String>) -> Self {
        let caller = caller.into();
        Self {
            now: current_date_time(),
            transferred: "0".to_string(),
            balance: "0".to_string(),
            level: "1".to_string(),
            source: caller.clone(),
            caller,
        }
    }

    pub fn set_transferred(&mut self, value: &str) -> Result<(), InputError> {
        self.transferred = nat(value, "transferred", "should be a positive integer value")?;
        Ok(())
    }

    pub fn set_caller(&mut self, value: &str) -> Result<(), InputError> {
        self.caller = address(value, "caller")?;
        Ok(())
    }

    pub fn set_source(&mut self, value: &str) -> Result<(), InputError> {
        self.source = address(value, "source")?;
        Ok(())
    }

    pub fn set_now(&mut self, value: &str) -> Result<(), InputError> {
        if !is_date(value.trim()) {
            return Err(InputError::new("now", "invalid date value (should not have milliseconds)"));
        }
        self.now = value.trim().to_string();
        Ok(())
    }

    pub fn set_level(&mut self, value: &str) -> Result<(), InputError> {
        self.level = nat(value, "level", "should be a positive integer")?;
        Ok(())
    }

    pub fn set_balance(&mut self, value: &str) -> Result<(), InputError> {
        self.balance = nat(value, "balance", "should be a positive integer")?;
        Ok(())
    }

    pub fn now(&self) -> &str {
        &self.now
    }

    pub fn transferred(&self) -> &str {
        &self.transferred
    }

    pub fn balance(&self) -> &str {
        &self.balance
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Named values, in display order.
    pub fn constants(&self) -> [(&'static str, &str); 6] {
        [
            ("now", self.now.as_str()),
            ("transferred", self.transferred.as_str()),
            ("balance", self.balance.as_str()),
            ("level", self.level.as_str()),
            ("caller", self.caller.as_str()),
            ("source", self.source.as_str()),
        ]
    }

    /// Sandbox flags reproducing this environment for `octez-client run script`.
    pub fn run_script_args(&self) -> Vec<String> {
        let now = date_string_to_seconds(&self.now).map(|s| s.to_string()).unwrap_or_default();
        [
            ("--amount", mutez_to_tez(&self.transferred)),
            ("--balance", mutez_to_tez(&self.balance)),
            ("--source", self.source.clone()),
            ("--payer", self.caller.clone()),
            ("--now", now),
            ("--level", self.level.clone()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .flat_map(|(flag, value)| [flag.to_string(), value])
        .collect()
    }
}

fn nat(value: &str, field: &str, detail: &str) -> Result<String, InputError> {
    let value = value.trim();
    if is_nat(value) {
        Ok(value.to_string())
    } else {
        Err(InputError::new(field, detail))
    }
}

fn address(value: &str, field: &str) -> Result<String, InputError> {
    let value = value.trim();
    if is_address(value) {
        Ok(value.to_string())
    } else {
        Err(InputError::new(field, "value is not a valid Tezos address"))
    }
}

/// Formats a mutez amount as a decimal tez amount: `1500000` is `1.5`.
fn mutez_to_tez(mutez: &str) -> String {
    let Some(mutez) = parse_integer(mutez) else { return String::new() };
    let whole: BigInt = &mutez / MUTEZ_PER_TEZ;
    let fraction: BigInt = &mutez % MUTEZ_PER_TEZ;
    let fraction = format!("{fraction:0>6}");
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALLER: &str = "tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg";

    #[test]
    fn test_defaults() {
        let env = ContractEnv::new(CALLER);
        assert_eq!(env.caller(), CALLER);
        assert_eq!(env.source(), CALLER);
        assert_eq!(env.transferred(), "0");
        assert!(is_date(env.now()));
    }

    #[test]
    fn test_setters_validate() {
        let mut env = ContractEnv::new(CALLER);

        env.set_transferred("1500000").unwrap();
        assert_eq!(env.transferred(), "1500000");
        assert_eq!(
            env.set_transferred("-1").unwrap_err().to_string(),
            "Invalid transferred value: should be a positive integer value"
        );
        assert_eq!(env.transferred(), "1500000");

        assert!(env.set_caller("KT1BEqzn5Wx8uJrZNvuS9DVHmLvG9td3fDLi").is_ok());
        assert_eq!(env.set_caller("alice").unwrap_err().field, "caller");
        assert_eq!(env.set_source("bob").unwrap_err().field, "source");

        assert!(env.set_now("2024-01-15 10:30:00").is_ok());
        assert_eq!(env.now(), "2024-01-15 10:30:00");
        assert!(env.set_now("2024-01-15 10:30:00.250").is_err());

        assert!(env.set_level("12").is_ok());
        assert!(env.set_level("twelve").is_err());
        assert!(env.set_balance("10").is_ok());
        assert!(env.set_balance("1.5").is_err());
    }

    #[test]
    fn test_run_script_args() {
        let mut env = ContractEnv::new(CALLER);
        env.set_transferred("1500000").unwrap();
        env.set_balance("2000000").unwrap();
        env.set_source("tz1source").unwrap();
        env.set_now("2024-01-15 10:30:00").unwrap();
        let now = date_string_to_seconds("2024-01-15 10:30:00").unwrap().to_string();

        assert_eq!(
            env.run_script_args(),
            vec![
                "--amount", "1.5", "--balance", "2", "--source", "tz1source", "--payer", CALLER,
                "--now", now.as_str(), "--level", "1",
            ]
        );
    }

    #[test]
    fn test_mutez_to_tez() {
        assert_eq!(mutez_to_tez("0"), "0");
        assert_eq!(mutez_to_tez("1"), "0.000001");
        assert_eq!(mutez_to_tez("1000000"), "1");
        assert_eq!(mutez_to_tez("12345678"), "12.345678");
    }
}
