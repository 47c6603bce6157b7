use arldb_backend::entry::ContractEnv;
use clap::Parser;
use eyre::Result;

/// Overrides of the execution environment.
#[derive(Clone, Debug, Default, Parser)]
pub struct EnvOpts {
    /// The current date, as `YYYY-MM-DD hh:mm:ss`.
    #[clap(long, value_name = "DATE")]
    pub now: Option<String>,

    /// The amount transferred with the call, in mutez.
    #[clap(long, value_name = "MUTEZ")]
    pub transferred: Option<String>,

    /// The balance of the contract, in mutez.
    #[clap(long, value_name = "MUTEZ")]
    pub balance: Option<String>,

    /// The level of the block.
    #[clap(long)]
    pub level: Option<String>,

    /// The address at the origin of the call. Defaults to the caller.
    #[clap(long, value_name = "ADDRESS")]
    pub source_address: Option<String>,

    /// Ask for the environment values interactively.
    #[clap(long)]
    pub ask_env: bool,
}

impl EnvOpts {
    /// The environment of a call from `caller`.
    pub fn env(&self, caller: &str) -> Result<ContractEnv> {
        let mut env = ContractEnv::new(caller);
        if let Some(now) = &self.now {
            env.set_now(now)?;
        }
        if let Some(transferred) = &self.transferred {
            env.set_transferred(transferred)?;
        }
        if let Some(balance) = &self.balance {
            env.set_balance(balance)?;
        }
        if let Some(level) = &self.level {
            env.set_level(level)?;
        }
        if let Some(source) = &self.source_address {
            env.set_source(source)?;
        }
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides() {
        let opts = EnvOpts { level: Some("42".to_string()), ..Default::default() };
        let env = opts.env("tz1caller").unwrap();
        assert_eq!(env.level(), "42");
        assert_eq!(env.source(), "tz1caller");

        let opts = EnvOpts { balance: Some("-1".to_string()), ..Default::default() };
        let err = opts.env("tz1caller").unwrap_err();
        assert!(err.to_string().contains("balance"));
    }
}
