use crate::cmd::{
    completions::CompletionsArgs, debug::DebugArgs, gas::GasArgs, gen::GenArgs, op::OpArgs,
    steps::StepsArgs, trace::TraceArgs,
};
use clap::{Parser, Subcommand};

/// ARLDB: The Archetype Debugger.
#[derive(Parser, Debug)]
#[command(
    name = "arldb",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Find more information in our homepage: https://archetype-lang.org/",
    next_display_order = None,
)]
pub struct ArldbArgs {
    #[command(subcommand)]
    pub cmd: ArldbSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ArldbSubcommand {
    /// Lex the stack trace printed by `octez-client run script --trace-stack`.
    #[command(visible_alias = "t")]
    Trace(TraceArgs),

    /// Rebuild the source-level steps of a traced run.
    #[command(visible_alias = "s")]
    Steps(StepsArgs),

    /// Summarize the gas spent per source line.
    Gas(GasArgs),

    /// Generate code from an Archetype contract.
    #[command(visible_alias = "g")]
    Gen(GenArgs),

    /// Debug an entrypoint call interactively.
    #[command(visible_alias = "d")]
    Debug(DebugArgs),

    /// Decode operation receipts.
    Op(OpArgs),

    /// Generate shell completions.
    #[command(visible_alias = "com")]
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        ArldbArgs::command().debug_assert();
    }

    #[test]
    fn parse_debug_args() {
        let args = ArldbArgs::try_parse_from([
            "arldb",
            "debug",
            "token.arl",
            "--entrypoint",
            "exec",
            "--now",
            "2024-01-15 10:30:00",
            "--no-cache",
        ])
        .unwrap();
        let ArldbSubcommand::Debug(debug) = args.cmd else { panic!("expected debug") };
        assert_eq!(debug.entrypoint.as_deref(), Some("exec"));
        assert_eq!(debug.env.now.as_deref(), Some("2024-01-15 10:30:00"));
        assert!(debug.cache.no_cache);
    }

    #[test]
    fn parse_gen_target() {
        let args = ArldbArgs::try_parse_from(["arldb", "gen", "a.arl", "-t", "michelson-storage"]).unwrap();
        let ArldbSubcommand::Gen(gen) = args.cmd else { panic!("expected gen") };
        assert_eq!(gen.target.to_string(), "michelson-storage");
        assert!(ArldbArgs::try_parse_from(["arldb", "gen", "a.arl", "-t", "solidity"]).is_err());
    }
}
