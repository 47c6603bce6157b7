#[macro_use]
extern crate tracing;

mod args;
mod cmd;
mod opts;
mod utils;

use args::{ArldbArgs, ArldbSubcommand};
use clap::Parser;
use eyre::Result;

fn main() -> Result<()> {
    utils::install_error_handler();
    utils::subscriber();
    utils::enable_paint();

    let opts = ArldbArgs::parse();

    match opts.cmd {
        ArldbSubcommand::Trace(cmd) => utils::block_on(cmd.run()),
        ArldbSubcommand::Steps(cmd) => utils::block_on(cmd.run()),
        ArldbSubcommand::Gas(cmd) => utils::block_on(cmd.run()),
        ArldbSubcommand::Gen(cmd) => utils::block_on(cmd.run()),
        ArldbSubcommand::Debug(cmd) => utils::block_on(cmd.run()),
        ArldbSubcommand::Op(cmd) => utils::block_on(cmd.run()),
        ArldbSubcommand::Completions(cmd) => cmd.run(),
    }
}
