//! Typed user inputs (entrypoint arguments, storage fields, environment) and their
//! Michelson encoding.

mod arg;
mod collection;
mod env;
mod michelson;

pub use arg::{is_address, is_nat, parse_integer, remove_double_quotes, ArgType, ArgValue, EntryArg};
pub use collection::{EntryPoint, Storage};
pub use env::ContractEnv;
pub use michelson::{args_to_mich, process_const_params, to_pair, ConstParam};
