//! Reconstruction of source-level steps from the lexed interpreter trace.

mod execution;
mod gas;
mod location_map;

pub use execution::{build_execution, zip_stack, GAS_SCALE};
pub use gas::{extract_gas_info, GasInfo, GasMap};
pub use location_map::LocationMap;
