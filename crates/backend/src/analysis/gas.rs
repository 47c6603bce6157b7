use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GAS_SCALE;
use crate::artifact::ArchetypeTrace;

/// Gas spent by one visit of a source line, in gas units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasInfo {
    pub gas: f64,
    /// Gas spent since the start of the run, this visit included.
    pub totalgas: f64,
}

/// Gas visits per source line (the line a range ends on), in execution order.
pub type GasMap = BTreeMap<u32, Vec<GasInfo>>;

pub fn extract_gas_info(trace: &ArchetypeTrace) -> GasMap {
    let mut map = GasMap::new();
    let mut total = 0.0;
    for step in &trace.steps {
        let Some(range) = &step.range else { continue };
        total += step.gas;
        map.entry(range.end.line)
            .or_default()
            .push(GasInfo { gas: step.gas / GAS_SCALE, totalgas: total / GAS_SCALE });
    }
    map
}
