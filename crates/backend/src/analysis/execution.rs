use super::LocationMap;
use crate::{
    artifact::{ArchetypeTrace, DebugAnnotation, Step, StackItemValue},
    error::TraceError,
    trace::Trace,
};

/// Interpreter gas is printed in gas units with milligas precision; steps carry milligas.
pub const GAS_SCALE: f64 = 1000.0;

/// Binds the annotated stack names to the runtime stack values, top of stack first.
///
/// Both sides must have the same length.
pub fn zip_stack(
    location: usize,
    annotation: &DebugAnnotation,
    values: &[String],
) -> Result<Vec<StackItemValue>, TraceError> {
    if annotation.stack.len() != values.len() {
        return Err(TraceError::StackMismatch {
            location,
            names: annotation.names().map(str::to_string).collect(),
            values: values.to_vec(),
        });
    }

    Ok(annotation
        .stack
        .iter()
        .zip(values)
        .map(|(name, value)| StackItemValue { name: name.name.clone(), value: value.clone() })
        .collect())
}

/// Rebuilds the source-level steps of a run.
///
/// Gas of items hitting unannotated instructions is accumulated and charged to the next
/// annotated one. Items with zero gas are ignored. An instruction annotated with both a
/// source range and a declaration bound yields the range step first, then the bound step
/// with no gas.
pub fn build_execution(map: &LocationMap<'_>, trace: &Trace) -> Result<ArchetypeTrace, TraceError> {
    let mut steps = vec![];
    let mut stepgas = 0.0;

    for item in &trace.items {
        if item.gas == 0.0 {
            continue;
        }
        stepgas += item.gas * GAS_SCALE;

        let node = map
            .get(item.location)
            .ok_or(TraceError::UnknownLocation { location: item.location, size: map.len() })?;
        let Some(debug) = node.debug() else { continue };

        let stack = zip_stack(item.location, debug, &item.stack)?;
        match (&debug.range, &debug.decl_bound) {
            (Some(range), Some(bound)) => {
                steps.push(Step {
                    stack: stack.clone(),
                    gas: stepgas,
                    range: Some(range.clone()),
                    decl_bound: None,
                });
                steps.push(Step { stack, gas: 0.0, range: None, decl_bound: Some(bound.clone()) });
            }
            (range, decl_bound) => steps.push(Step {
                stack,
                gas: stepgas,
                range: range.clone(),
                decl_bound: decl_bound.clone(),
            }),
        }
        stepgas = 0.0;
    }

    debug!("reconstructed {} step(s) from {} trace item(s)", steps.len(), trace.items.len());
    Ok(ArchetypeTrace { fail: trace.fail.clone(), steps })
}
