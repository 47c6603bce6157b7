//! Lexer for the stack trace printed by `octez-client run script --trace-stack`.
//!
//! The raw output looks like:
//!
//! ```text
//! storage
//!   2
//! emitted operations
//!
//! trace
//!   - location: 7 (just consumed gas: 8.921)
//!     [ (Pair Unit 0) ]
//!   - location: 8 (just consumed gas: 0.010)
//!     [ 2
//!       0 ]
//! ```
//!
//! When the script fails, the interpreter report (`script reached FAILWITH instruction ...`)
//! and a trailing `Fatal error:` section frame the trace.

mod fail;
mod stack;

pub use fail::{extract_fail, unescape, FATAL_MARKER};
pub use stack::{is_balanced, split_stack, StackDumpError};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TraceError;

const TRACE_MARKER: &str = "trace";
const ITEM_SEPARATOR: &str = "\n  - ";

lazy_static! {
    static ref ITEM_HEADER: Regex =
        Regex::new(r"location:\s(\d+).*gas:\s([\d.]+)").expect("item header regex is valid");
}

/// One interpreter step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTraceItem {
    /// Pre-order index of the executed node in the compiled contract.
    pub location: usize,
    /// Gas consumed by this step, in gas units as printed by the interpreter.
    pub gas: f64,
    /// Serialized stack values, top of stack first.
    pub stack: Vec<String>,
}

/// The lexed trace of a single script run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// The value the script failed with, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    pub items: Vec<RawTraceItem>,
}

impl Trace {
    pub fn is_failed(&self) -> bool {
        self.fail.is_some()
    }

    /// Highest location referenced by an item.
    pub fn max_location(&self) -> Option<usize> {
        self.items.iter().map(|item| item.location).max()
    }
}

/// Parses raw interpreter output into a [`Trace`].
///
/// Malformed items are logged and skipped; only an empty input or an input without a
/// `trace` section is an error.
pub fn parse_trace(raw: &str) -> Result<Trace, TraceError> {
    if raw.trim().is_empty() {
        return Err(TraceError::Empty);
    }

    let (body, fail) = match raw.split_once(FATAL_MARKER) {
        Some((before, _)) => (before, extract_fail(raw)),
        None => (raw, None),
    };

    let (_, section) = body.split_once(TRACE_MARKER).ok_or(TraceError::MissingTraceSection)?;

    let items: Vec<_> = section
        .split(ITEM_SEPARATOR)
        .filter(|chunk| !chunk.trim().is_empty())
        .filter_map(parse_item)
        .collect();
    debug!("lexed {} trace item(s), failed: {}", items.len(), fail.is_some());

    Ok(Trace { fail, items })
}

fn parse_item(chunk: &str) -> Option<RawTraceItem> {
    let (header, dump) = chunk.split_once('\n').unwrap_or((chunk, ""));

    let Some(caps) = ITEM_HEADER.captures(header) else {
        warn!("skipping trace item with malformed header: {:?}", header.trim());
        return None;
    };
    let (Ok(location), Ok(gas)) = (caps[1].parse::<usize>(), caps[2].parse::<f64>()) else {
        warn!("skipping trace item with invalid location or gas: {:?}", header.trim());
        return None;
    };

    match split_stack(dump) {
        Ok(stack) => Some(RawTraceItem { location, gas, stack }),
        Err(err) => {
            warn!("skipping trace item at location {}: invalid stack dump ({:?})", location, err);
            None
        }
    }
}
