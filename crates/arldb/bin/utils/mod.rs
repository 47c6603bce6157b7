pub mod prompt;

use arldb_backend::{
    error::{ToolError, TraceError},
    DebugBackend,
};
use eyre::{EyreHandler, Result, WrapErr};
use std::{error::Error, future::Future, path::Path};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yansi::Paint;

use crate::opts::{CacheOpts, ToolOpts};

/// Prints a failed session: the error in red, its causes, then a hint when arldb knows
/// what usually goes wrong.
#[derive(Debug)]
struct Handler;

impl EyreHandler for Handler {
    fn debug(
        &self,
        error: &(dyn Error + 'static),
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        if f.alternate() {
            return core::fmt::Debug::fmt(error, f);
        }
        writeln!(f)?;
        write!(f, "{}", error.red())?;

        if let Some(cause) = error.source() {
            write!(f, "\n\nCaused by:")?;
            for error in std::iter::successors(Some(cause), |e| (*e).source()) {
                write!(f, "\n- {error}")?;
            }
        }

        if let Some(hint) = hint(error) {
            write!(f, "\n\n{} {hint}", "hint:".yellow().bold())?;
        }

        Ok(())
    }
}

/// Suggests a way out for the failures a user can fix.
fn hint(error: &(dyn Error + 'static)) -> Option<&'static str> {
    std::iter::successors(Some(error), |e| (*e).source()).find_map(|e| {
        if let Some(error) = e.downcast_ref::<ToolError>() {
            return Some(match error {
                ToolError::Spawn { .. } => {
                    "point --archetype-bin and --octez-client (or `archetype_bin` and \
                     `octez_client_bin` in ~/.arldb/config.toml) at installed binaries"
                }
                ToolError::Failed { .. } => "the tool output above says what went wrong",
            });
        }
        match e.downcast_ref::<TraceError>()? {
            TraceError::Empty | TraceError::MissingTraceSection => {
                Some("octez-client printed no trace, check that it runs in mockup mode")
            }
            TraceError::UnknownLocation { .. } | TraceError::StackMismatch { .. } => {
                Some("the debug information does not match the run, try again with --no-cache")
            }
        }
    })
}

/// Installs the error report hook.
///
/// Errors are printed by [`Handler`] unless `ARLDB_DEBUG` is set, in which case
/// `color-eyre` reports them with span traces and backtraces. Panics always get the
/// `color-eyre` report.
pub fn install_error_handler() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "full");
    }

    if std::env::var_os("ARLDB_DEBUG").is_some() {
        if let Err(e) = color_eyre::install() {
            warn!("failed to install color eyre error hook: {e}");
        }
    } else {
        let (panic_hook, _) = color_eyre::config::HookBuilder::default()
            .panic_section(
                "arldb crashed. Rerun with ARLDB_DEBUG=1 RUST_LOG=debug and report the output \
                 along with the contract being debugged.",
            )
            .into_hooks();
        panic_hook.install();
        if let Err(e) = eyre::set_hook(Box::new(move |_| Box::new(Handler))) {
            warn!("failed to install eyre error hook: {e}");
        }
    }
}

/// Initializes a tracing Subscriber for logging
pub fn subscriber() {
    tracing_subscriber::Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init()
}

/// Sets the default [`yansi`] color output condition.
pub fn enable_paint() {
    let enable = yansi::Condition::os_support() && yansi::Condition::tty_and_color_live();
    yansi::whenever(yansi::Condition::cached(enable));
}

/// Runs the `future` in a new [`tokio::runtime::Runtime`]
pub fn block_on<F: Future>(future: F) -> F::Output {
    let rt = tokio::runtime::Runtime::new().expect("could not start tokio rt");
    rt.block_on(future)
}

/// Builds a backend running the configured tools.
pub fn backend(tools: &ToolOpts, cache: &CacheOpts) -> Result<DebugBackend> {
    cache.configure(DebugBackend::builder().config(tools.config()?)).build()
}

/// Reads a whole file, naming it on failure.
pub async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.wrap_err_with(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        let spawn = ToolError::Spawn {
            program: "archetype".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let report = eyre::Report::new(spawn).wrap_err("failed to compile debug.arl");
        assert!(hint(&*report).unwrap().contains("--archetype-bin"));

        let report = eyre::Report::new(TraceError::StackMismatch { location: 3, names: vec![], values: vec![] });
        assert!(hint(&*report).unwrap().contains("--no-cache"));

        let report = eyre::eyre!("unknown entrypoint");
        assert_eq!(hint(&*report), None);
    }
}
