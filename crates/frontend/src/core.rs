use std::path::Path;

use arldb_backend::{
    analysis::GAS_SCALE,
    entry::ContractEnv,
    error::InputError,
    tools::{ProcessRunner, ToolRunner},
    DebugArtifact, DebugBackend, DebugRequest,
};
use eyre::{OptionExt, Result};
use itertools::Itertools;

use crate::{
    context::DebugContext,
    event::{EventSender, SessionEvent},
    input::{collect_const_params, collect_entrypoint, collect_storage, collect_validated, Prompt},
};

/// A debug session driving the backend.
pub struct DebugFrontend<'a, R = ProcessRunner> {
    /// The backend.
    backend: &'a DebugBackend<R>,
    request: DebugRequest,
    artifact: Option<DebugArtifact>,
    context: Option<DebugContext>,
    events: EventSender,
}

impl<'a, R: ToolRunner> DebugFrontend<'a, R> {
    /// Create a new frontend.
    pub fn new(backend: &'a DebugBackend<R>, request: DebugRequest, events: EventSender) -> Self {
        Self { backend, request, artifact: None, context: None, events }
    }

    /// Builds a request by asking for the entrypoint, its inputs, the constant parameters and
    /// the initial storage. Returns `None` if the user cancels.
    pub async fn prompt_request<P: Prompt + ?Sized>(
        backend: &DebugBackend<R>,
        prompt: &mut P,
        source: &Path,
        entrypoint: Option<&str>,
        env: ContractEnv,
    ) -> Result<Option<DebugRequest>> {
        let compiled = backend.compile(source).await?;
        let interface = compiled.debug.interface();
        eyre::ensure!(!interface.entrypoints.is_empty(), "{} declares no entrypoint", source.display());

        let decl = match entrypoint {
            Some(name) => interface
                .entrypoints
                .iter()
                .find(|e| e.name == name)
                .ok_or_eyre(format!("unknown entrypoint {name:?}"))?,
            None if interface.entrypoints.len() == 1 => &interface.entrypoints[0],
            None => {
                let names = interface.entrypoints.iter().map(|e| e.name.as_str()).join(", ");
                let question = format!("Entrypoint to call ({names})");
                let Some(decl) = collect_validated(prompt, &question, |answer| {
                    interface
                        .entrypoints
                        .iter()
                        .find(|e| e.name == answer.trim())
                        .ok_or_else(|| InputError::new("entrypoint", format!("expected one of {names}")))
                })
                .await
                else {
                    return Ok(None);
                };
                decl
            }
        };

        let Some(entrypoint) = collect_entrypoint(prompt, decl).await else { return Ok(None) };
        let Some(const_params) = collect_const_params(prompt, &interface.const_params).await else {
            return Ok(None);
        };
        let Some(storage) = collect_storage(prompt, &interface.storage).await else { return Ok(None) };

        Ok(Some(DebugRequest {
            source: source.to_path_buf(),
            entrypoint,
            storage,
            env,
            const_params,
        }))
    }

    pub fn request(&self) -> &DebugRequest {
        &self.request
    }

    pub fn artifact(&self) -> Option<&DebugArtifact> {
        self.artifact.as_ref()
    }

    pub fn context(&self) -> Option<&DebugContext> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut DebugContext> {
        self.context.as_mut()
    }

    /// Runs the request and starts stepping through it. A second launch replaces the
    /// execution and keeps the breakpoints.
    pub async fn launch(&mut self, stop_on_entry: bool) -> Result<&mut DebugContext> {
        let artifact = self.backend.analyze(&self.request).await?;
        let summary = format!(
            "{}: {} step(s), {} gas",
            self.request.entrypoint,
            artifact.execution.len(),
            artifact.execution.total_gas() / GAS_SCALE
        );
        if self.events.send(SessionEvent::Output(summary)).is_err() {
            warn!("session event dropped: no receiver");
        }

        let context = match self.context.take() {
            Some(mut context) => {
                context.reload(&artifact);
                context
            }
            None => DebugContext::new(
                &artifact,
                &self.request.entrypoint.name,
                &self.request.env,
                &self.request.const_params,
                self.events.clone(),
            ),
        };
        self.artifact = Some(artifact);
        let context = self.context.insert(context);
        context.start(stop_on_entry);
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use arldb_backend::{
        error::ToolError,
        tools::{FsAccessor, ToolOutput},
    };
    use arldb_utils::config::ToolConfig;
    use async_trait::async_trait;

    use super::*;
    use crate::{
        event::{channel, drain},
        input::tests::Scripted,
    };

    struct FixtureRunner;

    #[async_trait]
    impl ToolRunner for FixtureRunner {
        async fn run(&self, _program: &Path, args: &[String]) -> Result<ToolOutput, ToolError> {
            let fixture = |name| std::fs::read_to_string(crate::testdata(name)).unwrap();
            let stdout = if args.iter().any(|a| a == "--version") {
                "1.5.0".to_string()
            } else if args.iter().any(|a| a == "debug-trace") {
                fixture("debug.json")
            } else if args.iter().any(|a| a == "michelson") {
                "{ parameter nat ; storage nat ; code { CDR } }".to_string()
            } else if args.iter().any(|a| a == "michelson-storage") {
                "0\n".to_string()
            } else {
                fixture("debug.input")
            };
            Ok(ToolOutput { code: Some(0), stdout, stderr: String::new() })
        }
    }

    fn backend() -> DebugBackend<FixtureRunner> {
        DebugBackend::builder()
            .config(ToolConfig::default())
            .no_cache(true)
            .build_with(FixtureRunner, Arc::new(FsAccessor))
            .unwrap()
    }

    fn source() -> PathBuf {
        crate::testdata("debug.arl")
    }

    fn env() -> ContractEnv {
        ContractEnv::new("tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg")
    }

    #[tokio::test]
    async fn test_prompt_request() {
        let backend = backend();
        let mut prompt = Scripted::new(&["x", "2", ""]);
        let request = DebugFrontend::prompt_request(&backend, &mut prompt, &source(), None, env())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(request.entrypoint.to_string(), "exec(v: nat = 2)");
        assert!(request.const_params.is_empty());
        assert!(request.storage.elements().is_empty());
        assert_eq!(prompt.rejected.len(), 1);

        let mut prompt = Scripted::new(&["2", "5"]);
        let request = DebugFrontend::prompt_request(&backend, &mut prompt, &source(), Some("exec"), env())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.storage.to_michelson(), "5");
        assert_eq!(prompt.questions[1], "Initial value of storage 'a' (nat) [0]");

        let mut prompt = Scripted::new(&[]);
        let cancelled = DebugFrontend::prompt_request(&backend, &mut prompt, &source(), None, env()).await.unwrap();
        assert!(cancelled.is_none());

        let err = DebugFrontend::prompt_request(&backend, &mut prompt, &source(), Some("nope"), env()).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_launch_and_relaunch() {
        let backend = backend();
        let (tx, mut rx) = channel();
        let mut prompt = Scripted::new(&["2", ""]);
        let request = DebugFrontend::prompt_request(&backend, &mut prompt, &source(), Some("exec"), env())
            .await
            .unwrap()
            .unwrap();
        let mut frontend = DebugFrontend::new(&backend, request, tx);
        assert!(frontend.context().is_none());

        let context = frontend.launch(true).await.unwrap();
        assert_eq!(context.len(), 4);
        context.set_breakpoints(&[7]);
        let events = drain(&mut rx);
        assert!(matches!(&events[0], SessionEvent::Output(text) if text.starts_with("exec(v: nat = 2): 4 step(s)")));
        assert_eq!(events[1], SessionEvent::Entry);

        let context = frontend.launch(false).await.unwrap();
        assert_eq!(context.instruction(), 2);
        assert_eq!(drain(&mut rx)[1], SessionEvent::Breakpoint);
        assert_eq!(frontend.artifact().unwrap().trace.items.len(), 13);
        assert_eq!(frontend.request().entrypoint.name, "exec");
    }
}
