//! Invocation of the external `archetype` compiler and `octez-client` sandbox.

use std::path::{Path, PathBuf};

use arldb_utils::config::ToolConfig;
use async_trait::async_trait;
use strum::{Display, EnumIter, EnumString};

use crate::{entry::ContractEnv, error::ToolError, trace::FATAL_MARKER};

/// What an external command left behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ToolOutput, ToolError>;
}

/// Runs programs as child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ToolOutput, ToolError> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolError::Spawn { program: program.to_path_buf(), source })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Reads and writes the files of a debug session.
#[async_trait]
pub trait FileAccessor: Send + Sync {
    async fn read_file(&self, path: &Path) -> std::io::Result<String>;
    async fn write_file(&self, path: &Path, contents: &str) -> std::io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FsAccessor;

#[async_trait]
impl FileAccessor for FsAccessor {
    async fn read_file(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// Compilation targets of the archetype compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Target {
    Michelson,
    MichelsonStorage,
    Javascript,
    Markdown,
    Whyml,
    DebugTrace,
}

impl Target {
    /// Extension of the generated file.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Michelson => "tz",
            Self::MichelsonStorage => "storage.tz",
            Self::Javascript => "js",
            Self::Markdown => "md",
            Self::Whyml => "mlw",
            Self::DebugTrace => "json",
        }
    }

    /// Where the output generated from `source` is written: next to it, with the target
    /// extension.
    pub fn output_path(self, source: &Path) -> PathBuf {
        source.with_extension(self.extension())
    }
}

/// Turns a command output into its text.
///
/// A failed command is an error, unless its stderr contains `escape`: the stderr is then
/// the meaningful output (e.g. the trace of a script that failed).
pub fn check_output(program: &Path, output: ToolOutput, escape: Option<&str>) -> Result<String, ToolError> {
    if !output.success() {
        if let Some(marker) = escape {
            if output.stderr.contains(marker) {
                return Ok(output.stderr);
            }
        }
        let status = output.code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"));
        return Err(ToolError::Failed { program: program.to_path_buf(), status, stderr: output.stderr });
    }

    if !output.stderr.trim().is_empty() {
        warn!("{:?}: {}", program, output.stderr.trim());
    }
    Ok(output.stdout)
}

/// Parameters of a traced script run.
#[derive(Clone, Copy, Debug)]
pub struct ScriptRun<'a> {
    /// The compiled Michelson script.
    pub script: &'a Path,
    pub storage: &'a str,
    pub input: &'a str,
    pub entrypoint: &'a str,
    pub env: &'a ContractEnv,
}

/// The configured compiler and sandbox.
#[derive(Clone, Debug)]
pub struct Toolchain<R = ProcessRunner> {
    config: ToolConfig,
    runner: R,
}

impl Toolchain {
    pub fn new(config: ToolConfig) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: ToolRunner> Toolchain<R> {
    pub fn with_runner(config: ToolConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn exec(&self, program: &Path, args: Vec<String>, escape: Option<&str>) -> Result<String, ToolError> {
        debug!("running {:?} {}", program, args.join(" "));
        let output = self.runner.run(program, &args).await?;
        check_output(program, output, escape)
    }

    pub async fn archetype_version(&self) -> Result<String, ToolError> {
        let version = self.exec(&self.config.archetype_bin, vec!["--version".to_string()], None).await?;
        Ok(version.trim().to_string())
    }

    /// Compiles `source` to `target` and returns the generated text.
    pub async fn compile(&self, source: &Path, target: Target) -> Result<String, ToolError> {
        let args = vec![
            format!("--set-caller-init={}", self.config.caller),
            "-t".to_string(),
            target.to_string(),
            source.to_string_lossy().into_owned(),
        ];
        self.exec(&self.config.archetype_bin, args, None).await
    }

    pub fn run_script_args(&self, run: &ScriptRun<'_>) -> Vec<String> {
        let script = run.script.to_string_lossy();
        let mut args = self.config.octez_client_args.clone();
        args.extend(
            [
                "run",
                "script",
                &*script,
                "on",
                "storage",
                run.storage,
                "and",
                "input",
                run.input,
                "--entrypoint",
                run.entrypoint,
                "--trace-stack",
            ]
            .map(str::to_string),
        );
        args.extend(run.env.run_script_args());
        args
    }

    /// Runs a script in the sandbox and returns its traced output. A script failure is not
    /// an error: the failure report is returned as output.
    pub async fn run_script(&self, run: &ScriptRun<'_>) -> Result<String, ToolError> {
        let args = self.run_script_args(run);
        self.exec(&self.config.octez_client_bin, args, Some(FATAL_MARKER)).await
    }
}
