use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use arldb_utils::{
    cache::{source_digest, Cache, CachePath},
    config::ToolConfig,
    init_progress, update_progress,
};
use eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{extract_gas_info, GasMap},
    artifact::{ArchetypeTrace, DebugData},
    entry::{process_const_params, ConstParam, ContractEnv, EntryPoint, Storage},
    tools::{FileAccessor, FsAccessor, ProcessRunner, ScriptRun, Target, ToolRunner, Toolchain},
    trace::{parse_trace, Trace},
};

/// Compiled artifacts do not depend on anything but the source, the caller and the compiler
/// version, all part of the cache label, so they never expire by default.
const DEFAULT_CACHE_TTL: Option<Duration> = None;

const STAGES: [&str; 4] = ["compiling debug trace", "compiling michelson", "running script", "reconstructing steps"];

/// What the compiler produced for a source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledContract {
    pub debug: DebugData,
    pub michelson: String,
}

/// One entrypoint call to debug.
#[derive(Clone, Debug)]
pub struct DebugRequest {
    pub source: PathBuf,
    pub entrypoint: EntryPoint,
    /// Initial storage. When empty, the storage generated by the compiler is used.
    pub storage: Storage,
    pub env: ContractEnv,
    /// Values of the contract's constant parameters.
    pub const_params: Vec<ConstParam>,
}

/// Everything a debug session needs.
#[derive(Clone, Debug)]
pub struct DebugArtifact {
    pub debug: DebugData,
    /// The raw interpreter output.
    pub raw_trace: String,
    pub trace: Trace,
    pub execution: Arc<ArchetypeTrace>,
    pub gas: GasMap,
}

/// Lexes `raw` and rebuilds its steps against `debug`.
pub fn reconstruct(debug: DebugData, raw_trace: String) -> Result<DebugArtifact> {
    let trace = parse_trace(&raw_trace)?;
    let map = debug.location_map();
    if let Some(max) = trace.max_location() {
        if max >= map.len() {
            warn!("trace reaches location {} but the contract only has {} node(s)", max, map.len());
        }
    }

    let execution = debug.build_execution(&trace)?;
    let gas = extract_gas_info(&execution);
    debug!("{} step(s), {} line(s) with gas", execution.len(), gas.len());

    Ok(DebugArtifact { debug, raw_trace, trace, execution: Arc::new(execution), gas })
}

#[derive(Debug, Default)]
pub struct DebugBackendBuilder {
    config: Option<ToolConfig>,
    cache_root: Option<PathBuf>,
    cache_ttl: Option<Duration>,
    no_cache: bool,
}

impl DebugBackendBuilder {
    /// Set the tool configuration.
    /// If not set, the configuration file (or the built-in defaults) will be used.
    pub fn config(mut self, config: ToolConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the cache root directory.
    /// If not set, the default cache directory will be used.
    pub fn cache_root(mut self, path: PathBuf) -> Self {
        self.cache_root = Some(path);
        self
    }

    /// Set the cache TTL.
    pub fn cache_ttl(mut self, duration: Duration) -> Self {
        self.cache_ttl = Some(duration);
        self
    }

    /// Disable the compilation cache.
    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Build a backend running the real tools.
    pub fn build(self) -> Result<DebugBackend> {
        self.build_with(ProcessRunner, Arc::new(FsAccessor))
    }

    /// Build a backend on top of the given collaborators.
    pub fn build_with<R: ToolRunner>(
        self,
        runner: R,
        files: Arc<dyn FileAccessor>,
    ) -> Result<DebugBackend<R>> {
        debug!("building debug backend with {:?}", self);

        let config = match self.config {
            Some(config) => config,
            None => ToolConfig::load(None)?,
        };

        let cache = if self.no_cache {
            Cache::disabled()
        } else {
            let dir = CachePath::new(self.cache_root)
                .arldb_compiler_cache_dir()
                .ok_or_eyre("missing cache_root")?;
            Cache::new(Some(dir), self.cache_ttl.or(DEFAULT_CACHE_TTL))?
        };

        Ok(DebugBackend { toolchain: Toolchain::with_runner(config, runner), files, cache })
    }
}

pub struct DebugBackend<R = ProcessRunner> {
    toolchain: Toolchain<R>,
    files: Arc<dyn FileAccessor>,
    /// Compiled contracts, by source digest.
    cache: Cache<CompiledContract>,
}

impl<R: Debug> Debug for DebugBackend<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugBackend")
            .field("toolchain", &self.toolchain)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl DebugBackend {
    #[inline]
    pub fn builder() -> DebugBackendBuilder {
        DebugBackendBuilder::default()
    }
}

impl<R: ToolRunner> DebugBackend<R> {
    pub fn toolchain(&self) -> &Toolchain<R> {
        &self.toolchain
    }

    /// Compile `source` for debugging, or load it from the cache.
    pub async fn compile(&self, source: &Path) -> Result<CompiledContract> {
        let content = self
            .files
            .read_file(source)
            .await
            .wrap_err_with(|| format!("failed to read {}", source.display()))?;
        let version = self.toolchain.archetype_version().await?;
        let label = source_digest(format!("{version}\n{}\n{content}", self.toolchain.config().caller));

        if let Some(compiled) = self.cache.load_cache(&label) {
            debug!("using cached compilation of {:?}", source);
            return Ok(compiled);
        }

        let debug = self.toolchain.compile(source, Target::DebugTrace).await?;
        let debug = DebugData::from_json(&debug)?;
        let michelson = self.toolchain.compile(source, Target::Michelson).await?;
        let compiled = CompiledContract { debug, michelson };

        self.cache.save_cache(&label, &compiled)?;
        Ok(compiled)
    }

    /// Compile, run and reconstruct one entrypoint call.
    pub async fn analyze(&self, request: &DebugRequest) -> Result<DebugArtifact> {
        let pb = init_progress!(STAGES, "Debugging");
        pb.set_message(STAGES[0]);

        // Step 1. compile the contract and its debug information
        let CompiledContract { debug, michelson } = self.compile(&request.source).await?;
        update_progress!(pb, 0, STAGES[1]);

        // Step 2. instantiate the code and the storage
        let code = process_const_params(&michelson, &request.const_params);
        let storage = if request.storage.elements().is_empty() {
            let storage = self.toolchain.compile(&request.source, Target::MichelsonStorage).await?;
            process_const_params(storage.trim(), &request.const_params)
        } else {
            request.storage.to_michelson()
        };
        update_progress!(pb, 1, STAGES[2]);

        // Step 3. run the script with its trace
        let script = tempfile::Builder::new().prefix("arldb-").suffix(".tz").tempfile()?;
        self.files.write_file(script.path(), &code).await?;
        let input = request.entrypoint.to_michelson();
        let run = ScriptRun {
            script: script.path(),
            storage: &storage,
            input: &input,
            entrypoint: &request.entrypoint.name,
            env: &request.env,
        };
        let raw_trace = self.toolchain.run_script(&run).await?;
        update_progress!(pb, 2, STAGES[3]);

        // Step 4. rebuild the source-level steps
        let artifact = reconstruct(debug, raw_trace)?;
        update_progress!(pb, 3);
        pb.finish_and_clear();

        Ok(artifact)
    }
}
