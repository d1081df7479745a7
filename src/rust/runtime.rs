use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;
use std::env;
use std::sync::OnceLock;

use crate::predictor::PredictorError;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Environment variable setting ONNX Runtime intra-op threads
pub const INTRA_THREADS_ENV: &str = "ATTRITION_INTRA_THREADS";
/// Environment variable setting ONNX Runtime inter-op threads
pub const INTER_THREADS_ENV: &str = "ATTRITION_INTER_THREADS";

/// Execution settings for the ONNX Runtime session.
///
/// A thread count of 0 leaves the choice to ONNX Runtime.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0,
            intra_threads: 1,
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: copy_level(&self.optimization_level),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `ATTRITION_INTRA_THREADS` / `ATTRITION_INTER_THREADS`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = threads_from_env(INTRA_THREADS_ENV) {
            config.intra_threads = n;
        }
        if let Some(n) = threads_from_env(INTER_THREADS_ENV) {
            config.inter_threads = n;
        }
        config
    }
}

fn threads_from_env(key: &str) -> Option<usize> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a thread count", key, raw);
            None
        }
    }
}

fn copy_level(level: &GraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
        GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
    }
}

fn init_onnx_environment() -> OrtResult<()> {
    ort::init()
        .with_name("attrition")
        .commit()?;
    Ok(())
}

/// Runs `init` the first time only; every call returns that first outcome.
fn init_once(
    cell: &OnceLock<Result<(), String>>,
    init: impl FnOnce() -> Result<(), String>,
) -> Result<(), String> {
    cell.get_or_init(init).clone()
}

/// Initializes the process-wide ONNX Runtime environment once.
///
/// A failed initialization is reported to every caller, not just the first.
pub fn ensure_initialized() -> Result<(), PredictorError> {
    init_once(&INIT, || init_onnx_environment().map_err(|e| e.to_string()))
        .map_err(|e| PredictorError::ModelError(format!("Failed to initialize ONNX Runtime: {}", e)))
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, PredictorError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }
    builder = builder.with_optimization_level(copy_level(&config.optimization_level))?;

    Ok(builder)
}
