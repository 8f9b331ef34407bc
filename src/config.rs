use crate::utils::error::PredictError;
use crate::Result;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const PLANT_TYPE_MODEL_FILE: &str = "final_plant_classifier.onnx";
pub const TOMATO_MODEL_FILE: &str = "final_plant_tomato.onnx";
pub const POTATO_MODEL_FILE: &str = "final_potato.onnx";
pub const BELL_PEPPER_MODEL_FILE: &str = "final_bell_pepper.onnx";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,

    /// Directory holding the four model artifacts
    pub models_dir: PathBuf,

    /// Tokio worker threads
    pub workers: usize,

    pub onnx_config: OnnxConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// Intra-op threads per session
    pub intra_threads: usize,

    /// Graph optimization level (0-3)
    pub optimization_level: u8,
}

impl Config {
    pub fn new(
        bind_addr: String,
        models_dir: String,
        workers: Option<usize>,
    ) -> Result<Self> {
        let cpu_cores = num_cpus::get();
        let workers = workers.unwrap_or(cpu_cores);
        if workers == 0 {
            return Err(PredictError::Config(
                "Worker thread count must be at least 1".to_string(),
            ));
        }

        // Four sessions share the machine, so each gets a slice of the cores.
        let onnx_config = OnnxConfig {
            intra_threads: (cpu_cores / 2).max(1),
            optimization_level: 3,
        };

        Ok(Self {
            bind_addr,
            models_dir: PathBuf::from(models_dir),
            workers,
            onnx_config,
        })
    }

    /// Parse the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|e| {
            PredictError::Config(format!("Invalid bind address {}: {}", self.bind_addr, e))
        })
    }

    pub fn plant_type_model_path(&self) -> PathBuf {
        self.models_dir.join(PLANT_TYPE_MODEL_FILE)
    }

    pub fn tomato_model_path(&self) -> PathBuf {
        self.models_dir.join(TOMATO_MODEL_FILE)
    }

    pub fn potato_model_path(&self) -> PathBuf {
        self.models_dir.join(POTATO_MODEL_FILE)
    }

    pub fn bell_pepper_model_path(&self) -> PathBuf {
        self.models_dir.join(BELL_PEPPER_MODEL_FILE)
    }
}
