use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use extract::ExtractionMode;

pub const DEFAULT_MODEL: &str = "hf.co/jackboyla/Phi-3-mini-4k-instruct-graph-GGUF:Q8_0";
pub const NUEXTRACT_MODEL: &str = "hf.co/MaziyarPanahi/NuExtract-1.5-smol-GGUF:Q6_K";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub ollama_url: String,
    pub output_dir: PathBuf,
    pub figure_path: PathBuf,
    /// Models to run, grouped by extraction mode tag, in run order
    pub models: Vec<ModelGroup>,
    /// JSONL file of `{text_id, text}`; built-in articles when absent
    pub inputs: Option<PathBuf>,
    pub stop_models: bool,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
}

/// Mode tags stay strings here so a typo surfaces as a clear error when
/// the run is planned rather than as a YAML parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGroup {
    pub mode: String,
    pub models: Vec<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            ollama_url: extract::llm::DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("benchmark_data"),
            figure_path: PathBuf::from("figs/benchmark_results.png"),
            models: vec![
                ModelGroup {
                    mode: ExtractionMode::Default.to_string(),
                    models: vec![DEFAULT_MODEL.to_string()],
                },
                ModelGroup {
                    mode: ExtractionMode::NuExtract.to_string(),
                    models: vec![NUEXTRACT_MODEL.to_string()],
                },
            ],
            inputs: None,
            stop_models: true,
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_yaml(&raw).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: BenchConfig = serde_yaml::from_str(raw)?;
        Ok(config)
    }
}
