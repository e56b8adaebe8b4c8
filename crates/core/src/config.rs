use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scan: ScanPaths,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPaths {
    /// Glob patterns excluded during discovery.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on concurrently open file handles (batch width K).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Number of sample windows for large binaries.
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,
    /// Bytes read per sample window.
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,
    /// Per-file timeout in seconds; 0 disables it.
    #[serde(default)]
    pub file_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sample_count: default_sample_count(),
            sample_size: default_sample_size(),
            file_timeout_secs: 0,
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_sample_count() -> u32 {
    5
}

fn default_sample_size() -> u32 {
    1024
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
