use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub summarizer: SummarizerConfig,
    pub output: OutputConfig,
    pub diagrams: DiagramConfig,
}

/// Where and how repositories are cloned
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub cache_dir: PathBuf,
    pub clone_base_url: String,
    pub timeout_secs: u64,
    pub shallow: bool,
}

/// Summarizer provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub provider: SummarizerProvider,
    pub model: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub max_input_chars: usize,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: Option<PathBuf>,
}

/// Diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub max_nodes: usize,
    pub direction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    #[default]
    OpenAI,
    Ollama,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Mermaid,
    Html,
}

impl OutputFormat {
    /// Parse a format name, accepting a few common aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "mermaid" | "mmd" => Some(OutputFormat::Mermaid),
            "html" | "htm" => Some(OutputFormat::Html),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Mermaid => "mmd",
            OutputFormat::Html => "html",
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("temp_repos"),
            clone_base_url: "https://github.com".to_string(),
            timeout_secs: 300,
            shallow: true,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: SummarizerProvider::default(),
            model: "gpt-4o-2024-11-20".to_string(),
            api_url: None,
            api_key: None,
            max_tokens: 150,
            max_input_chars: 12_000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: None,
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100,
            direction: "TB".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, falling back to defaults only when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        cache_dir: Option<PathBuf>,
        timeout_secs: Option<u64>,
        format: Option<String>,
        output: Option<PathBuf>,
    ) {
        if let Some(dir) = cache_dir {
            self.acquisition.cache_dir = dir;
        }

        if let Some(t) = timeout_secs {
            self.acquisition.timeout_secs = t;
        }

        if let Some(fmt) = format.as_deref().and_then(OutputFormat::parse) {
            self.output.format = fmt;
        }

        if let Some(out) = output {
            self.output.directory = Some(out);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.acquisition.timeout_secs == 0 {
            return Err(Error::config_validation("timeout_secs must be at least 1"));
        }

        if self.acquisition.clone_base_url.trim().is_empty() {
            return Err(Error::config_validation("clone_base_url cannot be empty"));
        }

        if self.diagrams.max_nodes == 0 {
            return Err(Error::config_validation("diagram max_nodes must be at least 1"));
        }

        if !matches!(self.diagrams.direction.as_str(), "TB" | "TD" | "BT" | "LR" | "RL") {
            return Err(Error::config_validation(format!(
                "unknown diagram direction: {}",
                self.diagrams.direction
            )));
        }

        if self.summarizer.max_input_chars == 0 {
            return Err(Error::config_validation("max_input_chars must be at least 1"));
        }

        Ok(())
    }
}
