//! Configuration management for ANA-RAG.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.ana/config.yaml` in the workspace)
//! - Environment variables
//! - Command-line flags
//!
//! Resource paths are resolved against the workspace directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// LLM providers the service knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["huggingface", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains `.ana/` and the resource files)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("huggingface" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Inference sub-provider used by the Hugging Face router (e.g. "nebius")
    pub inference_provider: Option<String>,

    /// Custom LLM endpoint
    pub endpoint: Option<String>,

    /// API key for the LLM provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Resource files loaded at startup
    pub resources: ResourceConfig,

    /// Embedding settings
    pub embedding: EmbeddingConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Locations of the read-only resources loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Serialized vector index (SQLite)
    #[serde(rename = "indexFile", default = "default_index_file")]
    pub index_file: PathBuf,

    /// Serialized document sequence (JSON array of strings)
    #[serde(rename = "docsFile", default = "default_docs_file")]
    pub docs_file: PathBuf,

    /// Auxiliary production dataset (CSV)
    #[serde(rename = "dataFile", default = "default_data_file")]
    pub data_file: PathBuf,
}

fn default_index_file() -> PathBuf {
    PathBuf::from("vector_index.sqlite")
}

fn default_docs_file() -> PathBuf {
    PathBuf::from("docs.json")
}

fn default_data_file() -> PathBuf {
    PathBuf::from("produccion.csv")
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            docs_file: default_docs_file(),
            data_file: default_data_file(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name ("ollama" or "hashing")
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected vector dimension
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// Provider endpoint
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            endpoint: default_embedding_endpoint(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    resources: Option<ResourceConfig>,
    embedding: Option<EmbeddingConfig>,
    server: Option<ServerConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    #[serde(rename = "inferenceProvider")]
    inference_provider: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "huggingface".to_string(),
            model: "openai/gpt-oss-120b".to_string(),
            inference_provider: Some("nebius".to_string()),
            endpoint: None,
            api_key: None,
            resources: ResourceConfig::default(),
            embedding: EmbeddingConfig::default(),
            server: ServerConfig::default(),
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `ANA_WORKSPACE`: Override workspace path
    /// - `ANA_CONFIG`: Path to config file
    /// - `ANA_PROVIDER`, `ANA_MODEL`, `ANA_INFERENCE_PROVIDER`, `ANA_ENDPOINT`: LLM settings
    /// - `ANA_API_KEY` or `HF_TOKEN`: API key
    /// - `ANA_EMBEDDING_PROVIDER`, `OLLAMA_URL`: embedding settings
    /// - `ANA_HOST`, `ANA_PORT`: server binding
    /// - `RUST_LOG`, `NO_COLOR`: logging
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration for an explicit workspace and config file.
    ///
    /// `workspace` and `config_file` win over `ANA_WORKSPACE` and `ANA_CONFIG`.
    /// The YAML file is read from `config_file` when given, otherwise from
    /// `<workspace>/.ana/config.yaml`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace
            .or_else(|| std::env::var("ANA_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("ANA_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.ana_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();
        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("ANA_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = std::env::var("ANA_MODEL") {
            self.model = model;
        }
        if let Ok(inference_provider) = std::env::var("ANA_INFERENCE_PROVIDER") {
            self.inference_provider = Some(inference_provider);
        }
        if let Ok(endpoint) = std::env::var("ANA_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(key) = std::env::var("ANA_API_KEY")
            .ok()
            .or_else(|| std::env::var("HF_TOKEN").ok())
        {
            self.api_key = Some(key);
        }
        if let Ok(provider) = std::env::var("ANA_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.embedding.endpoint = url;
        }
        if let Ok(host) = std::env::var("ANA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("ANA_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merged_with(config_file))
    }

    fn merged_with(&self, config_file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.inference_provider.is_some() {
                result.inference_provider = llm.inference_provider;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(env_var) = llm.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(resources) = config_file.resources {
            result.resources = resources;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    /// The workspace and config file flags are taken by [`AppConfig::load_with`].
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the `.ana` directory.
    pub fn ana_dir(&self) -> PathBuf {
        self.workspace.join(".ana")
    }

    /// Resolve a resource path against the workspace.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Absolute path of the vector index file.
    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.resources.index_file)
    }

    /// Absolute path of the document sequence file.
    pub fn docs_path(&self) -> PathBuf {
        self.resolve(&self.resources.docs_file)
    }

    /// Absolute path of the production dataset.
    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.resources.data_file)
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        let provider = match provider.as_str() {
            "hf" => "huggingface",
            other => other,
        };

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "huggingface" && self.api_key.is_none() {
            return Err(AppError::Config(
                "No se encontró la variable de entorno HF_TOKEN para Hugging Face.".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "huggingface");
        assert_eq!(config.model, "openai/gpt-oss-120b");
        assert_eq!(config.inference_provider.as_deref(), Some("nebius"));
        assert_eq!(config.server.port, 8000);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_resource_paths_resolve_against_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/ana");
        assert_eq!(config.docs_path(), PathBuf::from("/srv/ana/docs.json"));
        assert_eq!(
            config.index_path(),
            PathBuf::from("/srv/ana/vector_index.sqlite")
        );

        config.resources.data_file = PathBuf::from("/data/produccion.csv");
        assert_eq!(config.data_path(), PathBuf::from("/data/produccion.csv"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_yaml_merge() {
        let yaml = r#"
llm:
  provider: ollama
  model: llama3.2
resources:
  docsFile: data/docs.json
embedding:
  provider: hashing
  dimensions: 64
server:
  port: 9000
logging:
  level: debug
  color: false
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let merged = AppConfig::default().merged_with(file);

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "llama3.2");
        assert_eq!(merged.resources.docs_file, PathBuf::from("data/docs.json"));
        assert_eq!(
            merged.resources.index_file,
            PathBuf::from("vector_index.sqlite")
        );
        assert_eq!(merged.embedding.provider, "hashing");
        assert_eq!(merged.embedding.dimensions, 64);
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 9000);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_with_reads_workspace_yaml() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join(".ana")).unwrap();
        std::fs::write(
            temp.path().join(".ana/config.yaml"),
            "server:\n  port: 9100\nembedding:\n  provider: hashing\n",
        )
        .unwrap();

        let config = AppConfig::load_with(Some(temp.path().to_path_buf()), None).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.embedding.provider, "hashing");
        assert_eq!(config.docs_path(), temp.path().join("docs.json"));
    }

    #[test]
    fn test_load_with_explicit_config_file_wins_over_workspace_yaml() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join(".ana")).unwrap();
        std::fs::write(temp.path().join(".ana/config.yaml"), "server:\n  port: 9100\n").unwrap();
        let explicit = temp.path().join("explicit.yaml");
        std::fs::write(&explicit, "server:\n  port: 9200\n").unwrap();

        let config =
            AppConfig::load_with(Some(temp.path().to_path_buf()), Some(explicit.clone())).unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.config_file, Some(explicit));
    }

    #[test]
    fn test_load_with_missing_explicit_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let result = AppConfig::load_with(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("absent.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_with_missing_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let result = AppConfig::load_with(Some(temp.path().join("nope")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_huggingface_requires_token() {
        let mut config = AppConfig::default();
        config.api_key = None;
        assert!(config.validate().is_err());

        config.api_key = Some("hf_test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ollama() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }
}
