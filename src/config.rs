use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_SECRET_KEY: &str = "dev-secret-key";
const DEFAULT_RETENTION_SECS: u64 = 24 * 60 * 60;
const DEFAULT_HF_API_URL: &str = "https://router.huggingface.co/hf-inference";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docinsight server and CLI.
#[derive(Clone)]
pub struct Config {
    /// Directory where uploaded documents are staged.
    pub upload_folder: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub max_file_size: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Application secret. Never logged.
    pub secret_key: String,
    /// Debug mode (`APP_ENV=development`) lowers the default log level to `debug`.
    pub debug: bool,
    /// Age in seconds after which uploads are evicted; `0` keeps them forever.
    pub upload_retention_secs: u64,
    /// Backend serving the pretrained models.
    pub model_provider: ModelProvider,
    /// Base URL of the Hugging Face inference API.
    pub hf_api_url: String,
    /// Optional bearer token for the Hugging Face inference API.
    pub hf_api_token: Option<String>,
    /// Summarization checkpoint identifier.
    pub summarization_model: String,
    /// Extractive question-answering checkpoint identifier.
    pub qa_model: String,
    /// Sentiment classification checkpoint identifier.
    pub sentiment_model: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Model used for every task when the Ollama provider is selected.
    pub ollama_model: String,
    /// OCR settings shared by image and scanned-PDF extraction.
    pub ocr: OcrConfig,
}

/// External OCR tooling settings.
#[derive(Clone, Debug)]
pub struct OcrConfig {
    /// Path or name of the `tesseract` binary.
    pub tesseract_cmd: String,
    /// Path or name of the `pdftoppm` binary used to rasterize scanned PDFs.
    pub pdftoppm_cmd: String,
    /// Tesseract language code.
    pub language: String,
    /// Rasterization resolution for scanned PDFs.
    pub dpi: u32,
}

/// Supported backends for the pretrained pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelProvider {
    /// Hosted Hugging Face inference API.
    HuggingFace,
    /// Local Ollama runtime.
    Ollama,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".into(),
            pdftoppm_cmd: "pdftoppm".into(),
            language: "eng".into(),
            dpi: 300,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            server_port: None,
            secret_key: DEFAULT_SECRET_KEY.into(),
            debug: false,
            upload_retention_secs: DEFAULT_RETENTION_SECS,
            model_provider: ModelProvider::HuggingFace,
            hf_api_url: DEFAULT_HF_API_URL.into(),
            hf_api_token: None,
            summarization_model: "sshleifer/distilbart-cnn-12-6".into(),
            qa_model: "distilbert-base-cased-distilled-squad".into(),
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".into(),
            ollama_url: DEFAULT_OLLAMA_URL.into(),
            ollama_model: "llama3.2".into(),
            ocr: OcrConfig::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("upload_folder", &self.upload_folder)
            .field("max_file_size", &self.max_file_size)
            .field("server_port", &self.server_port)
            .field("secret_key", &"<redacted>")
            .field("debug", &self.debug)
            .field("upload_retention_secs", &self.upload_retention_secs)
            .field("model_provider", &self.model_provider)
            .field("hf_api_url", &self.hf_api_url)
            .field("hf_api_token", &self.hf_api_token.as_ref().map(|_| "<redacted>"))
            .field("summarization_model", &self.summarization_model)
            .field("qa_model", &self.qa_model)
            .field("sentiment_model", &self.sentiment_model)
            .field("ollama_url", &self.ollama_url)
            .field("ollama_model", &self.ollama_model)
            .field("ocr", &self.ocr)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    ///
    /// Every setting has a default, so only malformed values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let defaults_ocr = defaults.ocr.clone();
        Ok(Self {
            upload_folder: load_env_optional("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_folder),
            max_file_size: parse_optional("MAX_FILE_SIZE")?.unwrap_or(defaults.max_file_size),
            server_port: parse_optional("PORT")?,
            secret_key: load_env_optional("SECRET_KEY").unwrap_or(defaults.secret_key),
            debug: load_env_optional("APP_ENV")
                .map(|value| value.eq_ignore_ascii_case("development"))
                .unwrap_or(false),
            upload_retention_secs: parse_optional("UPLOAD_RETENTION_SECS")?
                .unwrap_or(defaults.upload_retention_secs),
            model_provider: load_env_optional("MODEL_PROVIDER")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("MODEL_PROVIDER".into()))
                })
                .transpose()?
                .unwrap_or(defaults.model_provider),
            hf_api_url: load_env_optional("HF_API_URL").unwrap_or(defaults.hf_api_url),
            hf_api_token: load_env_optional("HF_API_TOKEN"),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or(defaults.summarization_model),
            qa_model: load_env_optional("QA_MODEL").unwrap_or(defaults.qa_model),
            sentiment_model: load_env_optional("SENTIMENT_MODEL")
                .unwrap_or(defaults.sentiment_model),
            ollama_url: load_env_optional("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: load_env_optional("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            ocr: OcrConfig {
                tesseract_cmd: load_env_optional("TESSERACT_CMD")
                    .unwrap_or(defaults_ocr.tesseract_cmd),
                pdftoppm_cmd: load_env_optional("PDFTOPPM_CMD")
                    .unwrap_or(defaults_ocr.pdftoppm_cmd),
                language: load_env_optional("OCR_LANG").unwrap_or(defaults_ocr.language),
                dpi: parse_optional("OCR_DPI")?.unwrap_or(defaults_ocr.dpi),
            },
        })
    }

    /// Whether the configured secret is still the development placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for ModelProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        upload_folder = %config.upload_folder.display(),
        server_port = ?config.server_port,
        model_provider = ?config.model_provider,
        debug = config.debug,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
