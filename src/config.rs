use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use crate::enquiry::EnquiryKind;
use crate::error::{KioskError, Result};

/// Environment variable holding the pipeline user identifier
pub const USER_ID_VAR: &str = "userID";
/// Environment variable holding the pipeline API key
pub const API_KEY_VAR: &str = "ulcaApiKey";
/// Environment variable overriding the pipeline identifier
pub const PIPELINE_ID_VAR: &str = "DefaultPipeLineId";

// Default values for service configuration
fn default_timeout_secs() -> u64 {
    120
}

fn default_voice_gender() -> String {
    "female".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub counter: CounterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Control-plane endpoint that maps task types to backend services
    pub discovery_endpoint: String,
    /// Pipeline identifier used when none is supplied through the environment
    pub default_pipeline_id: String,
    /// Voice gender requested for speech synthesis
    #[serde(default = "default_voice_gender")]
    pub voice_gender: String,
    /// Transport timeout for a single HTTP call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Language spoken by the counter staff
    pub staff_language: String,
    /// Language spoken by the customer
    pub customer_language: String,
    /// Which question set the counter asks
    pub enquiry: EnquiryKind,
    /// Directory where conversation transcripts are written
    pub transcript_dir: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            discovery_endpoint: "https://meity-auth.ulcacontrib.org/ulca/apis/v0/model/getModelsPipeline".to_string(),
            default_pipeline_id: "64392f96daac500b55c543cd".to_string(),
            voice_gender: default_voice_gender(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            counter: CounterConfig {
                staff_language: "en".to_string(),
                customer_language: "hi".to_string(),
                enquiry: EnquiryKind::Railway,
                transcript_dir: ".kiosk/transcripts".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KioskError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| KioskError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KioskError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| KioskError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Static user id / API key pair presented to the control plane
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    pub api_key: String,
    pub pipeline_id: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>, pipeline_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        let api_key = api_key.into();

        if user_id.trim().is_empty() {
            return Err(KioskError::InvalidCredentials(format!("{} is not set", USER_ID_VAR)));
        }
        if api_key.trim().is_empty() {
            return Err(KioskError::InvalidCredentials(format!("{} is not set", API_KEY_VAR)));
        }

        Ok(Self {
            user_id,
            api_key,
            pipeline_id: pipeline_id.into(),
        })
    }

    /// Read credentials from the process environment
    pub fn from_env(service: &ServiceConfig) -> Result<Self> {
        Self::from_lookup(service, |key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary key lookup.
    ///
    /// The pipeline id falls back to the configured default when unset or empty.
    pub fn from_lookup<F>(service: &ServiceConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_id = lookup(USER_ID_VAR).unwrap_or_default();
        let api_key = lookup(API_KEY_VAR).unwrap_or_default();
        let pipeline_id = lookup(PIPELINE_ID_VAR)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| service.default_pipeline_id.clone());

        Self::new(user_id, api_key, pipeline_id)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("pipeline_id", &self.pipeline_id)
            .finish()
    }
}
