//! Model factory: builds [`ClientWrapper`] handles from environment configuration.
//!
//! Supports:
//! - Ollama (local, via the OpenAI-compatible `/v1` surface)
//! - OpenAI
//!
//! Configuration via environment variables:
//! - `MODEL_PROVIDER`: `"ollama"` or `"openai"` (default: `"ollama"`)
//! - For Ollama: `OLLAMA_MODEL_ID` (required), `OLLAMA_TEMPERATURE` (required),
//!   `OLLAMA_HOST` (optional)
//! - For OpenAI: `OPENAI_MODEL_ID` (required), `OPENAI_API_KEY` (required),
//!   `OPENAI_TEMPERATURE` (optional, default `0.7`)
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::model_factory::ModelFactory;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModelFactory::create_client()?;
//! println!("Using model: {}", client.model_name());
//! # Ok(())
//! # }
//! ```

use crate::client_wrapper::ClientWrapper;
use crate::clients::ollama::{OllamaClient, DEFAULT_OLLAMA_HOST};
use crate::clients::openai::OpenAIClient;
use std::env;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default sampling temperature applied when OpenAI is selected and
/// `OPENAI_TEMPERATURE` is not set.
const DEFAULT_OPENAI_TEMPERATURE: f32 = 0.7;

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    /// Local Ollama server.
    Ollama,
    /// Hosted OpenAI API.
    OpenAi,
}

impl ModelProvider {
    /// The lowercase identifier used in `MODEL_PROVIDER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Ollama => "ollama",
            ModelProvider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(ModelProvider::Ollama),
            "openai" => Ok(ModelProvider::OpenAi),
            other => Err(FactoryError::UnknownProvider(other.to_string())),
        }
    }
}

/// Errors produced while resolving provider configuration.
#[derive(Debug, Clone)]
pub enum FactoryError {
    /// `MODEL_PROVIDER` named a provider this crate does not support.
    UnknownProvider(String),
    /// A required environment variable was not set.
    MissingVariable(&'static str),
    /// A temperature variable was set but did not parse as a number.
    InvalidTemperature(String),
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::UnknownProvider(value) => write!(
                f,
                "MODEL_PROVIDER must be 'ollama' or 'openai', got '{}'",
                value
            ),
            FactoryError::MissingVariable(name) => {
                write!(f, "{} environment variable is required", name)
            }
            FactoryError::InvalidTemperature(value) => {
                write!(f, "temperature '{}' is not a valid number", value)
            }
        }
    }
}

impl Error for FactoryError {}

/// Factory for creating [`ClientWrapper`] instances from configuration.
pub struct ModelFactory;

impl ModelFactory {
    /// Resolve the model provider from the `MODEL_PROVIDER` environment
    /// variable, defaulting to [`ModelProvider::Ollama`] when unset.
    pub fn provider() -> Result<ModelProvider, FactoryError> {
        match env::var("MODEL_PROVIDER") {
            Ok(value) => value.parse(),
            Err(_) => Ok(ModelProvider::Ollama),
        }
    }

    /// Create a client using the environment configuration only.
    pub fn create_client() -> Result<Arc<dyn ClientWrapper>, FactoryError> {
        Self::create_client_with(None, None)
    }

    /// Create a client, letting the caller override the model id and/or the
    /// temperature. Explicit overrides win over environment values.
    pub fn create_client_with(
        model_id: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<Arc<dyn ClientWrapper>, FactoryError> {
        let provider = Self::provider()?;
        log::debug!(
            "ModelFactory::create_client_with(...): provider={}",
            provider
        );

        match provider {
            ModelProvider::Ollama => Self::create_ollama_client(model_id, temperature),
            ModelProvider::OpenAi => Self::create_openai_client(model_id, temperature),
        }
    }

    fn create_ollama_client(
        model_id: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<Arc<dyn ClientWrapper>, FactoryError> {
        let final_model_id = match model_id {
            Some(id) => id.to_string(),
            None => env::var("OLLAMA_MODEL_ID")
                .map_err(|_| FactoryError::MissingVariable("OLLAMA_MODEL_ID"))?,
        };

        let final_temperature = match temperature {
            Some(t) => t,
            None => {
                let raw = env::var("OLLAMA_TEMPERATURE")
                    .map_err(|_| FactoryError::MissingVariable("OLLAMA_TEMPERATURE"))?;
                raw.parse::<f32>()
                    .map_err(|_| FactoryError::InvalidTemperature(raw))?
            }
        };

        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());

        Ok(Arc::new(
            OllamaClient::new_with_host(&final_model_id, &host).with_temperature(final_temperature),
        ))
    }

    fn create_openai_client(
        model_id: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<Arc<dyn ClientWrapper>, FactoryError> {
        let final_model_id = match model_id {
            Some(id) => id.to_string(),
            None => env::var("OPENAI_MODEL_ID")
                .map_err(|_| FactoryError::MissingVariable("OPENAI_MODEL_ID"))?,
        };

        let api_key =
            env::var("OPENAI_API_KEY").map_err(|_| FactoryError::MissingVariable("OPENAI_API_KEY"))?;

        let final_temperature = match temperature {
            Some(t) => t,
            None => match env::var("OPENAI_TEMPERATURE") {
                Ok(raw) => raw
                    .parse::<f32>()
                    .map_err(|_| FactoryError::InvalidTemperature(raw))?,
                Err(_) => DEFAULT_OPENAI_TEMPERATURE,
            },
        };

        Ok(Arc::new(
            OpenAIClient::new_with_model_string(&api_key, &final_model_id)
                .with_temperature(final_temperature),
        ))
    }
}
