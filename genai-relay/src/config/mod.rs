use crate::cors::CorsPolicy;
use crate::services::providers::ProviderKind;
use crate::services::providers::gemini::GEMINI_API_BASE;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default text generation model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default upstream request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// How the relay is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentForm {
    /// Long-running HTTP server. A missing credential is fatal at startup.
    Server,
    /// One process per invocation. A missing credential surfaces as an
    /// upstream failure on the request instead.
    Function,
}

impl DeploymentForm {
    fn default_cors(self) -> CorsPolicy {
        match self {
            DeploymentForm::Server => CorsPolicy::Permissive,
            DeploymentForm::Function => CorsPolicy::Disabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub cors: CorsPolicy,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used for generation (e.g., gemini-2.5-flash)
    pub text_model: String,
}

impl RelayConfig {
    pub fn load(form: DeploymentForm) -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(form, common_config, |key| env::var(key).ok())
    }

    /// Build the configuration from `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(
        form: DeploymentForm,
        mut common: core_config::Config,
        lookup: F,
    ) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";

        // Hosting platforms announce the port as PORT; APP__PORT wins if both are set.
        if let (None, Some(port)) = (lookup("APP__PORT"), lookup("PORT")) {
            common.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("PORT '{}' is not a valid port: {}", port, e))
            })?;
        }

        let provider: ProviderKind = get_env(&lookup, "GENAI_PROVIDER", Some("gemini"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!("GENAI_PROVIDER: {}", e)))?;

        let api_key = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty());
        let api_key = match (api_key, provider, form) {
            (Some(key), _, _) => key,
            (None, ProviderKind::Gemini, DeploymentForm::Server) => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "GEMINI_API_KEY is required but not set"
                )));
            }
            (None, ProviderKind::Gemini, DeploymentForm::Function) => {
                tracing::warn!("GEMINI_API_KEY is not set; upstream calls will be rejected");
                String::new()
            }
            (None, ProviderKind::Mock, _) => String::new(),
        };

        let request_timeout_secs: u64 = get_env(
            &lookup,
            "GENAI_REQUEST_TIMEOUT_SECS",
            Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
            is_prod,
        )?
        .parse()
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "GENAI_REQUEST_TIMEOUT_SECS must be a whole number of seconds: {}",
                e
            ))
        })?;

        Ok(RelayConfig {
            common,
            provider,
            google: GoogleConfig {
                api_key: Secret::new(api_key),
                api_base: get_env(&lookup, "GEMINI_API_BASE", Some(GEMINI_API_BASE), is_prod)?,
                request_timeout: Duration::from_secs(request_timeout_secs),
            },
            models: ModelConfig {
                text_model: get_env(&lookup, "GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
            },
            cors: CorsPolicy::parse(lookup("RELAY_CORS_ORIGIN").as_deref(), form.default_cors())?,
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
