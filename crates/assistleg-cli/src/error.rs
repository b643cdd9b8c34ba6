use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a dotted settings path
pub fn to_env_var(field_path: &str) -> String {
    format!(
        "ASSISTLEG_{}",
        field_path.replace('.', "__").to_uppercase()
    )
}
