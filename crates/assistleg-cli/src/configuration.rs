use crate::error::{to_env_var, ConfigError};
use assistleg::{
    agent::{system_instructions, AgentFactory, DEFAULT_JURISDICTION, DEFAULT_SESSION},
    errors::AgentResult,
    policy::{AlwaysRetrieve, KeywordTrigger, RetrievalPolicy, DEFAULT_TRIGGER_TERMS},
    providers::{
        configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig},
        factory::get_provider,
        ollama, openai,
    },
    retrieval::{HttpRetrieverSource, SearchParams, TopicCatalog},
};
use config::{Config, Environment};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    /// Any openai-compatible endpoint, Groq by default
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Ollama {
        #[serde(default = "default_ollama_host")]
        host: String,
        #[serde(default = "default_ollama_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn into_config(self) -> Result<ProviderConfig, ConfigError> {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => {
                let api_key = api_key.ok_or_else(|| ConfigError::MissingEnvVar {
                    env_var: to_env_var("provider.api_key"),
                })?;
                Ok(ProviderConfig::OpenAi(OpenAiProviderConfig {
                    host,
                    api_key,
                    model,
                    temperature,
                    max_tokens,
                }))
            }
            ProviderSettings::Ollama {
                host,
                model,
                temperature,
                max_tokens,
            } => Ok(ProviderConfig::Ollama(OllamaProviderConfig {
                host,
                model,
                temperature,
                max_tokens,
            })),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalSettings {
    /// Base url of the retrieval service
    #[serde(default = "default_retrieval_host")]
    pub host: String,
    /// Holds one index directory per topic
    #[serde(default = "default_vectorstores_dir")]
    pub vectorstores_dir: PathBuf,
    #[serde(default)]
    pub search: SearchParams,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            host: default_retrieval_host(),
            vectorstores_dir: default_vectorstores_dir(),
            search: SearchParams::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_trigger_terms")]
    pub trigger_terms: Vec<String>,
    #[serde(default)]
    pub always_retrieve: bool,
    /// Replaces the bundled system prompt
    #[serde(default)]
    pub instructions_path: Option<PathBuf>,
    #[serde(default = "default_jurisdiction")]
    pub jurisdiction: String,
    #[serde(default = "default_session")]
    pub default_session: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            trigger_terms: default_trigger_terms(),
            always_retrieve: false,
            instructions_path: None,
            jurisdiction: default_jurisdiction(),
            default_session: default_session(),
        }
    }
}

impl AgentSettings {
    pub fn policy(&self) -> Arc<dyn RetrievalPolicy> {
        if self.always_retrieve {
            Arc::new(AlwaysRetrieve)
        } else {
            Arc::new(KeywordTrigger::new(&self.trigger_terms))
        }
    }

    pub fn instructions(&self) -> AgentResult<String> {
        system_instructions(self.instructions_path.clone(), &self.jurisdiction)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let search = SearchParams::default();
        let mut builder = Config::builder()
            // Provider defaults
            .set_default("provider.type", "openai")?
            .set_default("provider.temperature", 0.2)?
            // Search defaults, so a single override leaves the rest in place
            .set_default("retrieval.search.type", "mmr")?
            .set_default("retrieval.search.k", search.k as i64)?
            .set_default("retrieval.search.fetch_k", search.fetch_k as i64)?
            .set_default("retrieval.search.lambda_mult", search.lambda_mult as f64)?;

        // The key Groq documents, used unless the prefixed one is set
        if let Ok(api_key) = env::var("GROQ_API_KEY") {
            builder = builder.set_default("provider.api_key", api_key)?;
        }

        let config = builder
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("ASSISTLEG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("agent.trigger_terms"),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // "missing field `type`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn catalog(&self) -> TopicCatalog {
        let source = HttpRetrieverSource::new(
            self.retrieval.host.clone(),
            self.retrieval.search.clone(),
        );
        TopicCatalog::new(self.retrieval.vectorstores_dir.clone(), Arc::new(source))
    }

    /// Wire the model, the topic catalog and the agent settings together
    pub fn agent_factory(&self) -> anyhow::Result<AgentFactory> {
        let provider = get_provider(self.provider.clone().into_config()?)?;
        let factory = AgentFactory::new(provider, self.catalog())?
            .with_policy(self.agent.policy())
            .with_instructions(self.agent.instructions()?);
        Ok(factory)
    }
}

fn default_model() -> String {
    openai::GROQ_MODEL.to_string()
}

fn default_openai_host() -> String {
    openai::GROQ_HOST.to_string()
}

fn default_ollama_host() -> String {
    ollama::OLLAMA_HOST.to_string()
}

fn default_ollama_model() -> String {
    ollama::OLLAMA_MODEL.to_string()
}

fn default_retrieval_host() -> String {
    "http://localhost:8000".to_string()
}

fn default_vectorstores_dir() -> PathBuf {
    PathBuf::from("vectorstores")
}

fn default_trigger_terms() -> Vec<String> {
    DEFAULT_TRIGGER_TERMS.iter().map(|t| t.to_string()).collect()
}

fn default_jurisdiction() -> String {
    DEFAULT_JURISDICTION.to_string()
}

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}
