use std::env;
use std::path::PathBuf;

/// Remote embedding + local fallback tunables.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Credential for the remote embedding service. `None` means local-only.
    pub api_key: Option<String>,
    /// Remote embedding model id.
    pub model: String,
    /// Fixed vector width shared by every collection. The remote service is
    /// asked for this width and the local model must produce it natively.
    pub dimension: usize,
    /// Input is whitespace-collapsed and truncated to this many characters.
    pub max_input_chars: usize,
    /// Remote attempts before falling back to the local model.
    pub max_retries: u32,
    /// Exponential backoff base, in seconds (wait = base^attempt).
    pub backoff_base: u64,
    /// Skip the remote service entirely.
    pub local_only: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "text-embedding-004".to_string(),
            dimension: 384,
            max_input_chars: 5000,
            max_retries: 5,
            backoff_base: 3,
            local_only: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub num_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            num_results: 5,
        }
    }
}

/// Generative backend chain configuration.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    /// Backend model ids in priority order.
    pub models: Vec<String>,
    /// Snippets retrieved per generation request.
    pub top_k: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro".to_string(),
            ],
            top_k: 5,
        }
    }
}

/// Remote vector store connection settings.
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    pub api_key: Option<String>,
    /// Index endpoint for the documents collection. Unset falls back to the
    /// in-memory index (dev mode, nothing survives the process).
    pub docs_host: Option<String>,
    /// Index endpoint for the ads collection.
    pub ads_host: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub generation: GenerationConfig,
    pub index: IndexConfig,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            generation: GenerationConfig::default(),
            index: IndexConfig::default(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let gemini_key = env_opt("GEMINI_API_KEY");

        let mut embedding = EmbeddingConfig {
            api_key: gemini_key.clone(),
            ..EmbeddingConfig::default()
        };
        if let Some(dim) = env_parse::<usize>("ADFORGE_EMBED_DIMENSION") {
            embedding.dimension = dim;
        }
        if let Some(retries) = env_parse::<u32>("ADFORGE_EMBED_MAX_RETRIES") {
            embedding.max_retries = retries;
        }
        if let Some(base) = env_parse::<u64>("ADFORGE_EMBED_BACKOFF_BASE") {
            embedding.backoff_base = base;
        }
        embedding.local_only = env_flag("ADFORGE_EMBED_LOCAL_ONLY");

        let mut search = SearchConfig {
            api_key: env_opt("GOOGLE_SEARCH_API_KEY"),
            engine_id: env_opt("GOOGLE_SEARCH_ENGINE_ID"),
            ..SearchConfig::default()
        };
        if let Some(num) = env_parse::<usize>("ADFORGE_SEARCH_RESULTS") {
            search.num_results = num;
        }

        let mut generation = GenerationConfig {
            api_key: gemini_key,
            ..GenerationConfig::default()
        };
        if let Some(models) = env_opt("ADFORGE_GEN_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !models.is_empty() {
                generation.models = models;
            }
        }
        if let Some(top_k) = env_parse::<usize>("ADFORGE_RETRIEVE_TOP_K") {
            generation.top_k = top_k;
        }

        let index = IndexConfig {
            api_key: env_opt("PINECONE_API_KEY"),
            docs_host: env_opt("ADFORGE_DOCS_INDEX_HOST"),
            ads_host: env_opt("ADFORGE_ADS_INDEX_HOST"),
        };

        let log_dir = env_opt("ADFORGE_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        AppConfig {
            embedding,
            search,
            generation,
            index,
            log_dir,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_opt(key).and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> bool {
    matches!(
        env_opt(key).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
