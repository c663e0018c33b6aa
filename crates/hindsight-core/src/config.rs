//! Runtime configuration for the capture pipeline

/// Summarization collaborator settings
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Chat-completions style HTTP endpoint
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
}

impl SummarizerConfig {
    pub fn new() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Streak extension threshold for observation compression
    pub similarity_threshold: f64,

    /// Hard cap on transient-error reconnect attempts
    pub max_reconnect_attempts: u32,

    /// Flat delay before each reconnect attempt
    pub reconnect_delay_ms: u64,

    /// Prompt sent with every vision connection
    pub vision_prompt: String,

    /// Compressed-log descriptions included in searchable text
    pub search_log_prefix: usize,

    pub summarizer: SummarizerConfig,
}

impl Config {
    pub fn new() -> Self {
        Self {
            similarity_threshold: 0.6,
            max_reconnect_attempts: 3,
            reconnect_delay_ms: 1000,
            vision_prompt: "Describe what the user is doing on screen in one short sentence."
                .to_string(),
            search_log_prefix: 20,
            summarizer: SummarizerConfig::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
