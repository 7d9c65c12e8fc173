/// Character every slash command line starts with.
pub const DEFAULT_COMMAND_PREFIX: char = '/';

#[derive(Debug, Clone)]
/// Runtime configuration for one mention pipeline instance.
pub struct MentionRuntimeConfig {
    pub api_base: String,
    pub token: String,
    /// Logins permitted to run commands; everyone else only gets a greeting.
    pub allowed_runners: Vec<String>,
    pub command_prefix: char,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

impl MentionRuntimeConfig {
    pub fn is_allowed_runner(&self, login: &str) -> bool {
        self.allowed_runners.iter().any(|runner| runner == login)
    }
}
