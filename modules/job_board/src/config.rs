use serde::{Deserialize, Serialize};

/// Secret used when none is configured. Only fit for local development.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";

/// Configuration for the job_board module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobBoardConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
    #[serde(default = "default_enforce_company_ownership")]
    pub enforce_company_ownership: bool,
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordHashConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for JobBoardConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl_secs(),
            min_password_len: default_min_password_len(),
            enforce_company_ownership: default_enforce_company_ownership(),
            password_hash: PasswordHashConfig::default(),
        }
    }
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl JobBoardConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_min_password_len() -> usize {
    6
}

fn default_enforce_company_ownership() -> bool {
    true
}

// argon2 crate defaults (OWASP minimum for Argon2id)
fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
