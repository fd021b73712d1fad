//! Service configuration with environment overrides

use crate::context::window::DEFAULT_TOKEN_BUDGET;
use crate::gateway::SmsGatewayConfig;
use crate::llm::ChatClientConfig;
use serde::{Deserialize, Serialize};

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub llm: ChatClientConfig,

    #[serde(default)]
    pub gateway: SmsGatewayConfig,

    /// Calling-code prefixes allowed to use the relay; empty disables the check
    #[serde(default = "default_allowed_country_codes")]
    pub allowed_country_codes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            history: HistoryConfig::default(),
            context: ContextConfig::default(),
            llm: ChatClientConfig::default(),
            gateway: SmsGatewayConfig::default(),
            allowed_country_codes: default_allowed_country_codes(),
        }
    }
}

impl Config {
    /// Override every section from environment variables
    pub fn from_env(mut self) -> Self {
        self.server = self.server.from_env();
        self.history = self.history.from_env();
        self.context = self.context.from_env();
        self.llm = self.llm.from_env();
        self.gateway = self.gateway.from_env();

        if let Ok(val) = std::env::var("ALLOWED_COUNTRY_CODES") {
            self.allowed_country_codes = val
                .split(',')
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty())
                .collect();
        }

        self
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL used for webhook registration
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Override fields from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("BIND_ADDR") {
            self.bind_addr = val;
        }
        if let Ok(val) = std::env::var("PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = std::env::var("PUBLIC_URL") {
            self.public_url = Some(val);
        }
        self
    }

    /// Webhook callback URL registered at the gateway
    pub fn callback_url(&self) -> String {
        match &self.public_url {
            Some(base) => format!("{}/webhook", base.trim_end_matches('/')),
            None => format!("http://127.0.0.1:{}/webhook", self.port),
        }
    }
}

/// History store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_database_url() -> String {
    "sqlite://messages.db?mode=rwc".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl HistoryConfig {
    /// Override fields from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.database_url = val;
        }
        self
    }
}

/// Conversation windowing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum allowed size estimate for an outbound LLM request
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// System prompt placed at index 0 of every conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_token_budget() -> usize {
    DEFAULT_TOKEN_BUDGET
}

fn default_system_prompt() -> String {
    "Keep responses short and concise for SMS readability.".to_string()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            token_budget: default_token_budget(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl ContextConfig {
    /// Override fields from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("TOKEN_BUDGET") {
            if let Ok(budget) = val.parse() {
                self.token_budget = budget;
            }
        }
        if let Ok(val) = std::env::var("SYSTEM_PROMPT") {
            self.system_prompt = val;
        }
        self
    }
}

fn default_allowed_country_codes() -> Vec<String> {
    [
        "+61", // Australia
        "+55", // Brazil
        "+1", // Canada, USA
        "+86", // China
        "+33", // France
        "+49", // Germany
        "+852", // Hong Kong
        "+91", // India
        "+62", // Indonesia
        "+353", // Ireland
        "+972", // Israel
        "+81", // Japan
        "+60", // Malaysia
        "+52", // Mexico
        "+64", // New Zealand
        "+47", // Norway
        "+65", // Singapore
        "+82", // South Korea
        "+66", // Thailand
        "+44", // UK
    ]
    .iter()
    .map(|code| code.to_string())
    .collect()
}
