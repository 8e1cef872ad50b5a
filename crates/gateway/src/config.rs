use anyhow::{Context, Result};
use fetcher::FetchOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub fetch: FetchOptions,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: String },
}

impl GatewayConfig {
    /// Load configuration from gateway.toml and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Compile-time defaults are the bottom layer so missing keys fall back
        let defaults = config::Config::try_from(&GatewayConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder()
            .add_source(defaults);

        // Layer config files (overrides defaults). Later paths win:
        // 1. /etc/logfetch/gateway.toml (production)
        // 2. config/gateway.toml (local development)
        // 3. crates/gateway/config/gateway.toml (workspace root)
        let config_paths = vec![
            "/etc/logfetch/gateway",
            "config/gateway",
            "crates/gateway/config/gateway",
        ];

        for path in config_paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Environment variables override everything.
        // Double underscore for nested keys: GATEWAY_SERVER__BIND_ADDRESS
        builder = builder.add_source(
            config::Environment::with_prefix("GATEWAY")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.bind_address.parse::<std::net::SocketAddr>()
            .context("Invalid bind_address")?;

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be > 0");
        }
        if self.server.max_body_bytes == 0 {
            anyhow::bail!("server.max_body_bytes must be > 0");
        }

        self.fetch.validate().map_err(anyhow::Error::msg)?;

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                request_timeout_secs: 30,
                max_body_bytes: 2 * 1024 * 1024,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info,gateway=debug,fetcher=info".to_string(),
                format: LogFormat::Pretty,
                output: LogOutput::Stdout,
            },
            fetch: FetchOptions::default(),
        }
    }
}
