use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with
/// the prefix `CAMPZAP__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Public domain serving bucket objects; campaign media URLs are
    /// `https://{public_domain}/{key}`.
    #[serde(default = "default_public_domain")]
    pub public_domain: String,
    #[serde(default = "default_presign_ttl_secs")]
    pub presign_ttl_secs: u64,
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
}

/// The three fixed endpoints of the external automation service.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Instance lifecycle: qrcode / pause / delete.
    #[serde(default = "default_sync_url")]
    pub sync_url: String,
    /// Contact-list import (multipart upload).
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Campaign dispatch.
    #[serde(default = "default_dispatch_url")]
    pub dispatch_url: String,
    #[serde(default = "default_webhook_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_bucket() -> String {
    "campzap-media".to_string()
}
fn default_public_domain() -> String {
    "media.campzap.local".to_string()
}
fn default_presign_ttl_secs() -> u64 {
    3600
}
fn default_signing_secret() -> String {
    "campzap-dev-signing-secret".to_string()
}
fn default_sync_url() -> String {
    "http://localhost:5678/webhook/instance-sync".to_string()
}
fn default_upload_url() -> String {
    "http://localhost:5678/webhook/contacts-upload".to_string()
}
fn default_dispatch_url() -> String {
    "http://localhost:5678/webhook/campaign-dispatch".to_string()
}
fn default_webhook_timeout_ms() -> u64 {
    15_000
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            public_domain: default_public_domain(),
            presign_ttl_secs: default_presign_ttl_secs(),
            signing_secret: default_signing_secret(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            sync_url: default_sync_url(),
            upload_url: default_upload_url(),
            dispatch_url: default_dispatch_url(),
            timeout_ms: default_webhook_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            webhooks: WebhookConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPZAP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
