use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "leadgate", version, about = "Webhook-to-HubSpot contact sync service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct HubSpotArgs {
    /// HubSpot private-app token. Absence is a startup-fatal configuration
    /// error, not a per-request one.
    #[arg(long, env = "LEADGATE_HUBSPOT_TOKEN", hide_env_values = true)]
    pub hubspot_token: String,

    /// HubSpot API base URL.
    #[arg(
        long,
        env = "LEADGATE_HUBSPOT_BASE_URL",
        default_value = "https://api.hubapi.com"
    )]
    pub hubspot_base_url: String,

    /// Request timeout toward HubSpot, in seconds. Timeouts surface as
    /// retryable CRM errors.
    #[arg(long, env = "LEADGATE_HUBSPOT_TIMEOUT_SECS", default_value = "20")]
    pub hubspot_timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Shared secret for inbound webhook signatures. When unset, signature
    /// verification is skipped (logged as a warning).
    #[arg(long, env = "LEADGATE_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Maximum accepted webhook body size in bytes.
    #[arg(long, env = "LEADGATE_MAX_PAYLOAD_BYTES", default_value = "1048576")]
    pub max_payload_bytes: usize,

    #[command(flatten)]
    pub hubspot: HubSpotArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve(ServeArgs),

    /// Print current configuration (redacted secrets).
    Config(ServeArgs),

    /// Health-check the configured HubSpot credentials.
    Check(HubSpotArgs),
}
