use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use leadgate_core::signature::SignatureConfig;
use leadgate_core::sync::SyncEngine;
use leadgate_hubspot::HubSpotClient;
use leadgate_server::cli::{Cli, Commands, HubSpotArgs};
use leadgate_server::server::AppState;

fn build_client(args: &HubSpotArgs) -> HubSpotClient {
    HubSpotClient::with_timeout(
        &args.hubspot_token,
        Duration::from_secs(args.hubspot_timeout_secs),
    )
    .with_api_base(&args.hubspot_base_url)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    leadgate_core::o11y::init_global_from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            if args.webhook_secret.is_none() {
                tracing::warn!(
                    "no webhook secret configured; inbound signatures will not be verified"
                );
            }

            let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
            let client = build_client(&args.hubspot);
            let state = AppState::new(
                Arc::new(SyncEngine::new(Arc::new(client))),
                SignatureConfig::new(args.webhook_secret),
                args.max_payload_bytes,
            );
            leadgate_server::server::serve(addr, state).await?;
        }
        Commands::Config(args) => {
            // Keep this intentionally simple: print the resolved settings.
            fn redact(s: &str) -> String {
                if s.len() <= 8 {
                    return "***".to_string();
                }
                format!("{}***{}", &s[..4], &s[s.len() - 4..])
            }

            let cfg = serde_json::json!({
                "host": args.host,
                "port": args.port,
                "hubspot_base_url": args.hubspot.hubspot_base_url,
                "hubspot_timeout_secs": args.hubspot.hubspot_timeout_secs,
                "hubspot_token": redact(&args.hubspot.hubspot_token),
                "webhook_secret": args.webhook_secret.as_deref().map(redact),
                "max_payload_bytes": args.max_payload_bytes,
            });
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        Commands::Check(args) => {
            let client = build_client(&args);
            match client.check().await {
                Ok(()) => println!("hubspot: ok"),
                Err(e) => println!("hubspot: error ({e})"),
            }
        }
    }

    Ok(())
}
