//! Platewire CLI and chat server entry point.
//!
//! Binary name: `platewire`
//!
//! Parses CLI arguments, initializes the database and services, then either
//! starts the WebSocket server or runs a one-off command.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use platewire_types::config::AuthConfig;
use platewire_types::user::UserId;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,platewire=debug",
        _ => "trace",
    };
    platewire_observe::tracing_setup::init_tracing(cli.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "platewire", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (config, DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            if state.config.auth.secret == AuthConfig::DEV_SECRET {
                tracing::warn!(
                    "auth.secret is the built-in development value; set a real secret in config.toml before exposing this server"
                );
            }

            let host = host.unwrap_or_else(|| state.config.host.clone());
            let port = port.unwrap_or(state.config.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Platewire chat server listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("ws://{addr}/api/v1/chat/{{peer_id}}/ws")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let shutdown = state.shutdown.clone();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    // Stop live connection loops before the listener closes.
                    shutdown.cancel();
                })
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Token { user_id, ttl_secs } => {
            let user = UserId::parse(&user_id)
                .map_err(|e| anyhow::anyhow!("cannot mint token: {e}"))?;
            let ttl = ttl_secs.unwrap_or(state.config.auth.token_ttl_secs);
            let token = state.auth.mint(&user, ttl);

            if cli.json {
                let out = serde_json::json!({
                    "user_id": user_id,
                    "ttl_secs": ttl,
                    "token": token,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!();
                println!(
                    "  {} Access token for '{}' (valid {ttl}s):",
                    console::style("🔑").bold(),
                    console::style(&user_id).cyan()
                );
                println!();
                println!("  {}", console::style(&token).yellow().bold());
                println!();
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    platewire_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
