//! Command-line interface for the Roost client.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use roost_core::{
    init_endpoints, ConfigSource, FileBackend, FileConfigSource, NotificationBus,
    NullConfigSource, ReconnectPolicy, SessionStore, StateStore, StoreMutation,
};
use roost_stream::{CloseReason, EventStream, StreamSupervisor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Roost - headless client for the Roost chat server
#[derive(Debug, Parser)]
#[command(name = "roost", version, about)]
pub struct Cli {
    /// Path to the host configuration document
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the session file
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Persist a session token
    Login {
        /// Session token issued by the chat server
        #[arg(long)]
        token: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show session state and resolved endpoints
    Status,
    /// Follow the event stream (default)
    Listen {
        /// Reconnect with backoff after transport failures
        #[arg(long)]
        reconnect: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let session = open_session(cli.session.as_deref())?;
    let source = config_source(cli.config.as_deref());

    match cli.command.unwrap_or(Commands::Listen { reconnect: false }) {
        Commands::Login { token } => {
            if token.is_empty() {
                bail!("token must not be empty");
            }
            session.set_token(&token)?;
            info!("session stored");
            Ok(())
        }
        Commands::Logout => {
            session.clear()?;
            info!("session cleared");
            Ok(())
        }
        Commands::Status => {
            let endpoints = init_endpoints(source.as_ref()).await;
            println!("authenticated: {}", session.is_authenticated());
            println!("chat api:      {}", endpoints.chat_base);
            println!("event stream:  {}", endpoints.notification_base);
            Ok(())
        }
        Commands::Listen { reconnect } => listen(source, &session, reconnect).await,
    }
}

fn open_session(path: Option<&Path>) -> Result<SessionStore> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => FileBackend::default_path()?,
    };
    Ok(SessionStore::new(FileBackend::open(path)?))
}

/// The host configuration channel: a JSON document on disk. A missing file
/// is the channel-absent case and resolves to the default endpoints.
fn config_source(path: Option<&Path>) -> Box<dyn ConfigSource> {
    match path
        .map(Path::to_path_buf)
        .or_else(FileConfigSource::default_path)
    {
        Some(path) => Box::new(FileConfigSource::new(path)),
        None => Box::new(NullConfigSource),
    }
}

async fn listen(
    source: Box<dyn ConfigSource>,
    session: &SessionStore,
    reconnect: bool,
) -> Result<()> {
    let endpoints = init_endpoints(source.as_ref()).await.clone();

    let Some(token) = session.token() else {
        bail!("not logged in; run `roost login --token <token>` first");
    };

    let store = Arc::new(StateStore::new());
    store.apply(StoreMutation::SetToken(token.clone()));
    let bus = NotificationBus::default();

    // Surface notifications on stdout; the store accumulates messages.
    let mut notifications = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            println!("* {}", notification.text);
        }
    });

    if reconnect {
        let factory = {
            let store = store.clone();
            move || EventStream::new(endpoints.clone(), token.clone(), store.clone(), bus.clone())
        };
        let supervisor = StreamSupervisor::new(factory, ReconnectPolicy::default());

        let shutdown = supervisor.shutdown_token();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            shutdown.cancel();
        });

        supervisor.run().await?;
    } else {
        let mut handle = EventStream::new(endpoints, token, store, bus).open()?;

        let closer = handle.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            closer.close();
        });

        match handle.closed().await {
            CloseReason::ClosedByHandle => info!("stream closed"),
            CloseReason::ServerClosed => warn!("stream ended by server"),
            CloseReason::TransportError(e) => {
                warn!(error = %e, "stream lost; use --reconnect to retry automatically");
            }
        }
    }

    Ok(())
}
