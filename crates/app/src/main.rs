//! Reelpass - log in to TheMovieDB from the terminal.
//!
//! Usage: `reelpass [settings.toml]`
//!
//! Settings come from the optional TOML file and `REELPASS_*` variables.
//! Credentials are read from `REELPASS_USERNAME` and `REELPASS_PASSWORD`.
//! `REELPASS_APPROVAL` picks how the token is approved: `web` (default)
//! prints the approval page, `login` validates with the credentials.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use reelpass_application::{AuthenticationFlow, Approver, CancellationToken};
use reelpass_domain::{AuthSettings, Credentials, FlowResult};
use reelpass_infrastructure::{LoginApprover, ReqwestTransport, load_settings};
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::ConsoleApprover;

/// How the request token gets approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApprovalMode {
    Web,
    Login,
}

impl ApprovalMode {
    fn from_env() -> anyhow::Result<Self> {
        match std::env::var("REELPASS_APPROVAL") {
            Err(_) => Ok(Self::Web),
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" | "web" => Ok(Self::Web),
                "login" => Ok(Self::Login),
                other => bail!("REELPASS_APPROVAL must be 'web' or 'login', got '{other}'"),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Reelpass v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = load_settings(settings_path.as_deref()).context("loading settings")?;

    let credentials = Credentials::new(
        std::env::var("REELPASS_USERNAME").unwrap_or_default(),
        std::env::var("REELPASS_PASSWORD").unwrap_or_default(),
    )
    .context("REELPASS_USERNAME and REELPASS_PASSWORD must be set")?;

    let transport = Arc::new(ReqwestTransport::new(&settings)?);
    let result = match ApprovalMode::from_env()? {
        ApprovalMode::Web => {
            let approver = Arc::new(ConsoleApprover::stdio());
            login(&settings, transport, approver, credentials).await?
        }
        ApprovalMode::Login => {
            let approver = Arc::new(LoginApprover::new(Arc::clone(&transport)));
            login(&settings, transport, approver, credentials).await?
        }
    };

    match result {
        None => {
            println!("Login cancelled.");
            // The stdin reader may still be blocked on a read.
            std::process::exit(130);
        }
        Some(FlowResult::Success {
            session_id,
            user_id,
        }) => {
            println!("Session: {session_id}");
            match user_id {
                Some(id) => println!("User id: {id}"),
                None => println!("User id: unavailable"),
            }
            Ok(())
        }
        Some(FlowResult::Failure { reason }) => bail!("login failed: {reason}"),
    }
}

/// Runs one attempt, cancelling it on Ctrl-C.
///
/// Returns `None` if the attempt was cancelled.
async fn login<A: Approver + 'static>(
    settings: &AuthSettings,
    transport: Arc<ReqwestTransport>,
    approver: Arc<A>,
    credentials: Credentials,
) -> anyhow::Result<Option<FlowResult>> {
    let page = settings.authorization_page()?;
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let flow = Arc::new(AuthenticationFlow::new(transport, approver, page).with_progress(progress_tx));

    let progress = tokio::spawn(async move {
        while let Some(state) = progress_rx.recv().await {
            info!("{}", state.message());
        }
    });

    let (cancel, receiver) = CancellationToken::new();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let (done_tx, done_rx) = oneshot::channel();
    flow.authenticate(credentials, receiver, move |result| {
        let _ = done_tx.send(result);
    })
    .await
    .context("login task panicked")?;

    interrupt.abort();
    let _ = progress.await;
    Ok(done_rx.await.ok())
}
