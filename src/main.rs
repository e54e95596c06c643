use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cycle_client::nav::{Route, enforce_auth};
use cycle_client::services::health::{ServerStatus, StatusPoller};
use cycle_client::services::scheduler::TokioScheduler;
use cycle_client::{AppState, ClientConfig, ClientError};
use serde::Serialize;
use tracing::debug;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("not logged in; run `cycle login` first")]
    NotLoggedIn,
    #[error("session expired; run `cycle login`")]
    SessionExpired,
    #[error("server is {0}; message sending is disabled")]
    ServerOffline(ServerStatus),
    #[error("output encoding failed: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Client(e) => e.error_code(),
            Self::NotLoggedIn => "E_NOT_LOGGED_IN",
            Self::SessionExpired => "E_SESSION_EXPIRED",
            Self::ServerOffline(_) => "E_SERVER_OFFLINE",
            Self::Output(_) => "E_OUTPUT",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cycle", about = "Cycle messaging client")]
struct Cli {
    #[arg(long, env = "CYCLE_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CYCLE_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the access token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CYCLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and clear the stored token.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Check backend reachability.
    Health,
    /// List all messages.
    List,
    /// Fetch one message by id.
    Get { id: i64 },
    /// Post a message.
    Send { content: String },
    /// Poll server status and print the message list as it changes.
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    let app = match build(cli.base_url, cli.token_file) {
        Ok(app) => app,
        Err(e) => return report(&e, false),
    };
    app.session.init().await;
    let was_authenticated = app.session.session().is_authenticated;

    match run(&app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let expired = was_authenticated && app.navigator.current() == Route::Login;
            report(&e, expired)
        }
    }
}

fn build(base_url: Option<String>, token_file: Option<PathBuf>) -> Result<AppState, CliError> {
    let config = ClientConfig::from_env()?.with_overrides(base_url, token_file);
    Ok(AppState::from_config(config)?)
}

fn report(err: &CliError, session_expired: bool) -> ExitCode {
    eprintln!("error[{}]: {err}", err.code());
    for hint in hints(err, session_expired) {
        eprintln!("hint: {hint}");
    }
    ExitCode::FAILURE
}

/// Follow-up advice for a failed command. `session_expired` is true when a
/// logged-in run ended up redirected to the login view.
fn hints(err: &CliError, session_expired: bool) -> Vec<String> {
    let mut hints = Vec::new();
    if let CliError::Client(e) = err {
        if e.retryable() {
            hints.push("the backend may be down or unreachable; try again".to_owned());
        }
        if session_expired && e.status() == Some(401) {
            hints.push(CliError::SessionExpired.to_string());
        }
    }
    hints
}

async fn run(app: &AppState, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => {
            let user = app.session.login(&username, &password).await?;
            print_json(&user)
        }
        Command::Logout => {
            app.session.logout().await?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => match app.session.session().user {
            Some(user) => print_json(&user),
            None => Err(CliError::NotLoggedIn),
        },
        Command::Health => {
            let text = app.messages.health().await?;
            println!("{text}");
            Ok(())
        }
        Command::List => {
            require_session(app)?;
            print_json(&app.messages.list().await?)
        }
        Command::Get { id } => {
            require_session(app)?;
            print_json(&app.messages.get(id).await?)
        }
        Command::Send { content } => {
            require_session(app)?;
            let poller = app.status_poller();
            let status = poller.tick().await;
            if !status.can_send() {
                return Err(CliError::ServerOffline(status));
            }
            print_json(&app.feed.send(&content).await?)
        }
        Command::Watch => {
            require_session(app)?;
            run_watch(app, &app.status_poller()).await
        }
    }
}

fn require_session(app: &AppState) -> Result<(), CliError> {
    if enforce_auth(&app.session.session(), app.navigator.as_ref()) { Ok(()) } else { Err(CliError::NotLoggedIn) }
}

async fn run_watch(app: &AppState, poller: &std::sync::Arc<StatusPoller>) -> Result<(), CliError> {
    let mut status = poller.subscribe();
    let mut feed = app.feed.subscribe();
    let mut session = app.session.subscribe();
    let handle = poller.start(&TokioScheduler);
    eprintln!("watching {} every {:?}; ctrl-c to stop", app.config.base_url, poller.interval());

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = *status.borrow_and_update();
                eprintln!("server {current}");
            }
            changed = session.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                if session.borrow_and_update().user().is_none() {
                    break Err(CliError::SessionExpired);
                }
            }
            changed = feed.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let messages = feed.borrow_and_update().clone();
                if let Err(e) = print_json(&messages) {
                    break Err(e);
                }
            }
        }
    };

    handle.cancel();
    result
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
