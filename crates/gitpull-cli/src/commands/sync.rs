use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use gitpull::{
    Application, ArchiveProvider, ChannelError, ChannelEvent, EventChannel, Phase, SessionParams,
    SyncFailure, SyncNotice, SyncSession, default_launch_path,
};
use gitpull_sse::SseChannel;
use gitpull_tui::{IntervalAnimation, Outcome, SyncView};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::AppConfig;

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Repository (or archive URL) to pull
    #[arg(long)]
    pub repo: String,
    /// Notebook server base URL
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub branch: Option<String>,
    #[arg(long)]
    pub depth: Option<String>,
    /// Folder to pull into (defaults to the last segment of the repo URL)
    #[arg(long)]
    pub targetpath: Option<String>,
    /// In-app path to open afterwards
    #[arg(long)]
    pub path: Option<String>,
    #[arg(long)]
    pub xsrf: Option<String>,
    /// Archive provider (googledrive, dropbox, web); omit for git
    #[arg(long)]
    pub provider: Option<String>,
    /// Application used to pick the default path
    #[arg(long)]
    pub app: Option<String>,
    /// Print progress line by line instead of the terminal view
    #[arg(long)]
    pub plain: bool,
}

pub async fn run(args: SyncArgs, config: &AppConfig) -> Result<()> {
    let plain = args.plain || config.sync.plain;
    let timeout = config.sync.timeout_secs.map(Duration::from_secs);
    let params = session_params(args, config)?;
    let url = params.sync_url()?;

    let repo = params.repo.clone();
    let target_path = params.target_path.clone();

    let mut session = SyncSession::new(params);
    let mut notices = session.subscribe();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let driver = tokio::spawn(drive(session, open_event_stream(url), timeout, cancel_rx));

    let outcome = if plain {
        print_notices(&mut notices, &target_path).await
    } else {
        gitpull_tui::run(SyncView {
            repo: repo.clone(),
            target_path: target_path.clone(),
            notices,
            animation: Box::new(IntervalAnimation::new()),
        })
        .await?
    };

    if outcome == Outcome::Cancelled {
        let _ = cancel_tx.send(());
    }
    let phase = finish(driver).await?;
    debug!(%phase, "session ended");

    match outcome {
        Outcome::Finished { redirect_url } => {
            println!("{redirect_url}");
            Ok(())
        }
        Outcome::Failed(failure) => {
            if !plain {
                report_failure(&failure, &target_path);
            }
            anyhow::bail!("sync of {repo} failed")
        }
        Outcome::Cancelled => anyhow::bail!("sync of {repo} cancelled"),
    }
}

fn session_params(args: SyncArgs, config: &AppConfig) -> Result<SessionParams> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.base_url().to_owned());
    let mut params = SessionParams::new(base_url, args.repo);

    params.branch = args.branch;
    params.depth = args.depth;
    params.xsrf = args.xsrf;
    params.content_provider = args
        .provider
        .map(|p| {
            ArchiveProvider::parse(&p)
                .map(|provider| provider.marker().to_owned())
                .with_context(|| format!("unknown content provider: {p}"))
        })
        .transpose()?;
    if let Some(target_path) = args.targetpath {
        params.target_path = target_path;
    }

    params.path = match args.path {
        Some(path) => path,
        None => {
            let app = args.app.or_else(|| config.app.clone());
            let lab = app
                .as_deref()
                .and_then(Application::parse)
                .filter(|a| *a == Application::JupyterLab)
                .map(|_| "lab");
            default_launch_path(
                "",
                &params.target_path,
                ".",
                lab,
                params.content_provider.is_some(),
            )
        }
    };

    Ok(params)
}

async fn open_event_stream(url: reqwest::Url) -> Result<Box<dyn EventChannel>, ChannelError> {
    let client = reqwest::Client::new();
    let channel = SseChannel::connect(&client, url).await?;
    Ok(Box::new(channel))
}

/// Open the channel and run the session to completion, unless cancelled or
/// out of time. The deadline covers connecting as well as reading.
///
/// Failing to connect and running out of time both reach subscribers as a
/// dropped connection.
async fn drive<F>(
    mut session: SyncSession,
    open: F,
    timeout: Option<Duration>,
    cancel: oneshot::Receiver<()>,
) -> Phase
where
    F: Future<Output = Result<Box<dyn EventChannel>, ChannelError>>,
{
    let result = {
        let run = async {
            match open.await {
                Ok(channel) => session.attach(channel),
                Err(e) => {
                    warn!("could not open sync event stream: {e}");
                    session.handle(ChannelEvent::TransportError(e.to_string()));
                }
            }
            session.run().await
        };
        tokio::select! {
            biased;
            _ = cancel => None,
            result = with_deadline(timeout, run) => Some(result),
        }
    };

    match result {
        Some(Ok(phase)) => phase,
        Some(Err(_)) => {
            warn!("sync did not finish in time");
            session.handle(ChannelEvent::TransportError("timed out".into()));
            session.phase()
        }
        None => {
            session.close();
            session.phase()
        }
    }
}

async fn with_deadline<F: Future>(
    timeout: Option<Duration>,
    future: F,
) -> Result<F::Output, tokio::time::error::Elapsed> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, future).await,
        None => Ok(future.await),
    }
}

async fn finish(driver: JoinHandle<Phase>) -> Result<Phase> {
    driver.await.context("sync task panicked")
}

/// Plain output: pull output to stderr as it arrives, failures after it.
async fn print_notices(
    notices: &mut mpsc::UnboundedReceiver<SyncNotice>,
    target_path: &str,
) -> Outcome {
    let mut stderr = std::io::stderr();

    while let Some(notice) = notices.recv().await {
        match notice {
            SyncNotice::Syncing { output } => {
                let _ = stderr.write_all(output.as_bytes());
                let _ = stderr.flush();
            }
            SyncNotice::Finished { redirect_url } => {
                eprintln!("Sync finished");
                return Outcome::Finished { redirect_url };
            }
            SyncNotice::Error(failure) => {
                if let Some(output) = &failure.output {
                    eprintln!("{output}");
                }
                report_failure(&failure, target_path);
                return Outcome::Failed(failure);
            }
        }
    }

    Outcome::Cancelled
}

fn report_failure(failure: &SyncFailure, target_path: &str) {
    eprintln!("{failure}");
    if let Some(lines) = failure.remediation(target_path) {
        eprintln!();
        for line in lines {
            eprintln!("{line}");
        }
    }
}
