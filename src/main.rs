use std::fs::OpenOptions;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stockpulse::application::usecases::{DispatchUseCase, PollTargetUseCase};
use stockpulse::application::{DesktopNotifier, Notifier, Scheduler, SchedulerSettings};
use stockpulse::infrastructure::{
    clock::SystemClock, console_notifier::ConsoleNotifier, desktop_notifier::OsDesktopNotifier,
    http_fetcher::HttpPageFetcher, memory_store::InMemoryHistoryStore,
    twilio_notifier::TwilioNotifier,
};
use stockpulse::interfaces::config::Config;

#[derive(Parser, Debug)]
#[command(name = "stockpulse")]
struct Args {
    /// Path to a YAML/JSON config file; defaults to the JSON in $STOCKCONF
    #[arg(long)]
    config: Option<String>,

    /// Append-only JSON log file
    #[arg(long, default_value = "stock.txt")]
    log_file: String,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Do not send SMS (console only)
    #[arg(long)]
    dry_run: bool,
}

fn init_logging(log_file: &str) -> std::io::Result<WorkerGuard> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockpulse=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false).json())
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    Ok(guard)
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("cannot install SIGTERM handler: {e}");
                let _ = ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
    tracing::info!("shutdown signal received");
    cancel.cancel();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match init_logging(&args.log_file) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("cannot open log file {}: {e}", args.log_file);
            std::process::exit(1);
        }
    };
    let _ = dotenvy::dotenv();
    tracing::debug!(os = std::env::consts::OS, "operating system detected");

    // 1) load config
    let loaded = match &args.config {
        Some(path) => Config::load_from_file(path),
        None => Config::from_env(),
    };
    let cfg = match loaded {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let registry = match cfg.to_registry() {
        Ok(r) => Arc::new(r),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    for user in registry.users() {
        tracing::info!(user = %user.name, cooldown = user.cooldown_seconds, "loaded user");
    }

    // 2) build infra
    let fetcher = match HttpPageFetcher::new(cfg.url_timeout(), cfg.user_agent()) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let notifier: Arc<dyn Notifier> = if args.dry_run {
        tracing::warn!("--dry-run enabled: only console output");
        Arc::new(ConsoleNotifier::new())
    } else {
        Arc::new(TwilioNotifier::new(cfg.twilio_credentials()))
    };
    let desktop: Option<Arc<dyn DesktopNotifier>> = if cfg.timing.osnotify {
        Some(Arc::new(OsDesktopNotifier::new()))
    } else {
        None
    };
    let clock = Arc::new(SystemClock);

    // 3) usecases
    let dispatch = DispatchUseCase {
        notifier,
        desktop,
        clock: clock.clone(),
    };
    let mut scheduler = Scheduler::new(
        registry,
        PollTargetUseCase::new(Arc::new(fetcher)),
        dispatch,
        Arc::new(InMemoryHistoryStore::new()),
        clock,
        SchedulerSettings {
            looptime: cfg.looptime(),
        },
    );

    // 4) run
    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    if args.once {
        scheduler.run_once(&cancel).await;
        tracing::info!("run once completed");
        return;
    }

    scheduler.run(cancel).await;
}
