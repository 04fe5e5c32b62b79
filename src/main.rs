//! CLI entry point: reads URLs from stdin and downloads them concurrently.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use url_dl::{Config, DownloadCoordinator, FetcherKind, SessionEnd, fetch};

/// Download URLs read from standard input, one per line
#[derive(Debug, Parser)]
#[command(name = "url-dl", version, about)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Download log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory for downloaded files
    #[arg(long, short = 'd')]
    download_dir: Option<PathBuf>,

    /// Transfer backend
    #[arg(long, value_enum)]
    fetcher: Option<FetcherArg>,

    /// Do not wait for in-flight downloads on exit
    #[arg(long)]
    no_wait: bool,

    /// Give up waiting for in-flight downloads after this many seconds
    #[arg(long, value_name = "SECS")]
    shutdown_timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FetcherArg {
    Auto,
    Curl,
    Http,
}

impl From<FetcherArg> for FetcherKind {
    fn from(arg: FetcherArg) -> Self {
        match arg {
            FetcherArg::Auto => FetcherKind::Auto,
            FetcherArg::Curl => FetcherKind::Curl,
            FetcherArg::Http => FetcherKind::Http,
        }
    }
}

impl Cli {
    fn into_config(self) -> url_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(log_file) = self.log_file {
            config.log_path = log_file;
        }
        if let Some(dir) = self.download_dir {
            config.download_dir = dir;
        }
        if let Some(fetcher) = self.fetcher {
            config.fetcher = fetcher.into();
        }
        if self.no_wait {
            config.wait_for_pending = false;
        }
        if let Some(secs) = self.shutdown_timeout {
            config.shutdown_timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("url_dl=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn start(config: Config) -> url_dl::Result<DownloadCoordinator> {
    let fetcher = fetch::from_config(&config)?;
    DownloadCoordinator::start(config, fetcher).await
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let coordinator = match cli.into_config() {
        Ok(config) => start(config).await,
        Err(e) => Err(e),
    };
    let coordinator = match coordinator {
        Ok(coordinator) => coordinator,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("url-dl: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Enter image URLs (one per line, 'exit' to quit):");

    let stdin = BufReader::new(tokio::io::stdin());
    match url_dl::run_session(stdin, &coordinator, url_dl::wait_for_signal).await {
        Ok(summary) => {
            if summary.ended_by == SessionEnd::Signal {
                eprintln!("url-dl: interrupted, {} download(s) submitted", summary.submitted);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Session ended with an error");
            eprintln!("url-dl: {e}");
            ExitCode::FAILURE
        }
    }
}
