// src/main.rs
mod utils;
mod driver;
mod extractors;
mod pipeline;
mod portal;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use utils::AppError;
use driver::models::Browser;
use driver::webdriver::WebDriverSession;
use pipeline::ExtractionPipeline;
use portal::models::DateRange;
use portal::session::{self, Credentials};
use portal::PortalConfig;
use storage::StorageManager;

/// Extract LPJ activity tables from the DGW Spartan portal into spreadsheets
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Example: lpj_extractor --email user@example.com --password pass123 --from-date 01/01/2024 --to-date 31/01/2024"
)]
struct Args {
    /// Portal account email
    #[arg(long, env = "LPJ_EMAIL")]
    email: String,

    /// Portal account password
    #[arg(long, env = "LPJ_PASSWORD", hide_env_values = true)]
    password: String,

    /// Start date for data extraction (DD/MM/YYYY)
    #[arg(long)]
    from_date: String,

    /// End date for data extraction (DD/MM/YYYY)
    #[arg(long)]
    to_date: String,

    /// Output directory for the reports (cleared at the start of every run)
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// WebDriver server (chromedriver, geckodriver, Selenium)
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver_url: String,

    /// Browser requested from the WebDriver server
    #[arg(long, value_enum, default_value = "chrome")]
    browser: Browser,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Portal base URL
    #[arg(long, default_value = portal::DEFAULT_BASE_URL)]
    base_url: String,

    /// Seconds to wait for a document's detail view before skipping it
    #[arg(long, default_value = "30")]
    detail_timeout_secs: u64,

    /// Maximum month steps when moving a date picker to its target
    #[arg(long, default_value = "120")]
    max_calendar_steps: usize,

    /// Save the page of every skipped document to this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Debug-level logging for this tool
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn portal_config(&self) -> PortalConfig {
        PortalConfig {
            base_url: self.base_url.clone(),
            detail_timeout: Duration::from_secs(self.detail_timeout_secs),
            max_calendar_steps: self.max_calendar_steps,
            ..PortalConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);

    // 3. Validate input before touching the browser
    let range = DateRange::parse(&args.from_date, &args.to_date)?;
    let credentials = Credentials::new(&args.email, &args.password);
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(AppError::Config("Email and password must not be empty".to_string()));
    }
    let config = args.portal_config();
    tracing::debug!("Portal config: {:?}", config);

    // 4. Prepare the output directory
    let mut storage = StorageManager::new(&args.output_dir)?;
    tracing::info!("Cleaning output folder...");
    let removed = storage.clear()?;
    tracing::debug!("Removed {} old entries from {}", removed, args.output_dir.display());

    // 5. Launch the browser and sign in
    tracing::info!("Launching browser and logging in...");
    let mut browser = WebDriverSession::start(&args.webdriver_url, args.browser, !args.headed).await?;

    let outcome = run(&mut browser, &mut storage, &config, &credentials, &range, args.debug_dir.clone()).await;

    // 6. Always release the browser, but report the run's own error first
    if let Err(e) = browser.quit().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }

    let written = outcome?;
    tracing::info!("Wrote {} reports to {}", written, args.output_dir.display());
    Ok(())
}

async fn run(
    browser: &mut WebDriverSession,
    storage: &mut StorageManager,
    config: &PortalConfig,
    credentials: &Credentials,
    range: &DateRange,
    debug_dir: Option<PathBuf>,
) -> Result<usize, AppError> {
    session::login(browser, config, credentials).await?;
    session::open_filter_panel(browser, config).await?;

    let results = ExtractionPipeline::new(browser, storage, config)
        .with_debug_dir(debug_dir)
        .run(range)
        .await?;
    Ok(results.len())
}
