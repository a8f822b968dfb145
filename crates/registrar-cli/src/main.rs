mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use registrar_store::DuckStore;
use registrar_sync::{
    DEFAULT_BASE_URL, FilingArchive, RegistryClient, RegistryConfig, RegistryError,
    RegistrySource, ReportError, Syncer, load_report,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "registrar", version, about = "Fetch, store, and report company registry records")]
struct Cli {
    #[arg(long, global = true, env = "REGISTRAR_DB", default_value = "data/companies.duckdb")]
    db: PathBuf,
    #[arg(
        long,
        global = true,
        env = "COMPANIES_HOUSE_API_KEY",
        hide_env_values = true,
        help = "Registry API key, sent as the basic-auth username"
    )]
    api_key: Option<String>,
    #[arg(long, global = true, env = "REGISTRAR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, global = true, env = "REGISTRAR_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
    #[arg(
        long,
        global = true,
        env = "REGISTRAR_ARCHIVE_DIR",
        default_value = "data",
        help = "Directory for raw filing-history JSON dumps"
    )]
    archive_dir: PathBuf,
    #[arg(long, global = true, help = "Do not write filing-history JSON dumps")]
    no_archive: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and its tables if they do not exist.
    InitDb,
    /// Fetch a company from the registry and store it.
    Fetch { company_number: String },
    /// Print the stored report for a company.
    Report { company_number: String },
    /// Check the API key with a single profile request.
    Check { company_number: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("registrar v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::InitDb => init_db(&cli.db),
        Commands::Fetch { company_number } => fetch(&cli, company_number).await,
        Commands::Report { company_number } => report(&cli.db, company_number),
        Commands::Check { company_number } => check(&cli, company_number).await,
    }
}

fn open_store(path: &Path) -> anyhow::Result<DuckStore> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    DuckStore::open_persistent(path).with_context(|| format!("opening {}", path.display()))
}

fn registry_client(cli: &Cli) -> anyhow::Result<RegistryClient> {
    let api_key = cli
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .context("no API key: set COMPANIES_HOUSE_API_KEY or pass --api-key")?;
    let config = RegistryConfig::new(api_key)
        .with_base_url(&cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    RegistryClient::new(config).context("building registry client")
}

fn company_number_arg(raw: &str) -> anyhow::Result<&str> {
    let company_number = raw.trim();
    if company_number.is_empty() {
        bail!("please enter a company number");
    }
    Ok(company_number)
}

fn init_db(path: &Path) -> anyhow::Result<()> {
    let store = open_store(path)?;
    println!("Database ready at {}", path.display());
    println!("  companies  {}", store.company_count()?);
    println!("  officers   {}", store.officer_count()?);
    println!("  filings    {}", store.filing_count()?);
    Ok(())
}

async fn fetch(cli: &Cli, raw: &str) -> anyhow::Result<()> {
    let company_number = company_number_arg(raw)?;
    let client = registry_client(cli)?;
    let store = Arc::new(open_store(&cli.db)?);

    let mut syncer = Syncer::new(client, store);
    if !cli.no_archive {
        syncer = syncer.with_archive(FilingArchive::new(&cli.archive_dir));
    }

    match syncer.sync(company_number).await {
        Ok(report) => {
            println!(
                "Stored {} ({}): {} officers, {} filings",
                report.company_name, report.company_number, report.officers, report.filings
            );
            Ok(())
        }
        Err(err) => bail!("{}", err.user_message()),
    }
}

fn report(db: &Path, raw: &str) -> anyhow::Result<()> {
    let company_number = company_number_arg(raw)?;
    let store = open_store(db)?;
    match load_report(&store, company_number) {
        Ok(report) => display::print_report(&report),
        Err(ReportError::CompanyNotFound(id)) => {
            bail!("company {id} is not in the database; run `registrar fetch {id}` first")
        }
        Err(err) => Err(err.into()),
    }
}

async fn check(cli: &Cli, raw: &str) -> anyhow::Result<()> {
    let company_number = company_number_arg(raw)?;
    let client = registry_client(cli)?;
    match client.fetch_profile(company_number).await {
        Ok(profile) => {
            println!("API call successful: {} ({})", profile.company_name, company_number);
            if !profile.company_status.is_empty() {
                println!("  status {}", profile.company_status);
            }
            Ok(())
        }
        Err(RegistryError::Unauthorized { .. }) => bail!("unauthorized: invalid API key"),
        Err(RegistryError::NotFound { .. }) => bail!("company {company_number} not found"),
        Err(err) => Err(anyhow::Error::new(err).context("registry check failed")),
    }
}
