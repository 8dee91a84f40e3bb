use clap::{Args, Parser, Subcommand};
use competency_etl::config::AppConfig;
use competency_etl::db::{self, loader, maintenance, relationships, report, schema};
use competency_etl::enrich::{TechnologyExtractor, VacancyRecord};
use competency_etl::error::AppError;
use competency_etl::export;
use competency_etl::hh::{HhClient, DEFAULT_QUERIES};
use competency_etl::telemetry;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "competency-etl",
    about = "Scrape hh.ru vacancies and build the competency analysis warehouse",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape hh.ru, extract technologies, and write timestamped CSV exports
    Scrape,
    /// Recreate the warehouse schema and load the newest CSV exports
    Load,
    /// Build the technology relationship table and its analysis views
    Relationships,
    /// Print a read-only report over the loaded warehouse
    Report,
    /// Drop pipeline data from the database
    Clean(CleanArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Drop the entire public schema instead of just the pipeline objects
    #[arg(long)]
    hard: bool,
    /// Skip the interactive confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Scrape => run_scrape(&config).await,
        Command::Load => run_load(&config).await,
        Command::Relationships => run_relationships(&config).await,
        Command::Report => run_report(&config).await,
        Command::Clean(args) => run_clean(&config, args).await,
    }
}

async fn run_scrape(config: &AppConfig) -> Result<(), AppError> {
    info!(?config.environment, "starting scrape run");

    let client = HhClient::new(config.scraper.clone())?;
    let details = client.collect_vacancies(&DEFAULT_QUERIES).await;
    if details.is_empty() {
        return Err(AppError::Pipeline(
            "no vacancies collected; nothing to export".to_string(),
        ));
    }

    let extractor = TechnologyExtractor::new();
    let records: Vec<VacancyRecord> = details
        .iter()
        .map(|detail| VacancyRecord::from_detail(detail, &extractor))
        .collect();

    let with_tech = records.iter().filter(|r| r.tech_count() > 0).count();
    info!(
        vacancies = records.len(),
        with_technologies = with_tech,
        "enrichment complete"
    );

    let timestamp = export::timestamp_now();
    let paths = export::export_all(&records, &config.export.csv_dir, &timestamp)?;

    println!("Exported {} vacancies:", records.len());
    println!("  {}", paths.vacancies.display());
    println!("  {}", paths.technologies.display());
    println!("  {}", paths.analytics.display());
    Ok(())
}

async fn run_load(config: &AppConfig) -> Result<(), AppError> {
    let pool = db::connect(&config.database).await?;

    schema::create_tables(&pool).await?;

    // Reference CSVs are optional; the warehouse still works without them,
    // competency columns just stay empty.
    let fgos_csv = config.export.fgos_csv();
    if fgos_csv.is_file() {
        let loaded = loader::load_fgos(&pool, &fgos_csv).await?;
        println!("Loaded {loaded} FGOS competencies");
    } else {
        warn!(path = %fgos_csv.display(), "FGOS reference CSV not found, skipping");
    }

    let otf_td_csv = config.export.otf_td_csv();
    if otf_td_csv.is_file() {
        let loaded = loader::load_otf_td(&pool, &otf_td_csv).await?;
        println!("Loaded {loaded} OTF/TD entries");
    } else {
        warn!(path = %otf_td_csv.display(), "OTF/TD reference CSV not found, skipping");
    }

    let (vacancies_csv, technologies_csv) =
        loader::latest_export_pair(&config.export.csv_dir)?;
    let vacancies = loader::load_vacancies(&pool, &vacancies_csv).await?;
    println!("Loaded {vacancies} vacancies from {}", vacancies_csv.display());
    let technologies = loader::load_technologies(&pool, &technologies_csv).await?;
    println!(
        "Loaded {technologies} technology rows from {}",
        technologies_csv.display()
    );

    schema::create_olap_views(&pool).await?;
    println!("OLAP views ready");

    pool.close().await;
    Ok(())
}

async fn run_relationships(config: &AppConfig) -> Result<(), AppError> {
    let pool = db::connect(&config.database).await?;
    relationships::build_all(&pool).await?;
    pool.close().await;
    Ok(())
}

async fn run_report(config: &AppConfig) -> Result<(), AppError> {
    let pool = db::connect(&config.database).await?;
    report::print_full_report(&pool).await?;
    pool.close().await;
    Ok(())
}

async fn run_clean(config: &AppConfig, args: CleanArgs) -> Result<(), AppError> {
    let action = if args.hard {
        "drop the entire public schema"
    } else {
        "drop all pipeline tables and views"
    };

    if !args.yes && !maintenance::confirm_destructive(action)? {
        return Err(AppError::Pipeline("clean aborted by operator".to_string()));
    }

    let pool = db::connect(&config.database).await?;
    if args.hard {
        maintenance::hard_clean(&pool).await?;
    } else {
        maintenance::soft_clean(&pool).await?;
    }
    maintenance::print_status(&pool).await?;
    pool.close().await;
    Ok(())
}
