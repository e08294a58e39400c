use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use shift_allocator::allocation::{Allocator, SeededShuffle, WorkLedger};
use shift_allocator::api::{AppState, create_router};
use shift_allocator::config::ConfigLoader;
use shift_allocator::demand::{DemandStream, WeeklyPattern};
use shift_allocator::error::EngineError;
use shift_allocator::models::{ContractMode, ShiftType};
use shift_allocator::persistence::{AssignmentSink, SqliteSink, SummaryStrategy, persist_run};
use shift_allocator::roster::Roster;
use shift_allocator::summary::SummaryFilter;
use shift_allocator::tables;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("logging setup failed: {0}")]
    Telemetry(String),
    #[error("{0}")]
    Usage(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "shift-allocator",
    about = "Assign nursing staff to shifts under contractual ceilings",
    version
)]
struct Cli {
    /// Configuration directory holding policy.yaml and patterns.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service
    Serve(ServeArgs),
    /// Allocate a roster against demand and write the results as CSV
    Allocate(AllocateArgs),
    /// Generate demand from a weekly pattern and write it as CSV
    Demand(DemandArgs),
    /// Print the stored monthly summary as CSV
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 3000)]
    port: u16,
    /// SQLite database enabling persistence and the summary endpoint
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PatternArgs {
    /// Unit to generate demand for
    #[arg(long)]
    unit: Option<String>,
    /// First day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
    /// Require this many people on every shift instead of the configured pattern
    #[arg(long)]
    uniform: Option<u32>,
}

#[derive(Args, Debug)]
struct AllocateArgs {
    /// Roster CSV
    #[arg(long)]
    roster: PathBuf,
    /// Demand CSV; when absent, demand is generated from --unit/--start/--end
    #[arg(long)]
    demand: Option<PathBuf>,
    #[command(flatten)]
    pattern: PatternArgs,
    /// Tie-break seed; drawn at random when absent
    #[arg(long)]
    seed: Option<u64>,
    /// Directory receiving asignaciones.csv and faltantes.csv
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// SQLite database the run is persisted to
    #[arg(long)]
    db: Option<PathBuf>,
    /// How the stored summary is refreshed (rebuild or incremental)
    #[arg(long, default_value_t = SummaryStrategy::Rebuild)]
    strategy: SummaryStrategy,
    /// Seed the work ledger with every stored assignment
    #[arg(long, requires = "db")]
    with_history: bool,
    /// Clear the database before allocating
    #[arg(long, requires = "db")]
    reset_db: bool,
}

#[derive(Args, Debug)]
struct DemandArgs {
    #[command(flatten)]
    pattern: PatternArgs,
    /// Output CSV; stdout when absent
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// SQLite database to read
    #[arg(long)]
    db: PathBuf,
    /// Keep only this year
    #[arg(long)]
    year: Option<i32>,
    /// Keep only this month
    #[arg(long)]
    month: Option<u32>,
    /// Keep only this unit
    #[arg(long)]
    unit: Option<String>,
    /// Keep only this shift (Mañana, Tarde, Noche)
    #[arg(long)]
    shift: Option<ShiftType>,
    /// Keep only this contract mode (Completa, Parcial)
    #[arg(long)]
    mode: Option<ContractMode>,
    /// Output CSV; stdout when absent
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("shift-allocator: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = match &cli.config {
        Some(dir) => ConfigLoader::load(dir)?,
        None => ConfigLoader::builtin(),
    };

    match cli.command {
        Command::Serve(args) => run_server(config, args).await,
        Command::Allocate(args) => run_allocate(&config, args),
        Command::Demand(args) => run_demand(&config, args),
        Command::Summary(args) => run_summary(args),
    }
}

fn init_tracing(level: &str) -> Result<(), CliError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|err| CliError::Telemetry(format!("invalid log level '{level}': {err}")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init()
        .map_err(|err| CliError::Telemetry(err.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn pattern_demand(config: &ConfigLoader, args: &PatternArgs) -> Result<DemandStream, CliError> {
    let (Some(unit), Some(start), Some(end)) = (&args.unit, args.start, args.end) else {
        return Err(CliError::Usage(
            "pattern demand needs --unit, --start and --end".to_string(),
        ));
    };
    let pattern = match args.uniform {
        Some(count) => WeeklyPattern::uniform(count),
        None => *config.pattern(unit)?,
    };
    Ok(DemandStream::generate_range(unit, start, end, &pattern)?)
}

async fn run_server(config: ConfigLoader, args: ServeArgs) -> Result<(), CliError> {
    let mut state = AppState::new(config);
    if let Some(db) = &args.db {
        state = state.with_sink(SqliteSink::open(db)?);
    }

    let app = create_router(state);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, persistence = args.db.is_some(), "shift allocator listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn run_allocate(config: &ConfigLoader, args: AllocateArgs) -> Result<(), CliError> {
    let policy = config.policy();

    // Validate everything before touching the database.
    let roster = Roster::from_records(tables::read_roster_file(&args.roster)?, policy)?;
    let demand = match &args.demand {
        Some(path) => DemandStream::from_records(tables::read_demand_file(path)?)?,
        None => pattern_demand(config, &args.pattern)?,
    };

    let mut sink = args.db.as_deref().map(SqliteSink::open).transpose()?;
    if let Some(sink) = sink.as_mut().filter(|_| args.reset_db) {
        sink.reset()?;
        info!("Assignment store reset");
    }
    let ledger = match sink.as_ref().filter(|_| args.with_history) {
        Some(sink) => WorkLedger::from_events(&sink.load_events()?),
        None => WorkLedger::new(),
    };

    let tie_breaker = args
        .seed
        .map_or_else(SeededShuffle::from_entropy, SeededShuffle::new);
    let result = Allocator::new(&roster, policy, tie_breaker)
        .with_ledger(ledger)
        .run(&demand);

    fs::create_dir_all(&args.out_dir)?;
    tables::write_assignments(
        output(Some(&args.out_dir.join("asignaciones.csv")))?,
        &result.assignments,
    )?;
    tables::write_uncovered(
        output(Some(&args.out_dir.join("faltantes.csv")))?,
        &result.uncovered,
    )?;

    println!(
        "run {} (seed {}): {} assigned, {} short of {} required ({}% covered)",
        result.run_id,
        result.seed.map_or_else(|| "-".to_string(), |seed| seed.to_string()),
        result.coverage.assigned,
        result.coverage.shortfall,
        result.coverage.required,
        result.coverage.coverage_percent(),
    );

    // A failed write is reported but the CSV results above are kept.
    if let Some(sink) = sink.as_mut() {
        match persist_run(sink, &result, args.strategy) {
            Ok(summary) => println!("persisted; {} summary rows stored", summary.len()),
            Err(err) => {
                warn!(run_id = %result.run_id, error = %err, "Persisting allocation run failed");
                return Err(err.into());
            }
        }
    }
    Ok(())
}

fn run_demand(config: &ConfigLoader, args: DemandArgs) -> Result<(), CliError> {
    let demand = pattern_demand(config, &args.pattern)?;
    tables::write_demand(output(args.output.as_deref())?, &demand)?;
    info!(slots = demand.len(), required = demand.total_required(), "Demand written");
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<(), CliError> {
    let sink = SqliteSink::open(&args.db)?;
    let filter = SummaryFilter {
        year: args.year,
        month: args.month,
        unit: args.unit,
        shift_type: args.shift,
        contract_mode: args.mode,
    };
    let summary = sink.load_summary()?.filter(&filter);
    tables::write_summary(output(args.output.as_deref())?, &summary)?;

    let total = summary.grand_total();
    info!(rows = summary.len(), hours = %total.hours, shifts = total.shifts, "Summary written");
    Ok(())
}
