//! Trialflux CLI - Command-line interface for Trialflux
//!
//! Commands:
//! - summarize: Summarize a recorded session
//! - validate: Check a session can be finalized
//! - kpis: Compute progress KPIs over data points
//! - mock: Generate demonstration data
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use chrono::{Days, NaiveDate, Utc};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use trialflux::analytics::{self, AnalysisMetric, DataPoint, DateWindow, KpiStats};
use trialflux::config::Config;
use trialflux::mock;
use trialflux::session::{DataCollectionSession, SessionData, SessionSummary};
use trialflux::{logging, CollectionError, PRODUCER_NAME, TRIALFLUX_VERSION};

/// Trialflux - On-device compute engine for ABA session data
#[derive(Parser)]
#[command(name = "trialflux")]
#[command(version = TRIALFLUX_VERSION)]
#[command(about = "Summarize ABA sessions and compute progress analytics", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a recorded session
    Summarize {
        /// Session or session-data JSON file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that a session satisfies its finalization rules
    Validate {
        /// Session or session-data JSON file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute KPI statistics over a data point series
    Kpis {
        /// JSON array of data points (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Trailing date window
        #[arg(long)]
        window: Option<WindowArg>,

        /// Reference date for the window (defaults to today, UTC)
        #[arg(long)]
        reference_date: Option<NaiveDate>,

        /// Keep only points recorded by this therapist
        #[arg(long)]
        therapist: Option<String>,

        /// Trend threshold (overrides the configuration file)
        #[arg(long)]
        threshold: Option<f64>,

        /// Goal line (overrides the configuration file)
        #[arg(long)]
        goal: Option<f64>,
    },

    /// Generate demonstration data
    Mock {
        #[arg(value_enum)]
        kind: MockKind,

        /// Program id for generated series
        #[arg(long, default_value = "prog-001")]
        program_id: String,

        /// Metric for analytics series
        #[arg(long, value_enum, default_value = "percentage")]
        metric: MetricArg,

        /// First day of analytics series (defaults to `days` before today)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Number of days in analytics series
        #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=MAX_MOCK_DAYS))]
        days: u32,

        /// Number of invitations
        #[arg(long, default_value = "15")]
        count: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Ten years of daily points
const MAX_MOCK_DAYS: i64 = 3650;

#[derive(Clone, Copy, ValueEnum)]
enum WindowArg {
    #[value(name = "7d")]
    Days7,
    #[value(name = "30d")]
    Days30,
    #[value(name = "90d")]
    Days90,
}

impl From<WindowArg> for DateWindow {
    fn from(w: WindowArg) -> Self {
        match w {
            WindowArg::Days7 => DateWindow::Days7,
            WindowArg::Days30 => DateWindow::Days30,
            WindowArg::Days90 => DateWindow::Days90,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Percentage,
    Frequency,
    Duration,
    Rate,
}

impl From<MetricArg> for AnalysisMetric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Percentage => AnalysisMetric::Percentage,
            MetricArg::Frequency => AnalysisMetric::Frequency,
            MetricArg::Duration => AnalysisMetric::Duration,
            MetricArg::Rate => AnalysisMetric::Rate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MockKind {
    /// Daily data points for a program
    Analytics,
    /// Twenty-session learning curve with phase markers
    Sessions,
    /// Seed programs
    Programs,
    /// Seed folder-sharing invitations
    Invitations,
    /// Seed student folders
    Students,
    /// Seed therapy team
    Team,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TrialfluxCliError> {
    let config_path = cli.config.as_deref();

    // Doctor reports config problems instead of failing on them
    if let Commands::Doctor { json } = cli.command {
        return cmd_doctor(config_path, json);
    }

    let mut config = Config::load_or_default(config_path)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init(&config.logging);

    match cli.command {
        Commands::Summarize { input, pretty } => cmd_summarize(&input, pretty),

        Commands::Validate { input, json } => cmd_validate(&input, &config, json),

        Commands::Kpis {
            input,
            window,
            reference_date,
            therapist,
            threshold,
            goal,
        } => {
            if let Some(threshold) = threshold {
                config.analysis.trend_threshold = threshold;
            }
            if let Some(goal) = goal {
                config.analysis.goal_value = goal;
            }
            config.analysis.validate()?;
            cmd_kpis(
                &input,
                &config,
                window.map(DateWindow::from),
                reference_date,
                therapist.as_deref(),
            )
        }

        Commands::Mock {
            kind,
            program_id,
            metric,
            start,
            days,
            count,
            seed,
        } => cmd_mock(kind, &program_id, metric.into(), start, days, count, seed),

        Commands::Doctor { .. } => Ok(()),
    }
}

fn cmd_summarize(input: &Path, pretty: bool) -> Result<(), TrialfluxCliError> {
    let data = read_session_data(input)?;
    let summary = data.summarize();

    let report = SummaryReport {
        dimension: data.dimension().as_str().to_string(),
        primary_value: summary.primary_value(),
        summary,
    };

    if pretty {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}

fn cmd_validate(input: &Path, config: &Config, json: bool) -> Result<(), TrialfluxCliError> {
    let data = read_session_data(input)?;
    let result = data.check_complete(config.recorder.require_prompt_level);

    let report = ValidationReport {
        dimension: data.dimension().as_str().to_string(),
        complete: result.is_ok(),
        error: result.as_ref().err().map(|e| e.to_string()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.complete {
        println!("Session ({}) is complete", report.dimension);
    } else {
        println!(
            "Session ({}) is incomplete: {}",
            report.dimension,
            report.error.as_deref().unwrap_or("unknown reason")
        );
    }

    result.map_err(|e| TrialfluxCliError::ValidationFailed(e.to_string()))
}

fn cmd_kpis(
    input: &Path,
    config: &Config,
    window: Option<DateWindow>,
    reference_date: Option<NaiveDate>,
    therapist: Option<&str>,
) -> Result<(), TrialfluxCliError> {
    let mut points: Vec<DataPoint> = serde_json::from_str(&read_input(input)?)?;
    points.sort_by_key(|p| p.date);

    let filtered = match window {
        Some(window) => {
            let reference = reference_date.unwrap_or_else(|| Utc::now().date_naive());
            analytics::filter_points(&points, window, reference, therapist)
        }
        None => points
            .into_iter()
            .filter(|p| therapist.map_or(true, |id| p.therapist_id == id))
            .collect(),
    };

    let kpis = analytics::calculate_kpis(&filtered, &config.analysis);
    let report = KpiReport {
        kpis,
        goal: config.analysis.goal_value,
        at_goal: analytics::at_goal(&filtered, config.analysis.goal_value),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_mock(
    kind: MockKind,
    program_id: &str,
    metric: AnalysisMetric,
    start: Option<NaiveDate>,
    days: u32,
    count: usize,
    seed: u64,
) -> Result<(), TrialfluxCliError> {
    let output = match kind {
        MockKind::Analytics => {
            let start = match start {
                Some(start) => start,
                None => Utc::now()
                    .date_naive()
                    .checked_sub_days(Days::new(u64::from(days)))
                    .ok_or_else(|| {
                        TrialfluxCliError::InvalidArgument(format!(
                            "cannot start {} days before today",
                            days
                        ))
                    })?,
            };
            serde_json::to_string_pretty(&mock::generate_analytics_series(
                program_id, metric, start, days, seed,
            ))?
        }
        MockKind::Sessions => serde_json::to_string_pretty(&serde_json::json!({
            "sessions": mock::generate_session_series(program_id, seed),
            "phaseChanges": mock::PHASE_CHANGES,
        }))?,
        MockKind::Programs => serde_json::to_string_pretty(&mock::seed_programs())?,
        MockKind::Invitations => {
            serde_json::to_string_pretty(&mock::seed_invitations(count, Utc::now(), seed))?
        }
        MockKind::Students => serde_json::to_string_pretty(&mock::seed_students())?,
        MockKind::Team => serde_json::to_string_pretty(&mock::seed_team())?,
    };

    println!("{}", output);
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), TrialfluxCliError> {
    let mut checks = Vec::new();

    let config = match Config::load_or_default(config_path) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: match config_path {
                    Some(path) => format!("Loaded {}", path.display()),
                    None => "Using built-in defaults".to_string(),
                },
            });
            Some(config)
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            });
            None
        }
    };

    if let Some(config) = &config {
        let level_check = match tracing_subscriber::EnvFilter::try_new(&config.logging.level) {
            Ok(_) => DoctorCheck {
                name: "log_level".to_string(),
                status: CheckStatus::Ok,
                message: format!("Log level '{}'", config.logging.level),
            },
            Err(e) => DoctorCheck {
                name: "log_level".to_string(),
                status: CheckStatus::Warning,
                message: format!("Invalid log level '{}': {}", config.logging.level, e),
            },
        };
        checks.push(level_check);

        checks.push(match &config.drafts.dir {
            None => DoctorCheck {
                name: "drafts".to_string(),
                status: CheckStatus::Ok,
                message: "Drafts kept in memory".to_string(),
            },
            Some(dir) if dir.is_dir() => DoctorCheck {
                name: "drafts".to_string(),
                status: CheckStatus::Ok,
                message: format!("Draft directory {}", dir.display()),
            },
            Some(dir) => DoctorCheck {
                name: "drafts".to_string(),
                status: CheckStatus::Warning,
                message: format!("Draft directory {} does not exist yet", dir.display()),
            },
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TRIALFLUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trialflux Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TrialfluxCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, TrialfluxCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// Accept either a full session or its bare tagged record
fn read_session_data(input: &Path) -> Result<SessionData, TrialfluxCliError> {
    let text = read_input(input)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    if value.get("record").is_some() {
        let session: DataCollectionSession = serde_json::from_value(value)?;
        return Ok(session.record);
    }
    Ok(serde_json::from_value(value)?)
}

// Error types

#[derive(Debug)]
enum TrialfluxCliError {
    Io(io::Error),
    Collection(CollectionError),
    Json(serde_json::Error),
    InvalidArgument(String),
    ValidationFailed(String),
    DoctorFailed,
}

impl From<io::Error> for TrialfluxCliError {
    fn from(e: io::Error) -> Self {
        TrialfluxCliError::Io(e)
    }
}

impl From<CollectionError> for TrialfluxCliError {
    fn from(e: CollectionError) -> Self {
        TrialfluxCliError::Collection(e)
    }
}

impl From<serde_json::Error> for TrialfluxCliError {
    fn from(e: serde_json::Error) -> Self {
        TrialfluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrialfluxCliError> for CliError {
    fn from(e: TrialfluxCliError) -> Self {
        match e {
            TrialfluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrialfluxCliError::Collection(e) => {
                let hint = if e.is_user_correctable() {
                    "Complete or correct the recorded data and retry"
                } else {
                    "Check the configuration file and input data"
                };
                CliError {
                    code: "COLLECTION_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            TrialfluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax and field names".to_string()),
            },
            TrialfluxCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: Some("Pass --start explicitly or use fewer --days".to_string()),
            },
            TrialfluxCliError::ValidationFailed(msg) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: msg,
                hint: Some("Record every trial or interval before finalizing".to_string()),
            },
            TrialfluxCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReport {
    dimension: String,
    primary_value: Option<f64>,
    summary: SessionSummary,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    dimension: String,
    complete: bool,
    error: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct KpiReport {
    kpis: KpiStats,
    goal: f64,
    at_goal: bool,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
