use admission::calendar::{AcademicCalendar, AcademicCalendarType, CutoverYearPolicy};
use admission::config::{AdmissionSettings, AppConfig};
use admission::error::AppError;
use admission::inscription::{
    admission_router, AdmissionService, CalendarView, EnrollmentCalendar, InMemoryProfiles,
    InMemoryPropositions, InMemoryTrainings, ResolverVariant, Scenario,
};
use admission::telemetry;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

type DemoService =
    AdmissionService<InMemoryPropositions, InMemoryProfiles, InMemoryTrainings, CalendarView>;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    calendar: Arc<AcademicCalendar>,
}

#[derive(Parser, Debug)]
#[command(
    name = "OSIS Admission",
    about = "Determine academic year and enrollment pool for admission propositions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the academic calendar
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Resolve the pool of a proposition described in a scenario file
    Pool {
        #[command(subcommand)]
        command: PoolCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Scenario files seeding the in-memory propositions (repeatable)
    #[arg(long = "scenario")]
    scenarios: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// List the pools open on a given date
    Open(CalendarArgs),
}

#[derive(Args, Debug)]
struct CalendarArgs {
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// CSV export overriding the generated calendar windows
    #[arg(long)]
    calendar_csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum PoolCommand {
    /// Determine the academic year and pool, then list the confirmation elements
    Determine(DetermineArgs),
}

#[derive(Args, Debug)]
struct DetermineArgs {
    /// Scenario JSON describing the proposition, its training and its candidate
    #[arg(long)]
    scenario: PathBuf,
    /// Evaluation date (defaults to the scenario date, then today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// CSV export overriding the generated calendar windows
    #[arg(long)]
    calendar_csv: Option<PathBuf>,
    /// Resolver behaviour: current or legacy
    #[arg(long, value_parser = parse_variant)]
    variant: Option<ResolverVariant>,
}

#[derive(Debug, Deserialize)]
struct OpenPoolsQuery {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenPoolEntry {
    pool: AcademicCalendarType,
    year: i32,
}

#[derive(Debug, Serialize)]
struct OpenPoolsResponse {
    date: NaiveDate,
    open_pools: Vec<OpenPoolEntry>,
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
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Calendar {
            command: CalendarCommand::Open(args),
        } => run_calendar_open(args),
        Command::Pool {
            command: PoolCommand::Determine(args),
        } => run_pool_determine(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_variant(raw: &str) -> Result<ResolverVariant, String> {
    raw.parse::<ResolverVariant>()
        .map_err(|value| format!("unknown resolver variant '{value}', expected current or legacy"))
}

/// Generated windows around the academic year of `today`, plus the optional CSV override.
fn load_calendar(
    settings: &AdmissionSettings,
    today: NaiveDate,
) -> Result<AcademicCalendar, AppError> {
    let current_year = CutoverYearPolicy::default().reference_year(today);
    Ok(settings.calendar(current_year)?)
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let resolver = config.admission.build_resolver()?;
    let calendar = load_calendar(&config.admission, Local::now().date_naive())?;
    let scenarios = args
        .scenarios
        .iter()
        .map(Scenario::from_path)
        .collect::<Result<Vec<_>, _>>()?;
    let (propositions, profiles, trainings) = demo_adapters(&scenarios);

    let view = CalendarView::new(calendar.clone())
        .with_medicine_dentistry_period(config.admission.medicine_dentistry_period);
    let service = Arc::new(AdmissionService::new(
        Arc::new(propositions),
        Arc::new(profiles),
        Arc::new(trainings),
        Arc::new(view),
        resolver,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        calendar: Arc::new(calendar),
    };

    let app = build_app(state, service).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        variant = %config.admission.resolver_variant,
        propositions = scenarios.len(),
        "admission pool service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: AppState, service: Arc<DemoService>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/admission/calendar/open-pools", get(open_pools_endpoint))
        .with_state(state)
        .merge(admission_router(service))
}

fn demo_adapters(
    scenarios: &[Scenario],
) -> (InMemoryPropositions, InMemoryProfiles, InMemoryTrainings) {
    let propositions =
        InMemoryPropositions::with(scenarios.iter().map(|scenario| scenario.proposition.clone()));
    let profiles =
        InMemoryProfiles::with(scenarios.iter().map(|scenario| scenario.candidate.clone()));
    let trainings = scenarios.iter().fold(
        InMemoryTrainings::with(scenarios.iter().map(|scenario| scenario.training.clone())),
        |trainings, scenario| {
            trainings.offered_in(
                &scenario.training.id.acronym,
                scenario.training_offered_in.iter().copied(),
            )
        },
    );
    (propositions, profiles, trainings)
}

fn run_calendar_open(args: CalendarArgs) -> Result<(), AppError> {
    let mut settings = AppConfig::load()?.admission;
    if args.calendar_csv.is_some() {
        settings.calendar_csv = args.calendar_csv;
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let calendar = load_calendar(&settings, today)?;
    let open_pools = calendar.open_pools(today);

    println!("Open pools on {}", today);
    if open_pools.is_empty() {
        println!("- none");
    }
    for (pool, year) in open_pools.iter() {
        let window = calendar
            .entry(pool, year)
            .map(|entry| match entry.end {
                Some(end) => format!("{} -> {}", entry.start, end),
                None => format!("{} -> open", entry.start),
            })
            .unwrap_or_default();
        println!("- {} {}-{} ({})", pool, year, year + 1, window);
    }

    Ok(())
}

fn run_pool_determine(args: DetermineArgs) -> Result<(), AppError> {
    let mut settings = AppConfig::load()?.admission;
    if args.calendar_csv.is_some() {
        settings.calendar_csv = args.calendar_csv;
    }
    if let Some(variant) = args.variant {
        settings.resolver_variant = variant;
    }

    let scenario = Scenario::from_path(&args.scenario)?;
    let today = args
        .today
        .or(scenario.today)
        .unwrap_or_else(|| Local::now().date_naive());
    let calendar = load_calendar(&settings, today)?;
    let view = CalendarView::new(calendar)
        .at(today)
        .with_medicine_dentistry_period(settings.medicine_dentistry_period);

    let (propositions, profiles, trainings) = scenario.adapters();
    let service = AdmissionService::new(
        Arc::new(propositions),
        Arc::new(profiles),
        Arc::new(trainings),
        Arc::new(view),
        settings.build_resolver()?,
    );

    let id = &scenario.proposition.id;
    println!("Proposition {} ({})", id, scenario.proposition.training.acronym);
    println!(
        "Evaluated {} with the {} resolver, open pools: {}",
        today,
        settings.resolver_variant,
        service.calendar().open_pools().len()
    );

    let determination = service.determine(id)?;
    println!(
        "\nAcademic year {}-{}, pool {} ({})",
        determination.year,
        determination.year + 1,
        determination.pool,
        determination.pool.label()
    );

    let elements = service.confirmation_elements(id, Some(determination.year))?;
    println!("\nConfirmation elements");
    for element in &elements {
        match &element.answers {
            Some(answers) => println!("- {} [{}]", element.name, answers.join(" / ")),
            None => println!("- {}", element.name),
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn open_pools_endpoint(
    State(state): State<AppState>,
    Query(query): Query<OpenPoolsQuery>,
) -> impl IntoResponse {
    let date = match query.date.as_deref().map(parse_date).transpose() {
        Ok(date) => date.unwrap_or_else(|| Local::now().date_naive()),
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response();
        }
    };

    let open_pools = state
        .calendar
        .open_pools(date)
        .iter()
        .map(|(pool, year)| OpenPoolEntry { pool, year })
        .collect();

    (StatusCode::OK, Json(OpenPoolsResponse { date, open_pools })).into_response()
}
