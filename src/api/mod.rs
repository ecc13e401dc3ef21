use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::core::{
    Evaluation, FileStore, InputConfig, InputField, InputModel, PriceCoupling, Session,
    SessionSettings, VerdictPolicy, evaluate, format_currency, format_rate,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPolicy {
    Simple,
    IncomeCap,
}

impl From<CliPolicy> for VerdictPolicy {
    fn from(value: CliPolicy) -> Self {
        match value {
            CliPolicy::Simple => VerdictPolicy::Simple,
            CliPolicy::IncomeCap => VerdictPolicy::IncomeCap,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCoupling {
    Off,
    FollowIncome,
    CapToIncome,
}

impl From<CliCoupling> for PriceCoupling {
    fn from(value: CliCoupling) -> Self {
        match value {
            CliCoupling::Off => PriceCoupling::Off,
            CliCoupling::FollowIncome => PriceCoupling::FollowIncome,
            CliCoupling::CapToIncome => PriceCoupling::CapToIncome,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPolicy {
    #[serde(alias = "basic", alias = "flat")]
    Simple,
    #[serde(alias = "incomeCap", alias = "income_cap", alias = "advanced")]
    IncomeCap,
}

impl From<ApiPolicy> for VerdictPolicy {
    fn from(value: ApiPolicy) -> Self {
        match value {
            ApiPolicy::Simple => VerdictPolicy::Simple,
            ApiPolicy::IncomeCap => VerdictPolicy::IncomeCap,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EvaluatePayload {
    gross_annual_income: Option<f64>,
    target_property_price: Option<f64>,
    current_savings: Option<f64>,
    monthly_savings: Option<f64>,
    property_growth_rate: Option<f64>,
    policy: Option<ApiPolicy>,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: InputModel,
    policy: VerdictPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsResponse {
    inputs: InputModel,
    ranges: InputConfig,
    policy: VerdictPolicy,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "homeown",
    about = "Estimate how long it takes to save a home deposit while prices keep rising"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply edits to the stored inputs and print the verdict
    Evaluate(EvaluateArgs),
    /// Forget the stored inputs
    Reset {
        #[arg(long, default_value = ".homeown", help = "Directory holding the stored inputs")]
        store_dir: PathBuf,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    #[arg(long, help = "Gross annual household income")]
    income: Option<f64>,
    #[arg(long, help = "Target property price today")]
    price: Option<f64>,
    #[arg(long, help = "Savings already put aside")]
    savings: Option<f64>,
    #[arg(long, help = "Amount saved each month")]
    monthly: Option<f64>,
    #[arg(long, help = "Annual property price growth in percent, e.g. 6")]
    growth: Option<f64>,
    #[arg(
        long,
        value_enum,
        default_value_t = CliPolicy::IncomeCap,
        help = "Deposit rule: flat 10% or raised when 4x income cannot cover the price"
    )]
    policy: CliPolicy,
    #[arg(
        long,
        value_enum,
        default_value_t = CliCoupling::Off,
        help = "How an income edit retargets the property price"
    )]
    coupling: CliCoupling,
    #[arg(long, default_value = ".homeown", help = "Directory holding the stored inputs")]
    store_dir: PathBuf,
    #[arg(long, help = "Print the evaluation as JSON")]
    json: bool,
}

impl EvaluateArgs {
    // Income goes first so an explicit price overrides any coupled retarget.
    fn edits(&self) -> Vec<(InputField, f64)> {
        [
            (InputField::GrossAnnualIncome, self.income),
            (InputField::TargetPropertyPrice, self.price),
            (InputField::CurrentSavings, self.savings),
            (InputField::MonthlySavings, self.monthly),
            (InputField::PropertyGrowthRate, self.growth),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    fn settings(&self) -> SessionSettings {
        SessionSettings {
            config: InputConfig::default(),
            policy: self.policy.into(),
            coupling: self.coupling.into(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Evaluate(args) => {
            let output = run_evaluate(&args)?;
            println!("{output}");
            Ok(())
        }
        Command::Reset { store_dir } => {
            let mut session = Session::start(FileStore::new(&store_dir), SessionSettings::default());
            session.reset();
            println!("Cleared stored inputs in {}", session.store().dir().display());
            Ok(())
        }
        Command::Serve { port } => run_http_server(port)
            .await
            .map_err(|e| format!("Server error: {e}")),
    }
}

fn run_evaluate(args: &EvaluateArgs) -> Result<String, String> {
    let mut session = Session::start(FileStore::new(&args.store_dir), args.settings());
    let mut evaluation = session.evaluate();
    for (field, value) in args.edits() {
        evaluation = session.set(field, value);
    }

    if args.json {
        serde_json::to_string_pretty(&evaluation)
            .map_err(|e| format!("Failed to serialize evaluation: {e}"))
    } else {
        Ok(render_text(&evaluation))
    }
}

fn render_text(evaluation: &Evaluation) -> String {
    let inputs = &evaluation.inputs;
    let verdict = &evaluation.verdict;

    let mut lines = vec![
        format!("Income          {} / year", format_currency(inputs.gross_annual_income)),
        format!("Target price    {}", format_currency(inputs.target_property_price)),
        format!(
            "Savings         {} (+{} / month)",
            format_currency(inputs.current_savings),
            format_currency(inputs.monthly_savings)
        ),
        format!("Price growth    {}% / year", format_rate(inputs.property_growth_rate)),
        String::new(),
    ];

    if let Some(projection) = &evaluation.projection {
        lines.push(format!(
            "Deposit today   {} ({}%)",
            format_currency(projection.deposit_today),
            format_rate((projection.deposit_percent_used * 1_000.0).round() / 10.0)
        ));
    }
    lines.push(format!("Time to save    {}", verdict.time_to_save));
    lines.push(format!("Verdict         {}", verdict.label));
    lines.push(format!("  {}", verdict.detail));
    lines.push(format!("  {}", verdict.outcome));
    if let Some(line) = &verdict.supporting_line {
        lines.push(format!("  {line}"));
    }
    if verdict.rule_of_thumb_only {
        lines.push("  Rule-of-thumb only. This is not a lending decision.".to_string());
    }

    let meter: Vec<String> = verdict
        .meter
        .iter()
        .map(|segment| {
            if segment.active {
                format!("[{}]", segment.label)
            } else {
                segment.label.to_string()
            }
        })
        .collect();
    lines.push(format!("Meter           {}", meter.join(" | ")));
    lines.push(format!("Next steps      {}", evaluation.next_steps_link));
    lines.join("\n")
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!("deposit calculator API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/defaults");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/evaluate",
            get(evaluate_get_handler).post(evaluate_post_handler),
        )
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler)
}

async fn defaults_handler() -> Response {
    let config = InputConfig::default();
    json_response(
        StatusCode::OK,
        DefaultsResponse {
            inputs: config.defaults(),
            ranges: config,
            policy: SessionSettings::default().policy,
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn evaluate_get_handler(
    payload: Result<Query<EvaluatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => evaluate_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn evaluate_post_handler(payload: Result<Json<EvaluatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => evaluate_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

fn evaluate_handler_impl(payload: EvaluatePayload) -> Response {
    let request = api_request_from_payload(payload);
    let evaluation = evaluate(&request.inputs, &InputConfig::default(), request.policy);
    json_response(StatusCode::OK, evaluation)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<EvaluatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload))
}

// Missing fields take their defaults; out-of-range values pass through and
// surface as a NEEDS_INPUT verdict rather than an error.
fn api_request_from_payload(payload: EvaluatePayload) -> ApiRequest {
    let mut inputs = InputConfig::default().defaults();
    let provided = [
        (InputField::GrossAnnualIncome, payload.gross_annual_income),
        (InputField::TargetPropertyPrice, payload.target_property_price),
        (InputField::CurrentSavings, payload.current_savings),
        (InputField::MonthlySavings, payload.monthly_savings),
        (InputField::PropertyGrowthRate, payload.property_growth_rate),
    ];
    for (field, value) in provided {
        if let Some(v) = value {
            inputs.set(field, v);
        }
    }

    ApiRequest {
        inputs,
        policy: payload
            .policy
            .map_or(SessionSettings::default().policy, VerdictPolicy::from),
    }
}
