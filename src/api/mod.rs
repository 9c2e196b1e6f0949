use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{ComparisonInput, ComparisonResult, compare, fair_market_rent, monthly_buyout};

const MAX_TERM_YEARS: u32 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    home_price: Option<f64>,
    down_payment_percent: Option<f64>,
    term_years: Option<u32>,
    interest_rate: Option<f64>,
    monthly_buyout: Option<f64>,
    annual_rental_rate: Option<f64>,
    annual_home_growth: Option<f64>,
    annual_rent_growth: Option<f64>,
    include_monthly: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FairRentQuery {
    home_value: Option<f64>,
    annual_rental_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BuyoutQuery {
    principal: Option<f64>,
    years: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "halal-compare",
    about = "Compare a conventional mortgage with a diminishing-partnership (rent + buyout) plan",
    after_help = "Run `halal-compare serve [port]` to start the HTTP API instead."
)]
struct Cli {
    #[arg(long, default_value_t = 300_000.0, help = "Purchase price of the home")]
    home_price: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Down payment in percent of the home price"
    )]
    down_payment_percent: f64,
    #[arg(long, default_value_t = 20, help = "Financing term in years")]
    term_years: u32,
    #[arg(
        long,
        default_value_t = 6.9,
        help = "Annual conventional interest rate in percent"
    )]
    interest_rate: f64,
    #[arg(
        long,
        help = "Fixed monthly buyout of the financier's share; defaults to loan / months, rounded"
    )]
    monthly_buyout: Option<f64>,
    #[arg(
        long,
        default_value_t = 8.4,
        help = "Annual rent in percent of the financier's remaining share"
    )]
    annual_rental_rate: f64,
    #[arg(
        long,
        default_value_t = 4.5,
        help = "Expected annual home price growth in percent"
    )]
    annual_home_growth: f64,
    #[arg(long, default_value_t = 4.0, help = "Annual rent growth in percent")]
    annual_rent_growth: f64,
    #[arg(long, help = "Leave the month-by-month schedule out of the output")]
    no_monthly: bool,
}

#[derive(Copy, Clone, Debug)]
struct CompareOptions {
    include_monthly: bool,
}

#[derive(Debug)]
struct ApiRequest {
    input: ComparisonInput,
    options: CompareOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    inputs: ComparisonInput,
    fair_market_rent: f64,
    include_monthly: bool,
    #[serde(flatten)]
    result: ComparisonResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FairRentResponse {
    home_value: f64,
    annual_rental_rate: f64,
    monthly_rent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuyoutResponse {
    principal: f64,
    years: u32,
    monthly_buyout: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<ComparisonInput, String> {
    if !cli.home_price.is_finite() || cli.home_price <= 0.0 {
        return Err("--home-price must be > 0".to_string());
    }

    if !(0.0..100.0).contains(&cli.down_payment_percent) {
        return Err("--down-payment-percent must be >= 0 and < 100".to_string());
    }

    if !(1..=MAX_TERM_YEARS).contains(&cli.term_years) {
        return Err(format!("--term-years must be between 1 and {MAX_TERM_YEARS}"));
    }

    for (name, rate) in [
        ("--interest-rate", cli.interest_rate),
        ("--annual-rental-rate", cli.annual_rental_rate),
        ("--annual-home-growth", cli.annual_home_growth),
        ("--annual-rent-growth", cli.annual_rent_growth),
    ] {
        if !rate.is_finite() || rate < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    let loan_amount = cli.home_price * (1.0 - cli.down_payment_percent / 100.0);
    let buyout = match cli.monthly_buyout {
        Some(v) => v,
        None => monthly_buyout(loan_amount, cli.term_years).map_err(|e| e.to_string())?,
    };
    if !buyout.is_finite() || buyout <= 0.0 {
        return Err("--monthly-buyout must be > 0".to_string());
    }

    Ok(ComparisonInput {
        home_price: cli.home_price,
        down_payment_percent: cli.down_payment_percent,
        term_years: cli.term_years,
        interest_rate: cli.interest_rate,
        monthly_buyout: buyout,
        annual_rental_rate: cli.annual_rental_rate,
        annual_home_growth: cli.annual_home_growth,
        annual_rent_growth: cli.annual_rent_growth,
    })
}

/// Parses command line flags, runs the comparison and returns the JSON report.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let options = CompareOptions {
        include_monthly: !cli.no_monthly,
    };
    let input = build_inputs(cli)?;
    let response = run_comparison(&ApiRequest { input, options })?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode report: {e}"))
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route("/api/fair-rent", get(fair_rent_handler))
        .route("/api/buyout", get(buyout_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "comparison HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let response = api_request_from_payload(payload).and_then(|request| run_comparison(&request));
    match response {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!(error = %msg, "rejected comparison request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn fair_rent_handler(Query(query): Query<FairRentQuery>) -> Response {
    match fair_rent_response(query) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn buyout_handler(Query(query): Query<BuyoutQuery>) -> Response {
    match buyout_response(query) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
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

fn fair_rent_response(query: FairRentQuery) -> Result<FairRentResponse, String> {
    let Some(home_value) = query.home_value else {
        return Err("homeValue is required".to_string());
    };
    let Some(annual_rental_rate) = query.annual_rental_rate else {
        return Err("annualRentalRate is required".to_string());
    };
    if !home_value.is_finite() || home_value < 0.0 {
        return Err("homeValue must be >= 0".to_string());
    }
    if !annual_rental_rate.is_finite() || annual_rental_rate < 0.0 {
        return Err("annualRentalRate must be >= 0".to_string());
    }

    Ok(FairRentResponse {
        home_value,
        annual_rental_rate,
        monthly_rent: fair_market_rent(home_value, annual_rental_rate),
    })
}

fn buyout_response(query: BuyoutQuery) -> Result<BuyoutResponse, String> {
    let (Some(principal), Some(years)) = (query.principal, query.years) else {
        return Err("principal and years are required".to_string());
    };
    let amount = monthly_buyout(principal, years).map_err(|e| e.to_string())?;
    Ok(BuyoutResponse {
        principal,
        years,
        monthly_buyout: amount,
    })
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComparePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.home_price {
        cli.home_price = v;
    }
    if let Some(v) = payload.down_payment_percent {
        cli.down_payment_percent = v;
    }
    if let Some(v) = payload.term_years {
        cli.term_years = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.monthly_buyout {
        cli.monthly_buyout = Some(v);
    }
    if let Some(v) = payload.annual_rental_rate {
        cli.annual_rental_rate = v;
    }
    if let Some(v) = payload.annual_home_growth {
        cli.annual_home_growth = v;
    }
    if let Some(v) = payload.annual_rent_growth {
        cli.annual_rent_growth = v;
    }

    let options = CompareOptions {
        include_monthly: payload.include_monthly.unwrap_or(true),
    };
    let input = build_inputs(cli)?;
    Ok(ApiRequest { input, options })
}

fn default_cli_for_api() -> Cli {
    Cli {
        home_price: 300_000.0,
        down_payment_percent: 20.0,
        term_years: 20,
        interest_rate: 6.9,
        monthly_buyout: None,
        annual_rental_rate: 8.4,
        annual_home_growth: 4.5,
        annual_rent_growth: 4.0,
        no_monthly: false,
    }
}

fn run_comparison(request: &ApiRequest) -> Result<CompareResponse, String> {
    let result = compare(&request.input).map_err(|e| e.to_string())?;
    Ok(build_compare_response(&request.input, result, request.options))
}

fn build_compare_response(
    input: &ComparisonInput,
    mut result: ComparisonResult,
    options: CompareOptions,
) -> CompareResponse {
    if !options.include_monthly {
        result.monthly_breakdown.clear();
    }
    CompareResponse {
        inputs: *input,
        fair_market_rent: fair_market_rent(input.home_price, input.annual_rental_rate),
        include_monthly: options.include_monthly,
        result,
    }
}
