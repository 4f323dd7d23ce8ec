use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Utc;
use handlebars::Handlebars;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::DashboardConfig;
use crate::downloader::{export_csv, to_xlsx};
use crate::error::Result;
use crate::forwarder::{NewExpense, SheetWriter};
use crate::graph::{GraphOptions, trend_chart_svg};
use crate::receipts::{receipt_file_name, receipt_url, save_receipt};
use crate::sheet::SheetAggregator;
use crate::summary::{DashboardData, MonthFilter};
use crate::trend::last_months;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "SGD", "IDR"];
const STATUSES: [&str; 3] = ["Active", "Cancelled", "Trial"];
const CYCLES: [&str; 3] = ["Monthly", "Yearly", "One-time"];

/// Shared, read-only state of the dashboard service
pub struct AppState {
    config: DashboardConfig,
    sheets: SheetAggregator,
    writer: SheetWriter,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let client = reqwest::Client::new();
        let sheets = SheetAggregator::new(
            client.clone(),
            config.sheet_source(),
            config.read_timeout,
        );
        let writer = SheetWriter::new(client, config.api_url.clone(), config.write_timeout);

        let mut templates = Handlebars::new();
        templates.register_template_string("dashboard", include_str!("./static/dashboard.hbs"))?;
        templates.register_template_string("add", include_str!("./static/add.hbs"))?;

        Ok(Self {
            config,
            sheets,
            writer,
            templates,
        })
    }
}

#[derive(Deserialize)]
struct DataQuery {
    month: Option<String>,
}

/// Build the router; split out of [`run`] so tests can drive it directly
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(serve_dashboard))
        .route("/add", get(serve_add_form).post(add_expense))
        .route("/api/data", get(api_data))
        .route("/download/csv", get(download_csv))
        .route("/download/xlsx", get(download_xlsx))
        .route("/chart/trend.svg", get(trend_chart))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn run(config: DashboardConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.upload_dir)?;
    match config.sheet_source() {
        Some(source) => info!("Reading expenses from {:?}", source),
        None => info!("No sheet source configured; the dashboard will stay empty"),
    }

    let bind = config.bind.clone();
    let app = router(Arc::new(AppState::new(config)?));

    let listener = TcpListener::bind(&bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn render(state: &AppState, name: &str, context: serde_json::Value) -> Response {
    match state.templates.render(name, &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render {}: {}", name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response()
        }
    }
}

async fn serve_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let months: Vec<serde_json::Value> = std::iter::once(json!({ "value": "All", "name": "All months" }))
        .chain(
            MONTH_NAMES
                .iter()
                .enumerate()
                .map(|(idx, name)| json!({ "value": (idx + 1).to_string(), "name": name })),
        )
        .collect();

    render(
        &state,
        "dashboard",
        json!({
            "title": "Expense dashboard",
            "months": months,
            "trend_months": state.config.trend_months,
        }),
    )
}

async fn serve_add_form(State(state): State<Arc<AppState>>) -> Response {
    render(
        &state,
        "add",
        json!({
            "currencies": CURRENCIES,
            "statuses": STATUSES,
            "cycles": CYCLES,
        }),
    )
}

/// Accept the add-expense form, store an uploaded receipt and forward the row
///
/// Always redirects to the dashboard once the form is read, whether or not
/// the sheet accepted the row.
async fn add_expense(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut payload = NewExpense::default();
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (e.status(), e.body_text()).into_response(),
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match (name.as_str(), file_name) {
            ("receipt", Some(file_name)) => match field.bytes().await {
                Ok(bytes) if !file_name.is_empty() => upload = Some((file_name, bytes.to_vec())),
                Ok(_) => {}
                Err(e) => return (e.status(), e.body_text()).into_response(),
            },
            _ => match field.text().await {
                Ok(value) => payload.set_form_field(&name, value),
                Err(e) => return (e.status(), e.body_text()).into_response(),
            },
        }
    }

    if let Some((original, bytes)) = upload {
        let stored_name = receipt_file_name(Utc::now(), &original);
        match save_receipt(&state.config.upload_dir, &stored_name, &bytes) {
            Ok(path) => payload.receipt = receipt_url(&state.config.static_dir, &path),
            Err(e) => {
                error!("Failed to store receipt {}: {}", stored_name, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to store receipt: {}", e),
                )
                    .into_response();
            }
        }
    }

    state.writer.send(&payload).await;
    Redirect::to("/").into_response()
}

async fn api_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataQuery>,
) -> Json<DashboardData> {
    let table = state.sheets.load().await;
    let filter = MonthFilter::parse(params.month.as_deref());
    Json(DashboardData::build(&table, filter, state.config.trend_months))
}

async fn download_csv(State(state): State<Arc<AppState>>) -> Response {
    let table = state.sheets.load().await;
    let path = &state.config.export_path;

    let written = export_csv(&table, path).and_then(|_| Ok(std::fs::read(path)?));
    match written {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"expenses.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("CSV export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn download_xlsx(State(state): State<Arc<AppState>>) -> Response {
    let table = state.sheets.load().await;
    match to_xlsx(&table) {
        Ok(bytes) => (
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"expenses.xlsx\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("XLSX export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn trend_chart(State(state): State<Arc<AppState>>) -> Response {
    let table = state.sheets.load().await;
    let points = last_months(&table, state.config.trend_months);
    match trend_chart_svg(&points, &GraphOptions::default()) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => {
            error!("Trend chart failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
