use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cutplan::types::{CalculationResult, RequiredPanel, Settings, StockPanel};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize)]
struct PackRequest {
    stock: Vec<StockPanel>,
    required: Vec<RequiredPanel>,
    #[serde(default)]
    settings: Settings,
}

async fn pack(
    Json(req): Json<PackRequest>,
) -> Result<Json<CalculationResult>, (StatusCode, String)> {
    tracing::info!(
        stock = req.stock.len(),
        required = req.required.len(),
        engine = %req.settings.engine,
        "POST /pack"
    );

    for panel in &req.stock {
        if panel.length <= 0.0 || panel.width <= 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "stock dimensions must be positive".to_string(),
            ));
        }
        if panel.quantity == 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "stock quantity must be non-zero".to_string(),
            ));
        }
    }
    for panel in &req.required {
        if panel.length <= 0.0 || panel.width <= 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "cut dimensions must be positive".to_string(),
            ));
        }
        if panel.quantity == 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "cut quantity must be non-zero".to_string(),
            ));
        }
    }

    let result = cutplan::pack(&req.stock, &req.required, &req.settings);
    Ok(Json(result))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/pack", post(pack))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
