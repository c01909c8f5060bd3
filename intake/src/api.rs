use crate::config::Listener;
use crate::errors::IntakeError;
use crate::handler::PaymentIntake;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use crate::payment::{PaymentInput, PaymentRecord, Receipt};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub const SUBMIT_PAYMENT_PATH: &str = "/submit-payment/";

/// Public router. CORS accepts any origin, method and header, credentials included.
pub fn router(intake: Arc<PaymentIntake>) -> Router {
    Router::new()
        .route(SUBMIT_PAYMENT_PATH, post(submit_payment))
        .layer(CorsLayer::very_permissive())
        .with_state(intake)
}

pub async fn serve(listener: &Listener, intake: Arc<PaymentIntake>) -> std::io::Result<()> {
    let addr = format!("{}:{}", listener.host, listener.port);
    let tcp = TcpListener::bind(&addr).await?;
    tracing::info!(host = %listener.host, port = listener.port, "Listening");

    axum::serve(tcp, router(intake)).await
}

impl IntoResponse for Receipt {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Counts one submission in `requests.inflight` until dropped, including when
/// the client goes away mid-request.
struct InflightGuard;

impl InflightGuard {
    fn new() -> Self {
        shared::gauge!(REQUESTS_INFLIGHT).increment(1.0);
        InflightGuard
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        shared::gauge!(REQUESTS_INFLIGHT).decrement(1.0);
    }
}

async fn submit_payment(State(intake): State<Arc<PaymentIntake>>, body: Bytes) -> Response {
    let start = Instant::now();
    let inflight = InflightGuard::new();

    let response = match handle(&intake, &body).await {
        Ok(receipt) => receipt.into_response(),
        Err(err) => err.into_response(),
    };

    drop(inflight);
    shared::histogram!(REQUEST_DURATION, "status" => response.status().as_str().to_owned())
        .record(start.elapsed().as_secs_f64());

    response
}

async fn handle(intake: &PaymentIntake, body: &[u8]) -> Result<Receipt, IntakeError> {
    let input: PaymentInput =
        serde_json::from_slice(body).map_err(|e| IntakeError::InvalidBody(e.to_string()))?;
    let record = PaymentRecord::try_from(input)?;

    intake.submit(&record).await
}
