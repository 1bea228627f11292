use crate::{models::PriceSnapshot, state::AppState};
use axum::{extract::State, http::header, response::IntoResponse};
use std::fmt::Write;

/// Renders the store in the Prometheus text format: one price gauge per asset,
/// then the Unix time of the last successful refresh (0 before the first one).
pub fn render_metrics(snapshot: &PriceSnapshot) -> String {
    let mut body = String::new();

    for (asset, point) in &snapshot.prices {
        let _ = writeln!(
            body,
            "crypto_currency_price_usd{{token=\"{}\"}} {:.6}",
            asset, point.usd
        );
    }
    let _ = writeln!(
        body,
        "crypto_currency_last_refresh_seconds {}",
        snapshot.last_refresh.timestamp()
    );

    body
}

pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshot().await;
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_metrics(&snapshot),
    )
}
