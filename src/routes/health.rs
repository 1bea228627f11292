/// Liveness probe. Does not look at the price store.
pub async fn get_health() -> &'static str {
    "UP"
}
