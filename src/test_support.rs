//! Throwaway HTTP servers for exercising the client and the router.

use axum::{extract::RawQuery, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

type Response = (StatusCode, &'static str);

/// Stand-in for the CoinGecko `simple/price` endpoint.
pub struct MockUpstream {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
    response: Arc<Mutex<Response>>,
    delay: Arc<Mutex<Duration>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v3/simple/price", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }

    /// Swap what later requests get back.
    pub fn respond_with(&self, status: StatusCode, body: &'static str) {
        *self.response.lock().unwrap() = (status, body);
    }

    /// Hold every later response for `delay` before answering.
    pub fn delay_responses(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// A URL nothing is listening on.
    pub async fn closed_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api/v3/simple/price", addr)
    }
}

/// Serve `body` with `status` for every request to the price path, until
/// changed with [`MockUpstream::respond_with`].
pub async fn mock_upstream(status: StatusCode, body: &'static str) -> MockUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_query = Arc::new(Mutex::new(None));
    let response = Arc::new(Mutex::new((status, body)));
    let delay = Arc::new(Mutex::new(Duration::ZERO));

    let handler_hits = hits.clone();
    let handler_query = last_query.clone();
    let handler_response = response.clone();
    let handler_delay = delay.clone();
    let app = Router::new().route(
        "/api/v3/simple/price",
        get(move |RawQuery(query): RawQuery| {
            let hits = handler_hits.clone();
            let last_query = handler_query.clone();
            let response = handler_response.clone();
            let delay = handler_delay.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                *last_query.lock().unwrap() = query;

                let wait = *delay.lock().unwrap();
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }

                let (status, body) = *response.lock().unwrap();
                (
                    status,
                    [(axum::http::header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }
        }),
    );

    let addr = serve(app).await;
    MockUpstream {
        addr,
        hits,
        last_query,
        response,
        delay,
    }
}

/// Bind `app` to an ephemeral local port and serve it in the background.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
