//! YouTubeMini RPC Server: JSON-RPC over stdin/stdout for the host UI.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"history.add", "params":{"url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"history.changed", ...}

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use youtube_mini::app::{self, App};
use youtube_mini::logging::init_logging;
use youtube_mini::managers::poller::run_poll_loop;
use youtube_mini::rpc_handler::{handle_method, RpcContext};
use youtube_mini::services::host_events::HostEvents;
use youtube_mini::services::tab_observer::ReportedTabs;

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let (events, mut outbound) = HostEvents::channel();

    // Single writer so responses and events never interleave mid-line
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = outbound.recv().await {
            let mut bytes = line.to_string().into_bytes();
            bytes.push(b'\n');
            if stdout.write_all(&bytes).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let shared = app::shared(App::from_env(events.clone()));
    let tabs = Arc::new(ReportedTabs::new(Some(events.clone())));
    let ctx = RpcContext::new(shared.clone(), tabs.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(run_poll_loop(shared.clone(), tabs, shutdown_rx));

    events.emit("ready", json!({"version": env!("CARGO_PKG_VERSION")}));
    info!("rpc server ready");
    app::resume_on_launch(&shared);

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shut_down = false;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                events.send_raw(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            events.send_raw(json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));
        debug!(method, "rpc request");

        let response = match handle_method(&ctx, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        events.send_raw(response);

        if method == "app.shutdown" {
            shut_down = true;
            break;
        }
    }

    if !shut_down {
        app::lock_app(&shared).shutdown();
    }
    let _ = shutdown_tx.send(true);
    let _ = poller.await;

    // The writer exits once every sender is gone; background lookups may
    // still hold one, so bound the wait
    drop(ctx);
    drop(shared);
    drop(events);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        debug!("writer still busy at exit");
    }
}
