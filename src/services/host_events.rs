//! Outbound events for the host process driving the presentation layer.
//!
//! Events are JSON objects of the form `{"event": "<name>", ...payload}`
//! queued on an unbounded channel; the RPC server drains the channel and
//! writes one line per event.

use serde_json::{json, Map, Value};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::managers::history_manager::HistoryObserver;
use crate::types::history::HistorySnapshot;

/// Cloneable handle for emitting host events.
#[derive(Clone)]
pub struct HostEvents {
    tx: UnboundedSender<Value>,
}

impl HostEvents {
    pub fn channel() -> (Self, UnboundedReceiver<Value>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues `{"event": name, ..payload}`. `payload` must be a JSON object
    /// (or null for no extra fields).
    pub fn emit(&self, name: &str, payload: Value) {
        let mut event = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        event.insert("event".to_string(), Value::String(name.to_string()));
        if self.tx.send(Value::Object(event)).is_err() {
            debug!(event = name, "host event dropped, receiver closed");
        }
    }

    /// Queues a raw line, used for RPC responses so they share ordering with
    /// events.
    pub fn send_raw(&self, line: Value) {
        let _ = self.tx.send(line);
    }
}

impl HistoryObserver for HostEvents {
    fn history_changed(&self, snapshot: &HistorySnapshot) {
        self.emit("history.changed", json!(snapshot));
    }
}
