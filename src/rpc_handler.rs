//! RPC method handler for the YouTubeMini JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches one request to the app core. Playback and title
//! lookups are spawned onto the current tokio runtime; the response only
//! reports what was started.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::app::{self, lock_app, SharedApp};
use crate::managers::history_manager::HistoryManagerTrait;
use crate::platform;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::tab_observer::ReportedTabs;
use crate::types::settings::keys;
use crate::types::tab::BrowserTab;

/// Everything a request can touch.
#[derive(Clone)]
pub struct RpcContext {
    pub app: SharedApp,
    pub tabs: Arc<ReportedTabs>,
}

impl RpcContext {
    pub fn new(app: SharedApp, tabs: Arc<ReportedTabs>) -> Self {
        Self { app, tabs }
    }
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn index_param(params: &Value) -> Result<usize, String> {
    params
        .get("index")
        .and_then(|v| v.as_u64())
        .map(|i| i as usize)
        .ok_or_else(|| "missing index".to_string())
}

/// Relative playlist paths live in the platform data dir.
fn playlist_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        platform::get_data_dir().join(path)
    }
}

fn tab_from(value: &Value) -> Option<BrowserTab> {
    let url = value.get("url")?.as_str()?;
    let title = value.get("title").and_then(|v| v.as_str()).unwrap_or("");
    Some(BrowserTab::new(url, title))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(ctx: &RpcContext, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── History ───
        "history.list" => {
            let snapshot = lock_app(&ctx.app).history.snapshot();
            serde_json::to_value(snapshot).map_err(|e| e.to_string())
        }
        "history.add" => {
            let url = str_param(params, "url")?;
            let index = app::add_url(&ctx.app, url).map_err(|e| e.to_string())?;
            Ok(json!({"index": index}))
        }
        "history.remove" => {
            let index = index_param(params)?;
            lock_app(&ctx.app)
                .history
                .remove(index)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.select" => {
            let index = index_param(params)?;
            lock_app(&ctx.app)
                .history
                .select(index)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.play" => {
            let index = index_param(params)?;
            let url = {
                let mut a = lock_app(&ctx.app);
                a.history.select(index).map_err(|e| e.to_string())?;
                a.history.items()[index].url.clone()
            };
            app::start_playback(&ctx.app, &url);
            Ok(json!({"url": url}))
        }
        "history.next" => {
            let next = lock_app(&ctx.app).history.advance_to_next();
            match next {
                Some(record) => {
                    app::start_playback(&ctx.app, &record.url);
                    Ok(json!({"url": record.url}))
                }
                None => Ok(json!({"url": null})),
            }
        }

        // ─── Playlists ───
        "playlist.save" => {
            let path = str_param(params, "path")?;
            let count = lock_app(&ctx.app)
                .save_playlist(&playlist_path(path))
                .map_err(|e| e.to_string())?;
            Ok(json!({"count": count}))
        }
        "playlist.load" => {
            let path = str_param(params, "path")?;
            let count = lock_app(&ctx.app)
                .load_playlist(&playlist_path(path))
                .map_err(|e| e.to_string())?;
            Ok(json!({"count": count}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = lock_app(&ctx.app);
            match params.get("key").and_then(|v| v.as_str()) {
                Some(key) => Ok(a.settings.get_value(key).unwrap_or(Value::Null)),
                None => serde_json::to_value(a.settings.app_settings()).map_err(|e| e.to_string()),
            }
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            if key == keys::HISTORY || key == keys::CURRENT_INDEX {
                return Err(format!("{} is managed through history.* methods", key));
            }
            lock_app(&ctx.app)
                .settings
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Browser ───
        "tabs.report" => {
            if params.get("browserRunning").and_then(|v| v.as_bool()) == Some(false) {
                ctx.tabs.report_browser_closed();
                return Ok(json!({"ok": true}));
            }
            let tabs: Vec<BrowserTab> = params
                .get("tabs")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(tab_from).collect())
                .unwrap_or_default();
            let active = params.get("active").and_then(tab_from);
            let paused: Vec<String> = params
                .get("paused")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            let count = tabs.len();
            ctx.tabs.report(tabs, active, paused);
            Ok(json!({"tabs": count}))
        }

        // ─── Player ───
        "player.ended" => {
            let next = app::on_end_of_media(&ctx.app).map(|r| r.url);
            Ok(json!({"next": next}))
        }
        "player.stop" => {
            app::stop_playback(&ctx.app);
            Ok(json!({"ok": true}))
        }

        // ─── Lifecycle ───
        "app.shutdown" => {
            lock_app(&ctx.app).shutdown();
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
