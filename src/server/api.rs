//! REST API implementation using rouille.
//!
//! # Purpose
//!
//! Core implementation of the HTTP API server. Every GET endpoint builds a
//! snapshot job, hands it to the client thread through
//! [`ClientHandle::invoke`], blocks until the outcome comes back, and maps
//! that outcome onto an HTTP response. Handlers never read client state
//! directly.
//!
//! # Key types
//!
//! - [`ApiServer`] - binds the listener, runs it on a background thread,
//!   stops it with a bounded grace period
//! - [`StatEntry`], [`GameSnapshot`], [`PlayerSnapshot`], [`InvSlotEntry`] -
//!   JSON-serializable state copies built on the client thread
//!
//! # Request lifecycle
//!
//! received (logged) -> job dispatched -> caller blocked on the reply ->
//! completed (200 / 204) or failed (500). One job per request, no retries:
//! a timeout or failure surfaces to this caller only.
//!
//! # Thread safety
//!
//! Handlers run on rouille's worker pool and own nothing but a
//! [`ClientHandle`] clone (a queue sender). A blocked handler parks its
//! own worker thread only; the accept loop and other requests keep going.
//!
//! # Used by
//!
//! - `server/mod.rs` - re-exports public types
//! - `main.rs` - calls `ApiServer::start()` after the runtime is built

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::core::client::{pose_name, Client};
use crate::core::invoke::{ClientHandle, InvokeError};
use crate::entities::item::inv_slot_pos;
use crate::entities::{Item, Skill};

/// How long `stop()` waits for the listener thread before detaching it.
const STOP_GRACE: Duration = Duration::from_millis(500);

/// One skill row in the `/stats` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub name: String,
    pub level: i32,
    pub boosted_level: i32,
    pub xp: i32,
}

/// Canvas offset reported by `/game`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub x: i32,
    pub y: i32,
}

/// Character summary reported by `/player`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub used_slots: usize,
    pub animation: i32,
    pub pose: String,
    pub energy: i32,
}

/// One backpack slot in the `/inv` response, with its canvas position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InvSlotEntry {
    pub id: i32,
    pub quantity: i32,
    pub x: i32,
    pub y: i32,
}

// Snapshot builders: these run on the client thread inside a scheduled
// job and return owned data only.

fn stats_snapshot(client: &Client) -> Vec<StatEntry> {
    Skill::BASE
        .iter()
        .map(|skill| {
            let stat = client.stat(*skill);
            StatEntry {
                name: skill.name().to_string(),
                level: stat.level,
                boosted_level: stat.boosted(),
                xp: stat.xp,
            }
        })
        .collect()
}

fn game_snapshot(client: &Client) -> GameSnapshot {
    let (x, y) = client.canvas_offset();
    GameSnapshot { x, y }
}

fn player_snapshot(client: &Client) -> PlayerSnapshot {
    PlayerSnapshot {
        used_slots: client.used_inventory_slots(),
        animation: client.action_animation(),
        pose: pose_name(client.pose_animation()).to_string(),
        energy: client.energy(),
    }
}

fn inventory_snapshot(client: &Client) -> Vec<InvSlotEntry> {
    client
        .inventory()
        .items()
        .iter()
        .enumerate()
        .map(|(slot, item)| {
            let (x, y) = inv_slot_pos(slot);
            InvSlotEntry { id: item.id, quantity: item.quantity, x, y }
        })
        .collect()
}

fn equipment_snapshot(client: &Client) -> Option<Vec<Item>> {
    client.equipment().map(|worn| worn.items().to_vec())
}

/// Generic API response envelope (health checks and errors).
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

/// REST API server bound to a local address.
pub struct ApiServer {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    listener: Option<thread::JoinHandle<()>>,
}

impl ApiServer {
    /// Binds `addr` and starts serving on a background thread.
    ///
    /// Binding happens on the caller's thread so a busy port fails the
    /// startup instead of a detached thread.
    pub fn start(addr: &str, handle: ClientHandle) -> Result<ApiServer> {
        let server = rouille::Server::new(addr, move |request| {
            Self::handle_request(request, &handle)
        })
        .map_err(|e| anyhow::anyhow!("Failed to bind API server on {}: {}", addr, e))?;

        let bound = server.server_addr();
        info!("API server listening on http://{}", bound);

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let listener = thread::Builder::new()
            .name("scry-api".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    server.poll();
                    thread::sleep(Duration::from_millis(1));
                }
                debug!("API listener thread exiting");
            })
            .context("Failed to spawn API listener thread")?;

        Ok(ApiServer { addr: bound, stop, listener: Some(listener) })
    }

    /// Address the server actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting requests and joins the listener thread, waiting at
    /// most [`STOP_GRACE`]. Requests still blocked in the bridge past the
    /// grace period are abandoned to process teardown.
    pub fn stop(&mut self) {
        let Some(handle) = self.listener.take() else {
            return;
        };
        info!("Stopping API server on {}", self.addr);
        self.stop.store(true, Ordering::Relaxed);

        let deadline = Instant::now() + STOP_GRACE;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        if handle.is_finished() {
            let _ = handle.join();
            debug!("API listener stopped cleanly");
        } else {
            warn!("API listener did not stop within {:?}, detaching", STOP_GRACE);
        }
    }

    fn handle_request(request: &Request, handle: &ClientHandle) -> Response {
        // Handle preflight
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        debug!("{} {}", request.method(), request.url());

        let response = rouille::router!(request,
            (GET) ["/stats"] => {
                Self::respond("GET /stats", handle.invoke("stats", |c| Ok(stats_snapshot(c))))
            },
            (GET) ["/game"] => {
                Self::respond("GET /game", handle.invoke("game", |c| Ok(game_snapshot(c))))
            },
            (GET) ["/player"] => {
                Self::respond("GET /player", handle.invoke("player", |c| Ok(player_snapshot(c))))
            },
            (GET) ["/inv"] => {
                Self::respond("GET /inv", handle.invoke("inv", |c| Ok(inventory_snapshot(c))))
            },
            (GET) ["/equip"] => {
                Self::respond_opt("GET /equip", handle.invoke("equip", |c| Ok(equipment_snapshot(c))))
            },

            // Health check
            (GET) ["/health"] => {
                Response::json(&ApiResponse::ok_msg("scry API server"))
            },

            // Fallback
            _ => {
                Response::json(&ApiResponse::err("Not found")).with_status_code(404)
            }
        );

        // Add CORS headers to response
        response.with_additional_header("Access-Control-Allow-Origin", "*")
    }

    /// Maps an outcome onto 200 or 500.
    fn respond<T: Serialize>(label: &'static str, outcome: Result<T, InvokeError>) -> Response {
        match outcome {
            Ok(value) => Self::json_response(&value),
            Err(err) => Self::failure(label, &err),
        }
    }

    /// Maps an optional outcome onto 200, 204 (no value) or 500.
    fn respond_opt<T: Serialize>(
        label: &'static str,
        outcome: Result<Option<T>, InvokeError>,
    ) -> Response {
        match outcome {
            Ok(Some(value)) => Self::json_response(&value),
            Ok(None) => Response::empty_204(),
            Err(err) => Self::failure(label, &err),
        }
    }

    /// Serializes explicitly so an encoding failure becomes a 500 instead
    /// of a worker panic.
    fn json_response<T: Serialize>(value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => Response::from_data("application/json", body),
            Err(e) => {
                warn!("Failed to encode response body: {}", e);
                Response::json(&ApiResponse::err("Failed to encode response")).with_status_code(500)
            }
        }
    }

    fn failure(label: &'static str, err: &InvokeError) -> Response {
        warn!("{} failed: {}", label, err);
        Response::json(&ApiResponse::err(&err.to_string())).with_status_code(500)
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runtime::ClientRuntime;
    use serde_json::Value;
    use std::io::Read;

    // Long tick interval keeps snapshots deterministic during tests.
    const QUIET_TICK: Duration = Duration::from_secs(60);

    fn spawn_client() -> (ClientHandle, thread::JoinHandle<()>) {
        let (runtime, handle) = ClientRuntime::new(Client::new(), QUIET_TICK);
        let join = thread::spawn(move || runtime.run());
        (handle, join)
    }

    fn get(handle: &ClientHandle, path: &str) -> Response {
        let request = Request::fake_http("GET", path, vec![], vec![]);
        ApiServer::handle_request(&request, handle)
    }

    fn body_string(response: Response) -> String {
        let (mut reader, _) = response.data.into_reader_and_size();
        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        body
    }

    fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_string(response)).unwrap()
    }

    #[test]
    fn test_stats_returns_23_entries_with_wire_field_names() {
        let (handle, join) = spawn_client();
        let response = get(&handle, "/stats");
        assert_eq!(response.status_code, 200);

        let body = body_json(response);
        let entries = body.as_array().expect("array body");
        assert_eq!(entries.len(), 23);
        for entry in entries {
            assert!(entry["name"].is_string());
            assert!(entry["level"].is_i64());
            assert!(entry["boostedLevel"].is_i64());
            assert!(entry["xp"].is_i64());
        }
        // No boosts at seed time, so boosted always equals level.
        assert_eq!(entries[0]["name"], "Might");
        assert_eq!(entries[0]["level"], entries[0]["boostedLevel"]);

        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_game_reports_the_canvas_offset() {
        let (handle, join) = spawn_client();
        let response = get(&handle, "/game");
        assert_eq!(response.status_code, 200);
        assert_eq!(body_json(response), serde_json::json!({ "x": 8, "y": 28 }));
        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_player_summary_shape() {
        let (handle, join) = spawn_client();
        let response = get(&handle, "/player");
        assert_eq!(response.status_code, 200);

        let body = body_json(response);
        assert_eq!(body["usedSlots"], 6);
        assert_eq!(body["animation"], -1);
        assert_eq!(body["pose"], "idle");
        assert_eq!(body["energy"], 100);

        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_inventory_has_all_28_slots_with_positions() {
        let (handle, join) = spawn_client();
        let response = get(&handle, "/inv");
        assert_eq!(response.status_code, 200);

        let body = body_json(response);
        let slots = body.as_array().expect("array body");
        assert_eq!(slots.len(), 28);
        // Seeded hatchet sits in slot 0 at the grid origin.
        assert_eq!(slots[0]["id"], 121);
        assert_eq!(slots[0]["quantity"], 1);
        assert_eq!(slots[0]["x"], 563);
        assert_eq!(slots[0]["y"], 213);
        // Trailing slots are empty but still reported.
        assert_eq!(slots[27]["id"], -1);
        assert_eq!(slots[27]["quantity"], 0);

        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_equipment_absent_maps_to_204_with_empty_body() {
        let (handle, join) = spawn_client();
        let response = get(&handle, "/equip");
        assert_eq!(response.status_code, 204);
        assert_eq!(body_string(response).len(), 0);
        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_equipment_present_returns_every_slot() {
        let (handle, join) = spawn_client();
        handle
            .invoke("load equipment", |c| {
                c.load_equipment();
                Ok(())
            })
            .unwrap();

        let response = get(&handle, "/equip");
        assert_eq!(response.status_code, 200);
        let body = body_json(response);
        let slots = body.as_array().expect("array body");
        assert_eq!(slots.len(), 11);
        assert_eq!(slots[3], serde_json::json!({ "id": 121, "quantity": 1 }));
        assert_eq!(slots[2]["id"], -1);

        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_unknown_route_is_a_404_envelope() {
        let (handle, join) = spawn_client();
        let response = get(&handle, "/nope");
        assert_eq!(response.status_code, 404);
        let body = body_json(response);
        assert_eq!(body["success"], Value::Bool(false));
        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_health_answers_without_touching_the_client() {
        // No runtime at all: /health must not depend on the client loop.
        let (runtime, handle) = ClientRuntime::new(Client::new(), QUIET_TICK);
        drop(runtime);
        let response = get(&handle, "/health");
        assert_eq!(response.status_code, 200);
        assert_eq!(body_json(response)["success"], Value::Bool(true));
    }

    #[test]
    fn test_preflight_and_cors_headers() {
        let (handle, join) = spawn_client();

        let preflight = ApiServer::handle_request(
            &Request::fake_http("OPTIONS", "/stats", vec![], vec![]),
            &handle,
        );
        assert_eq!(preflight.status_code, 204);
        assert!(preflight
            .headers
            .iter()
            .any(|(k, v)| k == "Access-Control-Allow-Origin" && v == "*"));

        let response = get(&handle, "/game");
        assert!(response
            .headers
            .iter()
            .any(|(k, v)| k == "Access-Control-Allow-Origin" && v == "*"));

        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_failed_job_maps_to_500_alongside_a_healthy_route() {
        let (handle, join) = spawn_client();

        let broken = {
            let handle = handle.clone();
            thread::spawn(move || {
                let outcome = handle.invoke("divides", |c| {
                    let denominator = std::hint::black_box(0_i32);
                    Ok(c.energy() / denominator)
                });
                ApiServer::respond("GET /broken", outcome)
            })
        };

        let healthy = get(&handle, "/stats");
        assert_eq!(healthy.status_code, 200);

        let broken = broken.join().unwrap();
        assert_eq!(broken.status_code, 500);
        let body = body_json(broken);
        assert_eq!(body["success"], Value::Bool(false));
        assert!(body["error"].as_str().unwrap().contains("panicked"));

        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn test_50_concurrent_stats_against_a_throttled_client() {
        let (mut runtime, handle) = ClientRuntime::new(Client::new(), QUIET_TICK);

        // The client executes one job every 5ms, so 50 callers serialize
        // behind each other without any of them timing out.
        let owner = thread::spawn(move || {
            for _ in 0..50 {
                if !runtime.run_next(Duration::from_secs(5)) {
                    break;
                }
                thread::sleep(Duration::from_millis(5));
            }
        });

        let started = Instant::now();
        let mut callers = Vec::new();
        for _ in 0..50 {
            let handle = handle.clone();
            callers.push(thread::spawn(move || {
                let response = get(&handle, "/stats");
                assert_eq!(response.status_code, 200);
                let body = body_json(response);
                assert_eq!(body.as_array().unwrap().len(), 23);
            }));
        }
        for caller in callers {
            caller.join().unwrap();
        }
        let elapsed = started.elapsed();

        // Serialized execution is visible in the wall time, and nothing
        // deadlocked or timed out on the way.
        assert!(elapsed >= Duration::from_millis(200), "finished too fast: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(10), "took too long: {elapsed:?}");

        drop(handle);
        owner.join().unwrap();
    }

    #[test]
    fn test_start_rejects_an_occupied_port() {
        let (handle, join) = spawn_client();
        let first = ApiServer::start("127.0.0.1:0", handle.clone()).unwrap();
        assert_ne!(first.addr().port(), 0);

        let second = ApiServer::start(&first.addr().to_string(), handle.clone());
        assert!(second.is_err());

        drop(first); // exercises the bounded-grace stop path
        drop(handle);
        join.join().unwrap();
    }
}
