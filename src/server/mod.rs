//! REST API server exposing live client state.
//!
//! # Purpose
//!
//! Lets external tools (overlays, dashboards, scripts) read the simulated
//! character's state over plain HTTP while the simulation keeps running on
//! its own thread. The API is read-only: every endpoint is a snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐    job queue (FIFO)      ┌─────────────────────┐
//! │  API worker threads      │ ── ScheduledJob ───────▶ │   Client thread     │
//! │  (rouille pool)          │                          │   (tick loop)       │
//! │                          │                          │                     │
//! │  GET /stats              │ ──▶ stats_snapshot ───▶  │  job(&mut Client)   │
//! │  GET /equip              │ ──▶ equipment_snapshot ▶ │  reply.send(...)    │
//! └──────────────────────────┘                          └─────────────────────┘
//!          ▲                      bounded(1) reply                │
//!          └────────────── owned snapshot or failure ─────────────┘
//! ```
//!
//! - **rouille** - sync HTTP server (simpler than async axum/tokio)
//! - **crossbeam-channel** - job queue plus one reply channel per request
//! - no shared memory: workers hold a queue sender, nothing else
//!
//! # Endpoints
//!
//! | Method | Path      | Description                               |
//! |--------|-----------|-------------------------------------------|
//! | GET    | `/stats`  | 23 trainable skills (name/level/boost/xp) |
//! | GET    | `/game`   | Canvas offset of the game view            |
//! | GET    | `/player` | Used slots, animations, pose, energy      |
//! | GET    | `/inv`    | All 28 backpack slots with positions      |
//! | GET    | `/equip`  | Worn equipment, `204` until loaded        |
//! | GET    | `/health` | Liveness check (no client round trip)     |
//!
//! Failures inside a snapshot job surface as `500` with a JSON error
//! envelope; an absent container surfaces as `204` with an empty body.

mod api;

pub use api::{ApiServer, GameSnapshot, InvSlotEntry, PlayerSnapshot, StatEntry};
