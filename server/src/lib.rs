//! # Score/Admin Service Library
//!
//! This library implements the backend for Terminal Breach: a small REST
//! service persisting players, scores and a system log in SQLite, plus the
//! admin command channel the game's boot screen talks to.
//!
//! ## Core Responsibilities
//!
//! ### Score Persistence
//! Players register a handle and submit session scores. Nothing is
//! validated beyond JSON shape: duplicate names, empty names, negative
//! scores and scores for students that do not exist are all accepted.
//! The service is a thin CRUD wrapper by design.
//!
//! ### The System Log
//! Every interesting mutation appends a timestamped entry to the log
//! table (INFO for registrations, ALERT for large scores and admin
//! destruction, SUCCESS for cheats). The five most recent entries are
//! served back to the client's boot screen.
//!
//! ### Admin Commands
//! A single `/command` endpoint dispatches on the command string:
//! `PURGE <name>` deletes a student and their scores, `RESET_SYSTEM_DATA`
//! wipes all three tables, `SUDO_ROOT` and `COLOR_HACK` hand out cosmetic
//! effect tags. No authentication gates any of this; the service is a toy
//! and the openness is part of the game.
//!
//! ## Module Organization
//!
//! ### Store Module (`store`)
//! The SQLite layer: schema creation, row-level operations, and the
//! transactional purge/reset cascades.
//!
//! ### Routes Module (`routes`)
//! The axum router and the five request handlers.
//!
//! ### Command Module (`command`)
//! Admin command parsing and dispatch.
//!
//! ### Error Module (`error`)
//! The handler error type; every store failure renders as a 500 with the
//! message in the JSON body.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::{routes::build_router, store::Store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Store::memory()?;
//!     store.init_schema()?;
//!
//!     let app = build_router(store);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod routes;
pub mod store;
