//! # Terminal Breach Client Library
//!
//! This library implements the game client: a top-down chase/collect game
//! rendered with macroquad, talking to the score/admin service over HTTP
//! with a hard timeout and a local-mock fallback so it stays playable with
//! no service at all.
//!
//! ## Architecture Overview
//!
//! The frame loop never blocks. All service traffic flows through a
//! background worker thread; the session sends requests and polls replies
//! once per frame, so a stalled service costs at most a missing leaderboard,
//! never a dropped frame.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Pure game state and the per-frame step: player movement and boost,
//! food and enemy passes, particle aging, stage and win/loss outcomes.
//! No drawing.
//!
//! ### Session Module (`session`)
//! Phase orchestration: the boot/login screen and its admin/cheat command
//! flow, the play loop, the abort prompt, the terminal screens, and the
//! rules for when a score actually gets submitted.
//!
//! ### Input Module (`input`)
//! Pointer target sampling, boost hold, and edge-detected Escape.
//!
//! ### Net Module (`net`)
//! The background worker, the 1-second timeout wrapper, and the offline
//! mock table. Every reply is explicitly a live response or a fallback.
//!
//! ### Render Module (`render`)
//! Matrix rain, entities, HUD, boot screen and the win/crash overlays.

pub mod game;
pub mod input;
pub mod net;
pub mod render;
pub mod session;
