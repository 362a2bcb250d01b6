//! Tensaku
//!
//! Streamed review engine: a model's answer arrives as a stream of text
//! deltas containing JSON annotation records, and each record is anchored to
//! the live document it talks about as soon as it is complete.
//!
//! # Modules
//!
//! - `review`: stream assembly, extraction, resolution and the session state machine
//! - `document`: in-memory paragraph document with HTML import and export
//! - `db`: SQLite history of finished runs
//! - `routes`: HTTP API over review sessions

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod review;
pub mod routes;
pub mod state;
