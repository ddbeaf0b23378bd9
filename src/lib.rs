//! # Court Captain
//!
//! Match scoring and points engine for a club padel/tennis team competing in
//! an inter-club league and in tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, games, pairs, results, availability)
//! - **scoring**: Set validation, match resolution, team points and pair balancing
//! - **recording**: Captain workflow for pairing and recording results
//! - **storage**: JSONL record store
//! - **config**: Configuration loading and validation

pub mod config;
pub mod models;
pub mod recording;
pub mod scoring;
pub mod storage;

pub use models::*;
