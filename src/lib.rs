//! Hemascreen — bloodwork screening service.
//!
//! Accepts uploaded lab reports (PDF or plain text), extracts test values,
//! classifies each against clinical reference ranges, and produces a
//! plain-language summary with recommendations. Results are persisted per
//! user and served over a small HTTP API.

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
