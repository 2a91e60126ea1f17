//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::catalog::ReferenceCatalog;
use crate::pipeline::ScreeningProcessor;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the screening router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// The catalog and processor are read-only and lock-free; the database
/// connection and the rate limiter are the only mutable shared state and
/// sit behind mutexes.
#[derive(Clone)]
pub struct ApiContext {
    pub catalog: Arc<ReferenceCatalog>,
    pub processor: Arc<ScreeningProcessor>,
    pub db: Arc<Mutex<Connection>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(conn: Connection, catalog: ReferenceCatalog) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            processor: Arc::new(ScreeningProcessor::new(catalog.clone())),
            catalog,
            db: Arc::new(Mutex::new(conn)),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — per-user sliding window
// ═══════════════════════════════════════════════════════════

/// Per-user rate limiter with per-minute and per-hour limits.
///
/// Shared across requests behind a mutex; the window map is never
/// touched without holding the lock.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            per_minute: 30,
            per_hour: 300,
        }
    }

    /// Check if a user is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, user_key: &str) -> Result<(), u64> {
        let now = Instant::now();

        // Prune stale entries across all keys and drop emptied keys, so
        // the map does not grow with every distinct caller id seen.
        self.windows.retain(|_, timestamps| {
            timestamps.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));
            !timestamps.is_empty()
        });

        let entries = self.windows.entry(user_key.to_string()).or_default();

        // Check per-minute
        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        // Check per-hour
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
