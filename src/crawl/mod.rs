// src/crawl/mod.rs
// =============================================================================
// This module handles walking a website.
//
// Features:
// - Depth-first walking starting from a seed URL
// - Scheme and host-suffix filtering (see policy.rs)
// - Every page fetched at most once per walk
// - Random pauses between pages
// - Cooperative stop via a cancellation token
//
// Submodules:
// - policy: which URLs may be walked into
// - visited: the set of pages fetched so far
// - engine: the walk itself
// - controller: start/stop and the run lifecycle
// =============================================================================

mod controller;
mod engine;
mod policy;
mod visited;

pub use controller::{CrawlController, CrawlState};
pub use engine::{CrawlOutcome, Crawler, Progress};
