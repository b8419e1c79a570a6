// src/crawl/engine.rs
// =============================================================================
// The crawl engine: walks a site depth-first from a seed URL.
//
// How it works:
// 1. Start with the seed URL on a stack (the "frontier")
// 2. Pop a URL, fetch it, scan it for keywords, record what we found
// 3. Push the page's absolute links (first link on top, so it goes next)
// 4. When all of a page's links are done, pause for a random delay
// 5. Repeat until the stack is empty or someone asks us to stop
//
// Why a stack and not recursion?
// - Sites can be very deep; recursive async calls would grow without bound
// - The stack gives the exact same visiting order as the recursive version
//
// Stopping:
// - Cancellation is cooperative. We look at the token before every page and
//   while pausing. A fetch that already started is allowed to finish.
// =============================================================================

use crate::config::WalkerConfig;
use crate::crawl::policy::UrlPolicy;
use crate::crawl::visited::VisitedSet;
use crate::extract::{extract_hrefs, find_keywords, resolve_href, KeywordSet};
use crate::fetch::{FetchError, PageFetcher};
use crate::ledger::{ResultLedger, ResultRecord};
use futures::FutureExt;
use log::{debug, info, warn};
use rand::Rng;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Everything a finished (or stopped) walk produced
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Matches and errors in discovery order
    pub records: Vec<ResultRecord>,
    /// Pages fetched successfully
    pub visited: VisitedSet,
    /// True if the walk ended because of a stop request
    pub cancelled: bool,
}

impl CrawlOutcome {
    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }
}

/// Snapshot published after every page, for whoever is showing progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub current_url: Option<String>,
    pub visited: usize,
    pub records: usize,
}

/// Random pause between pages, drawn uniformly from [min, max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No pause at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn next_delay(&self) -> Duration {
        // gen_range panics on an empty range
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }
}

// Why a single page could not be processed
#[derive(Debug, Error)]
enum VisitError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("internal error: {0}")]
    Panic(String),
}

// One entry of the work stack
#[derive(Debug)]
enum Frame {
    Visit(String),
    // Placed under a page's children; runs once all of them are done
    Pause,
}

// Mutable state of one walk. Only the engine's loop touches it.
#[derive(Default)]
struct RunState {
    ledger: ResultLedger,
    visited: VisitedSet,
    // Every URL we tried, including failures, so nothing is fetched twice
    attempted: HashSet<String>,
}

pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    policy: UrlPolicy,
    pacing: Pacing,
    follow_relative: bool,
    progress: Option<watch::Sender<Progress>>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, policy: UrlPolicy) -> Self {
        Self {
            fetcher,
            policy,
            pacing: Pacing::none(),
            follow_relative: false,
            progress: None,
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &WalkerConfig) -> Self {
        Self::new(fetcher, UrlPolicy::from_config(config))
            .with_pacing(Pacing::new(config.min_delay(), config.max_delay()))
            .with_follow_relative(config.follow_relative)
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_follow_relative(mut self, follow_relative: bool) -> Self {
        self.follow_relative = follow_relative;
        self
    }

    pub fn with_progress(mut self, progress: watch::Sender<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Walks the site starting at `seed`.
    ///
    /// Never fails: every problem is turned into an error record for the
    /// URL it happened on.
    pub async fn crawl(&self, seed: &str, keywords: &KeywordSet, cancel: &CancellationToken) -> CrawlOutcome {
        let mut run = RunState::default();

        if cancel.is_cancelled() {
            return run.finish(true);
        }
        if !self.policy.is_crawlable(seed) {
            debug!("Seed URL is not crawlable, nothing to do: {}", seed);
            return run.finish(false);
        }

        let mut stack = vec![Frame::Visit(seed.to_string())];
        let mut cancelled = false;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Pause => {
                    if !self.pause(cancel).await {
                        cancelled = true;
                        break;
                    }
                }
                Frame::Visit(url) => {
                    // A fetcher can answer without ever suspending (cached or
                    // in-memory pages), so give the runtime a turn per page
                    tokio::task::yield_now().await;
                    if cancel.is_cancelled() {
                        cancelled = true;
                        break;
                    }
                    if !run.is_new(&url) {
                        continue;
                    }
                    if !self.policy.is_crawlable(&url) {
                        debug!("Skipping uncrawlable URL: {}", url);
                        continue;
                    }
                    run.attempted.insert(url.clone());

                    let result = AssertUnwindSafe(self.visit(&url, keywords, &mut run))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| Err(VisitError::Panic(panic_message(payload))));

                    match result {
                        Ok(Some(children)) => {
                            stack.push(Frame::Pause);
                            // Reversed so the first link on the page is popped first
                            stack.extend(children.into_iter().rev().map(Frame::Visit));
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Error on {}: {}", url, e);
                            run.ledger.push_error(e.to_string(), &url);
                        }
                    }
                }
            }
        }

        if cancelled {
            info!("Stop requested, walk ended with {} page(s) left on the stack", stack.len());
        }
        run.finish(cancelled)
    }

    // Fetches and scans one page.
    //
    // Returns:
    //   Ok(Some(links)) = page processed, these links are worth following
    //   Ok(None) = server answered with something other than 200
    //   Err = the page could not be fetched
    async fn visit(&self, url: &str, keywords: &KeywordSet, run: &mut RunState) -> Result<Option<Vec<String>>, VisitError> {
        let page = self.fetcher.fetch(url).await?;

        if !page.is_ok() {
            debug!("HTTP {} for {}, not scanning it", page.status, url);
            return Ok(None);
        }

        run.ledger.push_matches(find_keywords(&page.body, keywords), url);
        run.visited.mark_visited(url);
        info!("Walking: {}", url);
        self.publish(url, run);

        let links = extract_hrefs(&page.body)
            .into_iter()
            .filter_map(|href| {
                if self.follow_relative {
                    resolve_href(url, &href)
                } else {
                    Some(href)
                }
            })
            .filter(|href| href.starts_with("http") && run.is_new(href))
            .collect();

        Ok(Some(links))
    }

    // Sleeps for the pacing delay. Returns false if a stop came in meanwhile.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        let delay = self.pacing.next_delay();
        if delay.is_zero() {
            return !cancel.is_cancelled();
        }

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    fn publish(&self, url: &str, run: &RunState) {
        if let Some(progress) = &self.progress {
            progress.send_replace(Progress {
                current_url: Some(url.to_string()),
                visited: run.visited.len(),
                records: run.ledger.all().len(),
            });
        }
    }
}

impl RunState {
    // Not fetched yet, neither successfully nor with an error
    fn is_new(&self, url: &str) -> bool {
        !self.visited.contains(url) && !self.attempted.contains(url)
    }

    fn finish(self, cancelled: bool) -> CrawlOutcome {
        CrawlOutcome {
            records: self.ledger.into_records(),
            visited: self.visited,
            cancelled,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<dyn PageFetcher>?
//    - dyn PageFetcher is "some type that implements PageFetcher"
//    - Arc lets the controller and the spawned walk task share one fetcher
//    - Tests swap in a fake without the engine noticing
//
// 2. What is catch_unwind?
//    - A panic normally unwinds until it kills the task
//    - FutureExt::catch_unwind (from the futures crate) stops it at the
//      boundary of one page, so we can record it and carry on
//    - AssertUnwindSafe is us promising the half-updated state is fine to use
//
// 3. What does tokio::select! do?
//    - Waits on several futures and runs the branch of whichever finishes first
//    - In pause() that is either "the delay elapsed" or "stop was requested"
//
// 4. Why is next_delay() not async?
//    - rand's thread_rng() must not be held across an .await in a spawned task
//    - Computing the delay in a plain function keeps the RNG off the await
// -----------------------------------------------------------------------------
