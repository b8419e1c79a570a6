// src/crawl/controller.rs
// =============================================================================
// Start/stop control for walks.
//
// The controller is what the outside world (our CLI) talks to:
// - start(seed, keywords) spawns a walk on the tokio runtime
// - stop() asks the running walk to wind down
// - finish() waits for the walk and hands back its results
//
// Only one walk can run at a time. The lifecycle is:
//
//   Idle --start--> Running --stop--> Cancelling
//     ^                |                  |
//     +----finish------+------finish------+
// =============================================================================

use super::engine::{CrawlOutcome, Crawler, Progress};
use crate::extract::KeywordSet;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Running,
    Cancelling,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("please enter a starting URL")]
    MissingSeed,
    #[error("a walk is already running; stop it or wait for it to finish first")]
    AlreadyRunning,
}

// A walk in flight
struct ActiveRun {
    handle: JoinHandle<CrawlOutcome>,
    cancel: CancellationToken,
}

pub struct CrawlController {
    crawler: Arc<Crawler>,
    progress: watch::Receiver<Progress>,
    progress_tx: watch::Sender<Progress>,
    active: Option<ActiveRun>,
}

impl CrawlController {
    pub fn new(crawler: Crawler) -> Self {
        let (progress_tx, progress) = watch::channel(Progress::default());
        let crawler = crawler.with_progress(progress_tx.clone());
        Self {
            crawler: Arc::new(crawler),
            progress,
            progress_tx,
            active: None,
        }
    }

    pub fn state(&self) -> CrawlState {
        match &self.active {
            None => CrawlState::Idle,
            Some(run) if run.handle.is_finished() => CrawlState::Idle,
            Some(run) if run.cancel.is_cancelled() => CrawlState::Cancelling,
            Some(_) => CrawlState::Running,
        }
    }

    /// Receiver for progress snapshots of the current walk
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Starts a new walk. Must be called from inside a tokio runtime.
    pub fn start(&mut self, seed: &str, keywords: KeywordSet) -> Result<(), ControlError> {
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(ControlError::MissingSeed);
        }
        if self.state() != CrawlState::Idle {
            return Err(ControlError::AlreadyRunning);
        }
        if self.active.take().is_some() {
            warn!("Discarding results of a finished walk that was never collected");
        }

        // Fresh progress for the new walk
        self.progress_tx.send_replace(Progress::default());

        info!("Starting walk at {} (keywords: {})", seed, keywords);
        let cancel = CancellationToken::new();
        let crawler = Arc::clone(&self.crawler);
        let seed = seed.to_string();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { crawler.crawl(&seed, &keywords, &token).await });

        self.active = Some(ActiveRun { handle, cancel });
        Ok(())
    }

    /// Requests a stop. Returns false if nothing was running.
    pub fn stop(&self) -> bool {
        match &self.active {
            Some(run) if !run.handle.is_finished() => {
                if !run.cancel.is_cancelled() {
                    info!("Stopping walk...");
                    run.cancel.cancel();
                }
                true
            }
            _ => false,
        }
    }

    /// Waits for the current walk to end and returns its results.
    /// The controller is Idle afterwards.
    pub async fn finish(&mut self) -> Option<CrawlOutcome> {
        let run = self.active.take()?;
        match run.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                // The engine contains its own panics, so this means the task was aborted
                warn!("Walk task ended abnormally: {}", e);
                None
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a CancellationToken?
//    - A cheap, cloneable flag from tokio-util
//    - cancel() flips it, is_cancelled() reads it, cancelled().await waits for it
//    - Each walk gets its own token, so old stop requests can't leak into new walks
//
// 2. What is a JoinHandle?
//    - tokio::spawn returns one; awaiting it gives the task's return value
//    - That's how the walk's records travel back without any shared Mutex
//
// 3. What is a watch channel?
//    - A channel that only keeps the latest value
//    - Perfect for "what is the walker doing right now?"
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::engine::Pacing;
    use crate::crawl::policy::UrlPolicy;
    use crate::fetch::{FetchError, Page, PageFetcher};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};

    type Request = (String, oneshot::Sender<Page>);

    // Hands every fetch to the test and waits for the test to answer it,
    // so the test always knows where the walk is
    struct ScriptedWeb {
        requests: mpsc::UnboundedSender<Request>,
    }

    #[async_trait]
    impl PageFetcher for ScriptedWeb {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            let (reply, answer) = oneshot::channel();
            self.requests
                .send((url.to_string(), reply))
                .map_err(|_| FetchError::Request("test is gone".into()))?;
            answer.await.map_err(|_| FetchError::Request("no answer".into()))
        }
    }

    // Every page links to a new page, so the walk never ends by itself
    struct EndlessWeb;

    #[async_trait]
    impl PageFetcher for EndlessWeb {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            Ok(chain_page(url))
        }
    }

    fn chain_page(url: &str) -> Page {
        Page::ok(format!("admin <a href=\"{}x\">next</a>", url))
    }

    fn crawler(fetcher: impl PageFetcher + 'static, pause: Duration) -> Crawler {
        let policy = UrlPolicy::new(["https"], "");
        Crawler::new(Arc::new(fetcher), policy).with_pacing(Pacing::new(pause, pause))
    }

    fn controller(pause: Duration) -> (CrawlController, mpsc::UnboundedReceiver<Request>) {
        let (requests, incoming) = mpsc::unbounded_channel();
        (CrawlController::new(crawler(ScriptedWeb { requests }, pause)), incoming)
    }

    // Waits for the next fetch and answers it with a chain page
    async fn answer(incoming: &mut mpsc::UnboundedReceiver<Request>) -> String {
        let (url, reply) = incoming.recv().await.unwrap();
        let _ = reply.send(chain_page(&url));
        url
    }

    #[tokio::test]
    async fn test_start_requires_seed() {
        let (mut ctl, _incoming) = controller(Duration::ZERO);
        assert_eq!(ctl.start("  ", KeywordSet::parse("admin")), Err(ControlError::MissingSeed));
        assert_eq!(ctl.state(), CrawlState::Idle);
    }

    #[tokio::test]
    async fn test_start_stop_finish_cycle() {
        let (mut ctl, mut incoming) = controller(Duration::ZERO);
        assert_eq!(ctl.state(), CrawlState::Idle);

        ctl.start("https://a.com/", KeywordSet::parse("admin")).unwrap();
        assert_eq!(ctl.state(), CrawlState::Running);

        // Starting again while running is refused
        assert_eq!(
            ctl.start("https://b.com/", KeywordSet::parse("admin")),
            Err(ControlError::AlreadyRunning)
        );

        assert_eq!(answer(&mut incoming).await, "https://a.com/");
        assert_eq!(answer(&mut incoming).await, "https://a.com/x");

        // Stop while the third page is being fetched
        let (url, reply) = incoming.recv().await.unwrap();
        assert_eq!(url, "https://a.com/xx");
        assert!(ctl.stop());
        assert_eq!(ctl.state(), CrawlState::Cancelling);
        assert!(ctl.stop());

        // The in-flight page still counts, nothing after it is fetched
        let _ = reply.send(chain_page(&url));
        let outcome = ctl.finish().await.expect("walk should hand back results");
        assert!(outcome.cancelled);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.visited.len(), 3);
        assert!(outcome.visited.contains("https://a.com/xx"));
        assert!(incoming.try_recv().is_err());

        assert_eq!(ctl.state(), CrawlState::Idle);
        assert!(!ctl.stop());
    }

    #[tokio::test]
    async fn test_restart_after_finish_gets_fresh_results() {
        let (mut ctl, mut incoming) = controller(Duration::ZERO);

        ctl.start("https://a.com/", KeywordSet::parse("admin")).unwrap();
        answer(&mut incoming).await;
        let (url, reply) = incoming.recv().await.unwrap();
        ctl.stop();
        let _ = reply.send(chain_page(&url));
        let first = ctl.finish().await.unwrap();

        ctl.start("https://b.com/", KeywordSet::parse("admin")).unwrap();
        assert_eq!(answer(&mut incoming).await, "https://b.com/");
        let (url, reply) = incoming.recv().await.unwrap();
        ctl.stop();
        let _ = reply.send(chain_page(&url));
        let second = ctl.finish().await.unwrap();

        assert_eq!(first.records.len(), 2);
        assert_eq!(second.records.len(), 2);
        assert!(first.records.iter().all(|r| r.url.starts_with("https://a.com/")));
        assert!(second.records.iter().all(|r| r.url.starts_with("https://b.com/")));
        assert!(second.visited.into_sorted_vec().iter().all(|u| !first.visited.contains(u)));
    }

    #[tokio::test]
    async fn test_progress_reports_current_site() {
        let (mut ctl, mut incoming) = controller(Duration::ZERO);
        let mut progress = ctl.progress();

        ctl.start("https://a.com/", KeywordSet::parse("admin")).unwrap();
        answer(&mut incoming).await;

        let snapshot = progress
            .wait_for(|p| p.current_url.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.current_url.as_deref(), Some("https://a.com/"));
        assert_eq!(snapshot.visited, 1);
        assert_eq!(snapshot.records, 1);

        let (url, reply) = incoming.recv().await.unwrap();
        ctl.stop();
        let _ = reply.send(chain_page(&url));
        ctl.finish().await;
    }

    #[tokio::test]
    async fn test_stop_cuts_pacing_delay_short() {
        let (mut ctl, mut incoming) = controller(Duration::from_secs(3600));

        ctl.start("https://a.com/", KeywordSet::parse("admin")).unwrap();
        let (_, reply) = incoming.recv().await.unwrap();
        // No links, so the walk goes straight to the page's pause
        let _ = reply.send(Page::ok("admin"));

        let mut progress = ctl.progress();
        progress.wait_for(|p| p.visited == 1).await.unwrap();
        assert!(ctl.stop());

        let outcome = ctl.finish().await.unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.records.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_reaches_walk_with_instant_fetcher() {
        // Default current-thread runtime: the walk and this test share one thread
        let mut ctl = CrawlController::new(crawler(EndlessWeb, Duration::ZERO));
        let mut progress = ctl.progress();

        ctl.start("https://a.com/", KeywordSet::parse("admin")).unwrap();
        progress.wait_for(|p| p.visited >= 5).await.unwrap();
        assert!(ctl.stop());

        let outcome = ctl.finish().await.unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.visited.len() >= 5);
        assert_eq!(outcome.records.len(), outcome.visited.len());
    }

    #[tokio::test]
    async fn test_finish_when_idle() {
        let (mut ctl, _incoming) = controller(Duration::ZERO);
        assert!(ctl.finish().await.is_none());
    }
}
