//! # Background Tasks and Relays
//!
//! The side-effect half of the workflow. The reducer returns [`Command`]s;
//! [`Launcher::execute`] turns them into tokio tasks that communicate
//! exclusively by sending on the workflow channels, plus one-shot relays
//! that forward channel deliveries back into the interface queue as
//! [`Event`]s.
//!
//! Channels are capacity 1: a send parks its task until the matching relay
//! picks the value up, so background work naturally paces itself against
//! the interface. Relays are not self-resubscribing; each one forwards a
//! single value and exits, and the reducer re-arms it explicitly if it
//! expects more. The launcher tracks which relays are armed so a re-arm is
//! idempotent.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender as EventSender;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Entry, Source};
use crate::core::event::{CatalogAction, CatalogPayload, Command, Event, ProgressInfo};
use crate::download::{self, PageInfo};

type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// The three workflow channels. Senders are cloned into background tasks;
/// the receiver halves are shared so successive relays can take turns on
/// the same channel.
pub struct Pipes {
    pub catalog_tx: mpsc::Sender<CatalogPayload>,
    catalog_rx: SharedReceiver<CatalogPayload>,
    pub progress_tx: mpsc::Sender<ProgressInfo>,
    progress_rx: SharedReceiver<ProgressInfo>,
    pub pages_tx: mpsc::Sender<PageInfo>,
    pages_rx: SharedReceiver<PageInfo>,
}

impl Pipes {
    pub fn new() -> Self {
        let (catalog_tx, catalog_rx) = mpsc::channel(1);
        let (progress_tx, progress_rx) = mpsc::channel(1);
        let (pages_tx, pages_rx) = mpsc::channel(1);
        Self {
            catalog_tx,
            catalog_rx: Arc::new(Mutex::new(catalog_rx)),
            progress_tx,
            progress_rx: Arc::new(Mutex::new(progress_rx)),
            pages_tx,
            pages_rx: Arc::new(Mutex::new(pages_rx)),
        }
    }
}

impl Default for Pipes {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes reducer commands: spawns background tasks, arms relays, and
/// handles cancellation. Owned by the interface loop.
pub struct Launcher {
    events: EventSender<Event>,
    pipes: Pipes,
    sources: Vec<Arc<dyn Source>>,
    client: reqwest::Client,
    library: PathBuf,
    cancel: CancellationToken,
    catalog_armed: bool,
    progress_armed: bool,
    pages_armed: bool,
}

impl Launcher {
    pub fn new(events: EventSender<Event>, sources: Vec<Arc<dyn Source>>, library: PathBuf) -> Self {
        Self {
            events,
            pipes: Pipes::new(),
            sources,
            client: reqwest::Client::new(),
            library,
            cancel: CancellationToken::new(),
            catalog_armed: false,
            progress_armed: false,
            pages_armed: false,
        }
    }

    /// Record that a relay delivered and therefore exited. Must be called
    /// for every channel-borne event the interface loop dequeues, before
    /// the reducer runs, so re-arm commands see accurate flags.
    pub fn note_delivery(&mut self, event: &Event) {
        match event {
            Event::Catalog(_) => self.catalog_armed = false,
            Event::Progress(_) => self.progress_armed = false,
            Event::Pages(_) => self.pages_armed = false,
            _ => {}
        }
    }

    /// Execute a batch of commands. Returns true when the program should
    /// terminate.
    pub fn execute(&mut self, commands: Vec<Command>) -> bool {
        for command in commands {
            match command {
                Command::Quit => return true,
                Command::Search { query } => spawn_search(
                    query,
                    self.sources.clone(),
                    self.pipes.catalog_tx.clone(),
                    self.cancel.child_token(),
                ),
                Command::FetchChapters { entry } => {
                    match self.sources.iter().find(|s| s.name() == entry.source) {
                        Some(source) => {
                            spawn_chapters(entry, Arc::clone(source), self.pipes.catalog_tx.clone())
                        }
                        None => {
                            // Still complete the relay, or the interface
                            // would wait forever.
                            let tx = self.pipes.catalog_tx.clone();
                            let name = entry.source.clone();
                            warn!("No source named '{}' configured", name);
                            tokio::spawn(async move {
                                let _ = tx
                                    .send(CatalogPayload::Failed {
                                        action: CatalogAction::Chapters,
                                        reason: format!("unknown source '{name}'"),
                                    })
                                    .await;
                            });
                        }
                    }
                }
                Command::Download { series, chapters } => spawn_download(
                    series,
                    chapters,
                    self.sources.clone(),
                    self.client.clone(),
                    self.library.clone(),
                    self.pipes.progress_tx.clone(),
                    self.pipes.pages_tx.clone(),
                ),
                Command::AwaitCatalog => {
                    if !self.catalog_armed {
                        relay(
                            Arc::clone(&self.pipes.catalog_rx),
                            self.events.clone(),
                            Event::Catalog,
                        );
                        self.catalog_armed = true;
                    }
                }
                Command::AwaitProgress => {
                    if !self.progress_armed {
                        relay(
                            Arc::clone(&self.pipes.progress_rx),
                            self.events.clone(),
                            Event::Progress,
                        );
                        self.progress_armed = true;
                    }
                }
                Command::AwaitPages => {
                    if !self.pages_armed {
                        relay(
                            Arc::clone(&self.pipes.pages_rx),
                            self.events.clone(),
                            Event::Pages,
                        );
                        self.pages_armed = true;
                    }
                }
                Command::CancelCatalog => {
                    debug!("Cancelling in-flight catalog work");
                    self.cancel.cancel();
                    self.cancel = CancellationToken::new();
                }
            }
        }
        false
    }
}

/// One-shot relay: waits for a single value on the shared receiver, wraps
/// it as an event and hands it to the interface queue, then exits.
fn relay<T: Send + 'static>(
    rx: SharedReceiver<T>,
    events: EventSender<Event>,
    wrap: fn(T) -> Event,
) {
    tokio::spawn(async move {
        if let Some(value) = rx.lock().await.recv().await {
            if events.send(wrap(value)).is_err() {
                warn!("Relay delivery failed: interface queue closed");
            }
        }
    });
}

/// Fan the search out across every source, one concurrent branch each.
/// Branch results stay in per-branch buffers and are merged after the
/// join, in completion order.
fn spawn_search(
    query: String,
    sources: Vec<Arc<dyn Source>>,
    tx: mpsc::Sender<CatalogPayload>,
    cancel: CancellationToken,
) {
    info!(
        "Spawning search for '{}' across {} sources",
        query,
        sources.len()
    );
    tokio::spawn(async move {
        let fan_out = async {
            let mut branches: FuturesUnordered<_> = sources
                .iter()
                .map(|source| {
                    let source = Arc::clone(source);
                    let query = query.clone();
                    async move {
                        let result = source.search(&query).await;
                        (source.name().to_string(), result)
                    }
                })
                .collect();

            let mut merged: Vec<Entry> = Vec::new();
            let mut failures: Vec<String> = Vec::new();
            while let Some((name, result)) = branches.next().await {
                match result {
                    Ok(mut entries) => {
                        debug!("Source '{}' returned {} entries", name, entries.len());
                        merged.append(&mut entries);
                    }
                    Err(e) => {
                        warn!("Source '{}' failed: {}", name, e);
                        failures.push(format!("{name}: {e}"));
                    }
                }
            }
            (merged, failures)
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Search for '{}' cancelled", query);
            }
            (merged, failures) = fan_out => {
                let payload = if merged.is_empty() && !failures.is_empty() {
                    CatalogPayload::Failed {
                        action: CatalogAction::Search,
                        reason: failures.join("; "),
                    }
                } else {
                    info!("Search for '{}' produced {} entries", query, merged.len());
                    CatalogPayload::SearchResults(merged)
                };
                if tx.send(payload).await.is_err() {
                    warn!("Search result send failed: channel closed");
                }
            }
        }
    });
}

/// Fetch the chapter list of one chosen series from its own source.
fn spawn_chapters(entry: Entry, source: Arc<dyn Source>, tx: mpsc::Sender<CatalogPayload>) {
    info!("Spawning chapter fetch for '{}'", entry.title);
    tokio::spawn(async move {
        let payload = match source.chapters(&entry).await {
            Ok(chapters) => {
                info!("'{}' has {} chapters", entry.title, chapters.len());
                CatalogPayload::Chapters(chapters)
            }
            Err(e) => {
                warn!("Chapter fetch for '{}' failed: {}", entry.title, e);
                CatalogPayload::Failed {
                    action: CatalogAction::Chapters,
                    reason: e.to_string(),
                }
            }
        };
        if tx.send(payload).await.is_err() {
            warn!("Chapter list send failed: channel closed");
        }
    });
}

/// Run the download batch over the selected chapters, in display order.
fn spawn_download(
    series: String,
    chapters: Vec<Entry>,
    sources: Vec<Arc<dyn Source>>,
    client: reqwest::Client,
    library: PathBuf,
    progress_tx: mpsc::Sender<ProgressInfo>,
    pages_tx: mpsc::Sender<PageInfo>,
) {
    info!(
        "Spawning download batch: {} chapters of '{}'",
        chapters.len(),
        series
    );
    tokio::spawn(async move {
        let total = chapters.len();
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut fraction = 0.0;
        let mut label = String::new();

        for chapter in chapters {
            label = chapter.title.clone();
            // The fraction counts chapters already finished while the label
            // names the one about to start; the displayed pair lags the
            // work by one position on purpose.
            if progress_tx
                .send(ProgressInfo {
                    fraction,
                    label: label.clone(),
                })
                .await
                .is_err()
            {
                warn!("Progress send failed: channel closed");
                return;
            }

            match sources.iter().find(|s| s.name() == chapter.source) {
                Some(source) => {
                    if let Err(e) = download::fetch_chapter(
                        &client,
                        source.as_ref(),
                        &library,
                        &series,
                        &chapter,
                        &pages_tx,
                    )
                    .await
                    {
                        failed += 1;
                        warn!("Download of '{}' failed: {}", chapter.title, e);
                    }
                }
                None => {
                    failed += 1;
                    warn!("No source named '{}' for '{}'", chapter.source, chapter.title);
                }
            }

            // Failures still count towards completion so the batch always
            // terminates; they are logged, not retried.
            completed += 1;
            fraction = completed as f64 / total as f64;
        }

        if failed > 0 {
            warn!("{} of {} chapters failed to download", failed, total);
        }
        let _ = progress_tx
            .send(ProgressInfo { fraction, label })
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::catalog::{PageRef, SourceError};
    use crate::test_support::{FailingSource, StaticSource, chapter, series};

    const WAIT: Duration = Duration::from_secs(5);
    const SHORT: Duration = Duration::from_millis(300);

    /// A source that never answers within any test's patience.
    struct StalledSource;

    #[async_trait]
    impl Source for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn search(&self, _query: &str) -> Result<Vec<Entry>, SourceError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(Vec::new())
        }

        async fn chapters(&self, _series: &Entry) -> Result<Vec<Entry>, SourceError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(Vec::new())
        }

        async fn pages(&self, _chapter: &Entry) -> Result<Vec<PageRef>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn launcher_with(sources: Vec<Arc<dyn Source>>) -> (Launcher, std::sync::mpsc::Receiver<Event>) {
        let (tx, rx) = channel();
        let launcher = Launcher::new(tx, sources, std::env::temp_dir());
        (launcher, rx)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fan_out_merges_healthy_sources_and_drops_failing_one() {
        let healthy_a: Arc<dyn Source> = Arc::new(StaticSource::new(
            "alpha",
            vec![series("A1"), series("A2"), series("A3")],
        ));
        let healthy_b: Arc<dyn Source> =
            Arc::new(StaticSource::new("beta", vec![series("B1"), series("B2")]));
        let failing: Arc<dyn Source> = Arc::new(FailingSource::new("gamma"));

        let (mut launcher, rx) = launcher_with(vec![healthy_a, healthy_b, failing]);
        let quit = launcher.execute(vec![
            Command::Search {
                query: "naruto".into(),
            },
            Command::AwaitCatalog,
        ]);
        assert!(!quit);

        let event = rx.recv_timeout(WAIT).expect("search result arrives");
        match event {
            Event::Catalog(CatalogPayload::SearchResults(entries)) => {
                assert_eq!(entries.len(), 5);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_all_sources_failing_reports_a_search_failure() {
        let failing: Arc<dyn Source> = Arc::new(FailingSource::new("gamma"));
        let (mut launcher, rx) = launcher_with(vec![failing]);

        launcher.execute(vec![
            Command::Search { query: "x".into() },
            Command::AwaitCatalog,
        ]);

        let event = rx.recv_timeout(WAIT).expect("failure arrives");
        match event {
            Event::Catalog(CatalogPayload::Failed {
                action: CatalogAction::Search,
                reason,
            }) => {
                assert!(reason.contains("gamma"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_sources_still_completes_with_empty_results() {
        let (mut launcher, rx) = launcher_with(Vec::new());
        launcher.execute(vec![
            Command::Search { query: "x".into() },
            Command::AwaitCatalog,
        ]);

        let event = rx.recv_timeout(WAIT).expect("empty result arrives");
        assert_eq!(
            event,
            Event::Catalog(CatalogPayload::SearchResults(Vec::new()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_chapter_fetch_resolves_the_entrys_source() {
        let mut source = StaticSource::new("alpha", Vec::new());
        source.chapter_list = vec![chapter("Ch 1"), chapter("Ch 2")];
        let (mut launcher, rx) = launcher_with(vec![Arc::new(source)]);

        let mut entry = series("Berserk");
        entry.source = "alpha".into();

        launcher.execute(vec![
            Command::FetchChapters { entry },
            Command::AwaitCatalog,
        ]);

        let event = rx.recv_timeout(WAIT).expect("chapters arrive");
        match event {
            Event::Catalog(CatalogPayload::Chapters(chapters)) => {
                assert_eq!(chapters.len(), 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unknown_source_fails_the_chapter_fetch() {
        let (mut launcher, rx) = launcher_with(Vec::new());
        launcher.execute(vec![
            Command::FetchChapters {
                entry: series("Lost"),
            },
            Command::AwaitCatalog,
        ]);

        let event = rx.recv_timeout(WAIT).expect("failure arrives");
        match event {
            Event::Catalog(CatalogPayload::Failed {
                action: CatalogAction::Chapters,
                ..
            }) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_relay_forwards_exactly_one_value_until_rearmed() {
        let (mut launcher, rx) = launcher_with(Vec::new());
        let tx = launcher.pipes.catalog_tx.clone();

        // Nothing armed yet: the payload parks in the channel.
        tx.send(CatalogPayload::SearchResults(Vec::new()))
            .await
            .unwrap();
        assert!(rx.recv_timeout(SHORT).is_err());

        launcher.execute(vec![Command::AwaitCatalog]);
        let event = rx.recv_timeout(WAIT).expect("relay forwards");
        launcher.note_delivery(&event);

        // The relay exited after one delivery; a second payload waits for
        // the next arm.
        tx.send(CatalogPayload::Chapters(Vec::new())).await.unwrap();
        assert!(rx.recv_timeout(SHORT).is_err());

        launcher.execute(vec![Command::AwaitCatalog]);
        assert!(rx.recv_timeout(WAIT).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_silences_an_inflight_search() {
        let stalled: Arc<dyn Source> = Arc::new(StalledSource);
        let (mut launcher, rx) = launcher_with(vec![stalled]);

        launcher.execute(vec![
            Command::Search { query: "x".into() },
            Command::AwaitCatalog,
        ]);
        launcher.execute(vec![Command::CancelCatalog]);

        assert!(rx.recv_timeout(SHORT).is_err(), "cancelled search must not deliver");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_download_batch_label_lags_and_fraction_completes() {
        let sources: Vec<Arc<dyn Source>> =
            vec![Arc::new(StaticSource::new("alpha", Vec::new()))];

        let library = tempfile::tempdir().unwrap();
        let (progress_tx, mut progress_rx) = mpsc::channel(8);
        let (pages_tx, mut pages_rx) = mpsc::channel(8);

        let mut first = chapter("Ch A");
        first.source = "alpha".into();
        let mut second = chapter("Ch B");
        second.source = "alpha".into();

        spawn_download(
            "Series".into(),
            vec![first, second],
            sources,
            reqwest::Client::new(),
            library.path().to_path_buf(),
            progress_tx,
            pages_tx,
        );

        // Drain page updates so capacity-1 pacing cannot stall the test.
        tokio::spawn(async move { while pages_rx.recv().await.is_some() {} });

        let mut updates = Vec::new();
        while let Some(info) = progress_rx.recv().await {
            updates.push(info);
        }

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].fraction, 0.0);
        assert_eq!(updates[0].label, "Ch A");
        assert_eq!(updates[1].fraction, 0.5);
        assert_eq!(updates[1].label, "Ch B");
        assert_eq!(updates[2].fraction, 1.0);
        assert_eq!(updates[2].label, "Ch B");
    }
}
