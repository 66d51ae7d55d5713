//! Scan orchestration: serialized detection fetches with stale-result discarding
//!
//! Fetches run on background threads and report back over a channel. The
//! owner calls `poll` once per frame; that is the only place results are
//! committed to the `DetectionState`. Inbound pushes travel the same channel,
//! so both producers reach the store through one `apply`, in arrival order.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::detection::DetectionState;
use crate::error::FetchError;
use crate::models::DetectionResultSet;

/// Progress shown while a scan is running never exceeds this
pub const MAX_RUNNING_PROGRESS: f32 = 0.95;

/// Finished sessions kept for the status line
const SESSION_HISTORY_LEN: usize = 16;

/// Where detection results come from (the companion process)
pub trait DetectionSource: Send + Sync + 'static {
    fn fetch(&self) -> Result<DetectionResultSet, FetchError>;
}

impl<F> DetectionSource for F
where
    F: Fn() -> Result<DetectionResultSet, FetchError> + Send + Sync + 'static,
{
    fn fetch(&self) -> Result<DetectionResultSet, FetchError> {
        self()
    }
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Wait before the single retry of an empty or failed fetch
    pub retry_backoff: Duration,
    /// Time constant of the synthetic progress curve
    pub progress_time_constant: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_millis(800),
            progress_time_constant: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Running,
    Completed,
    Superseded,
}

/// One invocation of a scan
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub sequence: u64,
    pub status: ScanStatus,
    pub started_at: Instant,
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of games in the applied result (completed sessions only)
    pub games_found: Option<usize>,
}

impl ScanSession {
    fn start(sequence: u64) -> Self {
        Self {
            sequence,
            status: ScanStatus::Running,
            started_at: Instant::now(),
            finished_at: None,
            games_found: None,
        }
    }

    fn finish(&mut self, status: ScanStatus, games_found: Option<usize>) {
        self.status = status;
        self.finished_at = Some(Utc::now());
        self.games_found = games_found;
    }
}

/// Lifecycle signals for renderers
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Started { sequence: u64 },
    /// Fraction in 0.0..=1.0
    Progress(f32),
    Finished { sequence: u64, result_is_empty: bool },
    PushApplied { result_is_empty: bool },
}

enum Inbound {
    Push(DetectionResultSet),
    Completed { sequence: u64, result: DetectionResultSet },
}

/// Handle for delivering detection results pushed by another process
#[derive(Clone)]
pub struct PushSender {
    tx: Sender<Inbound>,
}

impl PushSender {
    /// Queue a pushed result; returns false once the orchestrator is gone
    pub fn push(&self, set: DetectionResultSet) -> bool {
        self.tx.send(Inbound::Push(set)).is_ok()
    }
}

pub struct ScanOrchestrator {
    source: Arc<dyn DetectionSource>,
    settings: ScanSettings,
    state: DetectionState,
    latest_sequence: u64,
    running: Option<ScanSession>,
    // Sessions replaced by `restart_scan` whose workers have not reported yet
    outstanding: Vec<ScanSession>,
    rescan_requested: bool,
    history: VecDeque<ScanSession>,
    fetch_attempts: Arc<AtomicU64>,
    events: Vec<ScanEvent>,
    inbound_tx: Sender<Inbound>,
    inbound_rx: Receiver<Inbound>,
}

impl ScanOrchestrator {
    pub fn new(source: Arc<dyn DetectionSource>, settings: ScanSettings) -> Self {
        let (inbound_tx, inbound_rx) = channel();
        Self {
            source,
            settings,
            state: DetectionState::new(),
            latest_sequence: 0,
            running: None,
            outstanding: Vec::new(),
            rescan_requested: false,
            history: VecDeque::new(),
            fetch_attempts: Arc::new(AtomicU64::new(0)),
            events: Vec::new(),
            inbound_tx,
            inbound_rx,
        }
    }

    /// Start a scan, or queue one rerun if a scan is already running
    pub fn request_scan(&mut self) {
        if self.running.is_some() {
            if !self.rescan_requested {
                tracing::info!("Scan already running, queued one rescan");
            }
            self.rescan_requested = true;
            return;
        }
        self.start_scan();
    }

    /// Start a fresh scan now; a running scan's result will be discarded
    pub fn restart_scan(&mut self) {
        if let Some(session) = self.running.take() {
            tracing::info!("Superseding scan #{}", session.sequence);
            self.outstanding.push(session);
        }
        self.rescan_requested = false;
        self.start_scan();
    }

    fn start_scan(&mut self) {
        self.latest_sequence += 1;
        let sequence = self.latest_sequence;
        tracing::info!("Starting detection scan #{}", sequence);

        self.running = Some(ScanSession::start(sequence));
        self.events.push(ScanEvent::Started { sequence });

        let source = Arc::clone(&self.source);
        let attempts = Arc::clone(&self.fetch_attempts);
        let backoff = self.settings.retry_backoff;
        let tx = self.inbound_tx.clone();

        thread::spawn(move || {
            let result = fetch_with_retry(source.as_ref(), backoff, sequence, &attempts);
            let _ = tx.send(Inbound::Completed { sequence, result });
        });
    }

    /// Swap the detection source; used by the next scan started
    pub fn set_source(&mut self, source: Arc<dyn DetectionSource>) {
        self.source = source;
    }

    /// Inbound push channel
    pub fn pusher(&self) -> PushSender {
        PushSender {
            tx: self.inbound_tx.clone(),
        }
    }

    /// Commit everything that arrived since the last call and report what
    /// happened. Call once per frame.
    pub fn poll(&mut self, now: Instant) -> Vec<ScanEvent> {
        while let Ok(msg) = self.inbound_rx.try_recv() {
            match msg {
                Inbound::Push(set) => self.apply_push(set),
                Inbound::Completed { sequence, result } => self.complete(sequence, result),
            }
        }

        if self.running.is_some() {
            self.events.push(ScanEvent::Progress(self.progress(now)));
        }

        std::mem::take(&mut self.events)
    }

    fn apply_push(&mut self, set: DetectionResultSet) {
        let result_is_empty = set.is_empty();
        tracing::info!("Applying pushed detection result ({} games)", set.len());
        self.state.apply(set);
        self.events.push(ScanEvent::PushApplied { result_is_empty });
    }

    fn complete(&mut self, sequence: u64, result: DetectionResultSet) {
        if sequence != self.latest_sequence {
            tracing::debug!(
                "Discarding stale result of scan #{} (latest is #{})",
                sequence,
                self.latest_sequence
            );
            if let Some(pos) = self.outstanding.iter().position(|s| s.sequence == sequence) {
                let mut session = self.outstanding.remove(pos);
                session.finish(ScanStatus::Superseded, None);
                self.record(session);
            }
            return;
        }

        let Some(mut session) = self.running.take() else {
            return;
        };

        let games_found = result.len();
        let result_is_empty = result.is_empty();
        self.state.apply(result);
        session.finish(ScanStatus::Completed, Some(games_found));
        tracing::info!("Scan #{} finished with {} games", sequence, games_found);
        self.record(session);

        self.events.push(ScanEvent::Progress(1.0));
        self.events.push(ScanEvent::Finished {
            sequence,
            result_is_empty,
        });

        if std::mem::take(&mut self.rescan_requested) {
            tracing::info!("Running queued rescan");
            self.start_scan();
        }
    }

    fn record(&mut self, session: ScanSession) {
        if self.history.len() == SESSION_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(session);
    }

    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    pub fn status(&self) -> ScanStatus {
        if self.running.is_some() {
            ScanStatus::Running
        } else {
            ScanStatus::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn rescan_pending(&self) -> bool {
        self.rescan_requested
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    /// Synthetic progress of the running scan; 1.0 after a completed scan
    pub fn progress(&self, now: Instant) -> f32 {
        match &self.running {
            Some(session) => estimate_progress(
                now.saturating_duration_since(session.started_at),
                self.settings.progress_time_constant,
            ),
            None => match self.last_completed() {
                Some(_) => 1.0,
                None => 0.0,
            },
        }
    }

    /// Most recent sessions, oldest first
    pub fn recent_sessions(&self) -> impl Iterator<Item = &ScanSession> {
        self.history.iter()
    }

    pub fn last_completed(&self) -> Option<&ScanSession> {
        self.history
            .iter()
            .rev()
            .find(|s| s.status == ScanStatus::Completed)
    }

    /// Total calls made to the detection source, retries included
    pub fn fetch_attempts(&self) -> u64 {
        self.fetch_attempts.load(Ordering::Relaxed)
    }
}

/// Fraction that rises toward `MAX_RUNNING_PROGRESS` and never reaches it
pub fn estimate_progress(elapsed: Duration, time_constant: Duration) -> f32 {
    let tau = time_constant.as_secs_f32().max(f32::EPSILON);
    let x = elapsed.as_secs_f32() / tau;
    (MAX_RUNNING_PROGRESS * (1.0 - (-x).exp())).clamp(0.0, MAX_RUNNING_PROGRESS)
}

fn fetch_with_retry(
    source: &dyn DetectionSource,
    backoff: Duration,
    sequence: u64,
    attempts: &AtomicU64,
) -> DetectionResultSet {
    if let Some(set) = attempt(source, sequence, attempts) {
        if !set.is_empty() {
            return set;
        }
    }
    tracing::debug!("Scan #{} found no games, retrying in {:?}", sequence, backoff);
    thread::sleep(backoff);
    attempt(source, sequence, attempts).unwrap_or_default()
}

fn attempt(source: &dyn DetectionSource, sequence: u64, attempts: &AtomicU64) -> Option<DetectionResultSet> {
    attempts.fetch_add(1, Ordering::Relaxed);
    let outcome = catch_unwind(AssertUnwindSafe(|| source.fetch()))
        .unwrap_or_else(|_| Err(FetchError::Unavailable("detection source panicked".to_string())));
    match outcome {
        Ok(set) => Some(set),
        Err(e) => {
            tracing::warn!("Detection fetch failed (scan #{}): {}", sequence, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    type Reply = Result<DetectionResultSet, FetchError>;

    enum Scripted {
        Now(Reply),
        Gated(Receiver<Reply>),
    }

    /// Replays scripted replies in call order; an exhausted script returns
    /// an empty set
    struct ScriptedSource {
        replies: Mutex<VecDeque<Scripted>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DetectionSource for ScriptedSource {
        fn fetch(&self) -> Reply {
            let next = {
                let mut replies = self.replies.lock().unwrap();
                self.calls.fetch_add(1, Ordering::SeqCst);
                replies.pop_front()
            };
            match next {
                Some(Scripted::Now(reply)) => reply,
                Some(Scripted::Gated(rx)) => rx.recv().unwrap_or_else(|_| Ok(DetectionResultSet::new())),
                None => Ok(DetectionResultSet::new()),
            }
        }
    }

    fn gate() -> (Sender<Reply>, Scripted) {
        let (tx, rx) = channel();
        (tx, Scripted::Gated(rx))
    }

    fn games(value: serde_json::Value) -> DetectionResultSet {
        DetectionResultSet::from_map_value(&value).unwrap()
    }

    fn fast_settings() -> ScanSettings {
        ScanSettings {
            retry_backoff: Duration::from_millis(10),
            progress_time_constant: Duration::from_millis(100),
        }
    }

    /// Poll until `done` holds, collecting events
    fn poll_until(
        orch: &mut ScanOrchestrator,
        mut done: impl FnMut(&ScanOrchestrator) -> bool,
    ) -> Vec<ScanEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        loop {
            events.extend(orch.poll(Instant::now()));
            if done(&*orch) {
                return events;
            }
            assert!(Instant::now() < deadline, "timed out waiting for orchestrator");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn wait_for_calls(source: &ScriptedSource, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while source.calls() < n {
            assert!(Instant::now() < deadline, "timed out waiting for {} fetch calls", n);
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn effective_names(orch: &ScanOrchestrator) -> Vec<String> {
        orch.state().as_records().into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_scan_applies_result() {
        let source = ScriptedSource::new(vec![Scripted::Now(Ok(games(json!({ "100": "Foo" }))))]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        assert_eq!(orch.status(), ScanStatus::Running);
        let events = poll_until(&mut orch, |o| !o.is_running());

        assert_eq!(events.first(), Some(&ScanEvent::Started { sequence: 1 }));
        assert!(events.contains(&ScanEvent::Progress(1.0)));
        assert_eq!(events.last(), Some(&ScanEvent::Finished { sequence: 1, result_is_empty: false }));
        assert_eq!(effective_names(&orch), vec!["Foo"]);
        assert_eq!(orch.fetch_attempts(), 1);
        assert_eq!(orch.last_completed().and_then(|s| s.games_found), Some(1));
        assert_eq!(orch.progress(Instant::now()), 1.0);
    }

    #[test]
    fn test_empty_result_is_retried_once() {
        let source = ScriptedSource::new(vec![
            Scripted::Now(Ok(DetectionResultSet::new())),
            Scripted::Now(Ok(games(json!({ "1": "Late" })))),
        ]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        poll_until(&mut orch, |o| !o.is_running());

        assert_eq!(source.calls(), 2);
        assert_eq!(effective_names(&orch), vec!["Late"]);
    }

    #[test]
    fn test_failures_become_empty_and_keep_previous_games() {
        let source = ScriptedSource::new(vec![
            Scripted::Now(Err(FetchError::Unavailable("connection refused".into()))),
            Scripted::Now(Err(FetchError::Malformed("not json".into()))),
        ]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());
        orch.pusher().push(games(json!({ "1": "A", "2": "B", "3": "C" })));
        orch.poll(Instant::now());

        orch.request_scan();
        let events = poll_until(&mut orch, |o| !o.is_running());

        assert_eq!(source.calls(), 2);
        assert!(events.contains(&ScanEvent::Finished { sequence: 1, result_is_empty: true }));
        assert_eq!(orch.state().effective().len(), 3);
        assert!(orch.state().current().is_empty());
    }

    #[test]
    fn test_panicking_source_counts_as_failure() {
        let source = || -> Result<DetectionResultSet, FetchError> { panic!("boom") };
        let mut orch = ScanOrchestrator::new(Arc::new(source), fast_settings());

        orch.request_scan();
        let events = poll_until(&mut orch, |o| !o.is_running());

        assert!(events.contains(&ScanEvent::Finished { sequence: 1, result_is_empty: true }));
        assert_eq!(orch.fetch_attempts(), 2);
    }

    #[test]
    fn test_requests_while_running_coalesce_into_one_rerun() {
        let (first_tx, first) = gate();
        let (second_tx, second) = gate();
        let source = ScriptedSource::new(vec![first, second]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        wait_for_calls(&source, 1);
        for _ in 0..5 {
            orch.request_scan();
        }
        assert!(orch.rescan_pending());
        assert_eq!(orch.latest_sequence(), 1);

        first_tx.send(Ok(games(json!({ "1": "First" })))).unwrap();
        poll_until(&mut orch, |o| o.latest_sequence() == 2);
        assert!(!orch.rescan_pending());
        assert!(orch.is_running());

        wait_for_calls(&source, 2);
        second_tx.send(Ok(games(json!({ "2": "Second" })))).unwrap();
        poll_until(&mut orch, |o| !o.is_running());

        // Nothing else gets scheduled afterwards
        thread::sleep(Duration::from_millis(50));
        orch.poll(Instant::now());
        assert_eq!(source.calls(), 2);
        assert_eq!(orch.latest_sequence(), 2);
        assert_eq!(effective_names(&orch), vec!["Second"]);
    }

    #[test]
    fn test_older_scan_finishing_late_is_discarded() {
        let (old_tx, old) = gate();
        let (new_tx, new) = gate();
        let source = ScriptedSource::new(vec![old, new]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        wait_for_calls(&source, 1);
        orch.restart_scan();
        wait_for_calls(&source, 2);
        assert_eq!(orch.latest_sequence(), 2);

        old_tx.send(Ok(games(json!({ "1": "Old" })))).unwrap();
        poll_until(&mut orch, |o| o.recent_sessions().any(|s| s.status == ScanStatus::Superseded));
        assert!(orch.state().effective().is_empty());
        assert_eq!(orch.state().generation(), 0);
        assert!(orch.is_running());

        new_tx.send(Ok(games(json!({ "2": "New" })))).unwrap();
        let events = poll_until(&mut orch, |o| !o.is_running());
        assert!(events.contains(&ScanEvent::Finished { sequence: 2, result_is_empty: false }));
        assert!(!events.iter().any(|e| matches!(e, ScanEvent::Finished { sequence: 1, .. })));
        assert_eq!(effective_names(&orch), vec!["New"]);
    }

    #[test]
    fn test_older_scan_finishing_after_newer_one_is_discarded() {
        let (old_tx, old) = gate();
        let (new_tx, new) = gate();
        let source = ScriptedSource::new(vec![old, new]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        wait_for_calls(&source, 1);
        orch.restart_scan();
        wait_for_calls(&source, 2);

        new_tx.send(Ok(games(json!({ "2": "New" })))).unwrap();
        poll_until(&mut orch, |o| !o.is_running());
        let generation = orch.state().generation();

        old_tx.send(Ok(games(json!({ "1": "Old" })))).unwrap();
        poll_until(&mut orch, |o| o.recent_sessions().any(|s| s.status == ScanStatus::Superseded));
        assert_eq!(orch.state().generation(), generation);
        assert_eq!(effective_names(&orch), vec!["New"]);
    }

    #[test]
    fn test_push_during_scan_is_not_lost() {
        let (scan_tx, scan) = gate();
        let source = ScriptedSource::new(vec![scan]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        wait_for_calls(&source, 1);
        assert!(orch.pusher().push(games(json!({ "5": "Pushed" }))));
        let events = poll_until(&mut orch, |o| !o.state().effective().is_empty());
        assert!(events.contains(&ScanEvent::PushApplied { result_is_empty: false }));
        assert!(orch.is_running());

        // Scan comes back empty (twice): pushed games stay visible
        scan_tx.send(Ok(DetectionResultSet::new())).unwrap();
        poll_until(&mut orch, |o| !o.is_running());
        assert_eq!(effective_names(&orch), vec!["Pushed"]);
        assert_eq!(orch.latest_sequence(), 1);
    }

    #[test]
    fn test_non_empty_scan_after_push_wins() {
        let (scan_tx, scan) = gate();
        let source = ScriptedSource::new(vec![scan]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        wait_for_calls(&source, 1);
        orch.pusher().push(games(json!({ "5": "Pushed" })));
        poll_until(&mut orch, |o| !o.state().effective().is_empty());

        scan_tx.send(Ok(games(json!({ "6": "Scanned" })))).unwrap();
        poll_until(&mut orch, |o| !o.is_running());
        assert_eq!(effective_names(&orch), vec!["Scanned"]);
    }

    #[test]
    fn test_restart_with_new_source() {
        let (old_tx, old) = gate();
        let first = ScriptedSource::new(vec![old]);
        let mut orch = ScanOrchestrator::new(first.clone(), fast_settings());

        orch.request_scan();
        wait_for_calls(&first, 1);

        let second = ScriptedSource::new(vec![Scripted::Now(Ok(games(json!({ "3": "Replacement" }))))]);
        orch.set_source(second.clone());
        orch.restart_scan();
        poll_until(&mut orch, |o| !o.is_running());
        assert_eq!(second.calls(), 1);
        assert_eq!(effective_names(&orch), vec!["Replacement"]);

        old_tx.send(Ok(games(json!({ "1": "Old endpoint" })))).unwrap();
        poll_until(&mut orch, |o| o.recent_sessions().any(|s| s.status == ScanStatus::Superseded));
        assert_eq!(effective_names(&orch), vec!["Replacement"]);
    }

    #[test]
    fn test_push_does_not_consume_sequence() {
        let source = ScriptedSource::new(vec![]);
        let mut orch = ScanOrchestrator::new(source, fast_settings());
        orch.pusher().push(DetectionResultSet::new());
        let events = orch.poll(Instant::now());
        assert_eq!(events, vec![ScanEvent::PushApplied { result_is_empty: true }]);
        assert_eq!(orch.latest_sequence(), 0);
        assert_eq!(orch.status(), ScanStatus::Idle);
    }

    #[test]
    fn test_progress_estimate_is_monotonic_and_capped() {
        let tau = Duration::from_secs(2);
        assert_eq!(estimate_progress(Duration::ZERO, tau), 0.0);
        let mut prev = 0.0;
        for ms in [100, 500, 1000, 2000, 5000, 20_000, 600_000] {
            let p = estimate_progress(Duration::from_millis(ms), tau);
            assert!(p >= prev, "progress went backwards at {}ms", ms);
            assert!(p <= MAX_RUNNING_PROGRESS);
            prev = p;
        }
        assert!(prev < 1.0);
    }

    #[test]
    fn test_progress_events_while_running() {
        let (tx, gated) = gate();
        let source = ScriptedSource::new(vec![gated]);
        let mut orch = ScanOrchestrator::new(source.clone(), fast_settings());

        orch.request_scan();
        let events = orch.poll(Instant::now());
        assert!(events.iter().any(|e| matches!(e, ScanEvent::Progress(p) if *p < 1.0)));

        tx.send(Ok(games(json!({ "1": "A" })))).unwrap();
        poll_until(&mut orch, |o| !o.is_running());
    }
}
