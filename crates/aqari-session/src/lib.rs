//! # aqari-session
//!
//! Per-sender transient dialogue state. Sessions live only in process
//! memory, keyed by sender id, and expire after a fixed idle window. The
//! store sweeps eagerly — callers run [`SessionStore::sweep`] before
//! handling each message, so no stale session is ever acted upon.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Where an open dialogue currently stands. The absence of a session is
/// the idle state; the comparison itself is instantaneous and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueMode {
    /// One or more buildings still need a reference-number selection.
    Disambiguating,
    /// All buildings resolved; bedroom type still needed.
    AwaitingBedroom,
}

/// One ambiguous building query, snapshotted from the knowledge base at
/// dialogue start. `references` is the valid answer set; `building_id` is
/// filled in once the sender picks one.
#[derive(Debug, Clone)]
pub struct AmbiguityCandidate {
    /// The keyword that was ambiguous (e.g. "tower a").
    pub query: String,
    /// The menu text presented to the sender.
    pub menu_text: String,
    /// Valid reference numbers listed in the menu.
    pub references: Vec<String>,
    /// Chosen building, once resolved.
    pub building_id: Option<String>,
    pub resolved: bool,
}

/// Dialogue state for one sender.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub sender_id: String,
    pub mode: DialogueMode,
    /// FIFO queue of ambiguities still awaiting a reference answer.
    pub pending: VecDeque<AmbiguityCandidate>,
    /// Buildings selected so far, in resolution order.
    pub resolved_building_ids: Vec<String>,
    pub last_touched: DateTime<Utc>,
}

impl SessionState {
    pub fn new(sender_id: impl Into<String>, mode: DialogueMode) -> Self {
        Self {
            sender_id: sender_id.into(),
            mode,
            pending: VecDeque::new(),
            resolved_building_ids: Vec::new(),
            last_touched: Utc::now(),
        }
    }
}

/// Injectable time source so TTL behavior is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Inner {
    sessions: HashMap<String, SessionState>,
    /// Per-sender guards so two in-flight messages from the same sender
    /// cannot interleave a read-modify-write on the session.
    locks: HashMap<String, Arc<Mutex<()>>>,
}

/// In-memory session store. Cheap to clone and share across request tasks.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: HashMap::new(),
                locks: HashMap::new(),
            })),
            ttl: Duration::seconds(ttl_secs as i64),
            clock,
        }
    }

    /// Acquire this sender's serialization guard. Held for the duration of
    /// one state transition; different senders never contend on it.
    pub async fn lock_sender(&self, sender_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inner = self.inner.lock().await;
            inner
                .locks
                .entry(sender_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Current session for a sender, if one is open.
    pub async fn get(&self, sender_id: &str) -> Option<SessionState> {
        self.inner.lock().await.sessions.get(sender_id).cloned()
    }

    /// Store a session, stamping `last_touched` with the injected clock.
    pub async fn put(&self, mut state: SessionState) {
        state.last_touched = self.clock.now();
        self.inner
            .lock()
            .await
            .sessions
            .insert(state.sender_id.clone(), state);
    }

    /// Drop a sender's session (dialogue finished or reset).
    pub async fn clear(&self, sender_id: &str) {
        let mut inner = self.inner.lock().await;
        inner.sessions.remove(sender_id);
        inner.locks.remove(sender_id);
    }

    /// Drop every session idle longer than the TTL. Returns how many were
    /// removed. Runs before each message is processed.
    pub async fn sweep(&self) -> usize {
        let cutoff = self.clock.now() - self.ttl;
        let mut inner = self.inner.lock().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| s.last_touched > cutoff);
        let removed = before - inner.sessions.len();
        if removed > 0 {
            debug!("swept {removed} expired session(s)");
        }
        removed
    }

    /// Number of open sessions (diagnostics).
    pub async fn open_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }
}
