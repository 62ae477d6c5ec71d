//! Per-session state: credential, agent and transcript.
//!
//! Each user session owns its own [`Session`]; nothing is shared between
//! sessions. The web host keeps live sessions in a [`SessionStore`].

mod handler;
mod transcript;

pub use handler::QueryHandler;
pub use transcript::{format_entry, Download, Transcript, TRANSCRIPT_FILE_NAME, TRANSCRIPT_MIME};

#[cfg(test)]
pub(crate) use handler::tests::ScriptedAgent;

use crate::agent::{AgentFactory, QueryAgent};
use crate::credential::Credential;
use crate::error::{ArxivQaError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// State of a single user session.
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    credential: Option<Credential>,
    agent: Option<Arc<dyn QueryAgent>>,
    transcript: Transcript,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            credential: None,
            agent: None,
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The credential last used in this session, if any.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Get the session's agent for `credential`, building it on first use.
    ///
    /// The agent is rebuilt only when the credential changes.
    pub fn agent_for(
        &mut self,
        credential: &Credential,
        factory: &dyn AgentFactory,
    ) -> Result<Arc<dyn QueryAgent>> {
        if let (Some(current), Some(agent)) = (&self.credential, &self.agent) {
            if current == credential {
                return Ok(agent.clone());
            }
        }

        debug!("Building agent for session {}", self.id);
        let agent = factory.create(credential)?;
        self.credential = Some(credential.clone());
        self.agent = Some(agent.clone());
        Ok(agent)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

struct StoredSession {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// Registry of live sessions, each behind its own lock.
///
/// Holding a session's lock for a whole render cycle serializes the
/// queries of that session while other sessions proceed independently.
/// With an idle TTL, sessions not looked up for that long are reaped.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that drops sessions idle for longer than `ttl`.
    pub fn with_idle_ttl(ttl: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::default(),
            idle_ttl: ttl,
        }
    }

    /// Start a new, empty session.
    pub async fn create(&self) -> Uuid {
        self.reap_expired().await;

        let session = Session::new();
        let id = session.id();
        self.sessions.write().await.insert(
            id,
            StoredSession {
                session: Arc::new(Mutex::new(session)),
                last_seen: Instant::now(),
            },
        );
        info!("Session {} started", id);
        id
    }

    /// Look up a live session and mark it as seen.
    pub async fn get(&self, id: &Uuid) -> Result<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(id)
            .filter(|stored| !self.is_expired(stored))
            .ok_or_else(|| ArxivQaError::SessionNotFound(id.to_string()))?;

        stored.last_seen = Instant::now();
        Ok(stored.session.clone())
    }

    /// Drop every session idle for longer than the TTL.
    ///
    /// Sessions in the middle of a render cycle are kept. Returns how many
    /// sessions were dropped.
    pub async fn reap_expired(&self) -> usize {
        if self.idle_ttl.is_none() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| {
            !self.is_expired(stored) || Arc::strong_count(&stored.session) > 1
        });

        let reaped = before - sessions.len();
        if reaped > 0 {
            info!("Reaped {} idle session(s)", reaped);
        }
        reaped
    }

    fn is_expired(&self, stored: &StoredSession) -> bool {
        self.idle_ttl
            .is_some_and(|ttl| stored.last_seen.elapsed() > ttl)
    }

    /// End a session, dropping its credential and transcript.
    pub async fn end(&self, id: &Uuid) -> bool {
        let Some(stored) = self.sessions.write().await.remove(id) else {
            return false;
        };

        let started = stored.session.lock().await.created_at();
        info!(
            "Session {} ended after {}s",
            id,
            (Utc::now() - started).num_seconds()
        );
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Factory handing out scripted agents and counting how often it runs.
    #[derive(Default)]
    pub(crate) struct CountingFactory {
        pub created: AtomicUsize,
        pub answers: Vec<&'static str>,
    }

    impl CountingFactory {
        pub(crate) fn answering(answers: &[&'static str]) -> Self {
            Self {
                created: AtomicUsize::new(0),
                answers: answers.to_vec(),
            }
        }

        pub(crate) fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
    }

    impl AgentFactory for CountingFactory {
        fn create(&self, _credential: &Credential) -> Result<Arc<dyn QueryAgent>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(ScriptedAgent::answering(&self.answers)))
        }
    }

    #[test]
    fn test_agent_reused_for_same_credential() {
        let factory = CountingFactory::default();
        let mut session = Session::new();
        let key = Credential::from_input("sk-one").unwrap();

        session.agent_for(&key, &factory).unwrap();
        session.agent_for(&key, &factory).unwrap();
        assert_eq!(factory.created(), 1);

        let other = Credential::from_input("sk-two").unwrap();
        session.agent_for(&other, &factory).unwrap();
        assert_eq!(factory.created(), 2);
        assert_eq!(session.credential(), Some(&other));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;
        assert_ne!(a, b);

        store
            .get(&a)
            .await
            .unwrap()
            .lock()
            .await
            .transcript_mut()
            .append("Q", "R");

        assert_eq!(store.get(&a).await.unwrap().lock().await.transcript().len(), 1);
        assert!(store.get(&b).await.unwrap().lock().await.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_end_session() {
        let store = SessionStore::new();
        let id = store.create().await;
        assert_eq!(store.len().await, 1);

        assert!(store.end(&id).await);
        assert!(!store.end(&id).await);
        assert!(store.is_empty().await);
        assert!(matches!(
            store.get(&id).await,
            Err(ArxivQaError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_idle_sessions_are_reaped() {
        let store = SessionStore::with_idle_ttl(Some(Duration::from_millis(20)));
        let idle = store.create().await;
        store.get(&idle).await.unwrap().lock().await.transcript_mut().append("Q", "R");

        tokio::time::sleep(Duration::from_millis(60)).await;

        // An expired session is gone even before the reaper runs
        assert!(matches!(
            store.get(&idle).await,
            Err(ArxivQaError::SessionNotFound(_))
        ));

        let fresh = store.create().await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(&fresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_session_in_use_is_not_reaped() {
        let store = SessionStore::with_idle_ttl(Some(Duration::from_millis(20)));
        let id = store.create().await;
        let held = store.get(&id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.reap_expired().await, 0);

        drop(held);
        assert_eq!(store.reap_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_no_ttl_keeps_sessions() {
        let store = SessionStore::new();
        store.create().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.reap_expired().await, 0);
        assert_eq!(store.len().await, 1);
    }
}
