use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use platform_authz::{Role, RoleContext};
use products_hr::{HrModule, checkin::CheckInPanel, time_off::TimeOffBook};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Everything one signed-in viewer can change. Lives until logout or expiry.
#[derive(Debug)]
pub struct Session {
    pub role: RoleContext,
    pub time_off: TimeOffBook,
    pub check_in: CheckInPanel,
}

impl Session {
    pub fn new(hr: &HrModule, viewer_id: impl Into<String>, role: Role) -> Self {
        Self {
            role: RoleContext::new(viewer_id, role),
            time_off: hr.time_off_book(),
            check_in: CheckInPanel::default(),
        }
    }
}

/// Events within one session are serialized through this lock.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Clone)]
struct SessionEntry {
    handle: SessionHandle,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of looking a session up by its cookie id.
#[derive(Debug)]
pub enum SessionLookup {
    Active(SessionHandle),
    Expired,
    Missing,
}

#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Registers `session` and drops every entry that has already expired.
    pub async fn create(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions dropped");
        }
        sessions.insert(
            id,
            SessionEntry {
                handle: Arc::new(Mutex::new(session)),
                expires_at: now + self.ttl,
            },
        );
        id
    }

    /// Expired entries are removed on sight.
    pub async fn get(&self, id: &Uuid) -> SessionLookup {
        let now = Utc::now();
        let entry = self.inner.read().await.get(id).cloned();
        match entry {
            None => SessionLookup::Missing,
            Some(entry) if entry.is_expired(now) => {
                self.inner.write().await.remove(id);
                SessionLookup::Expired
            }
            Some(entry) => SessionLookup::Active(entry.handle),
        }
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use products_hr::DatasetSpec;

    fn hr() -> HrModule {
        HrModule::seeded(DatasetSpec {
            seed: 42,
            today: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
        })
    }

    fn active(lookup: SessionLookup) -> SessionHandle {
        match lookup {
            SessionLookup::Active(handle) => handle,
            other => panic!("expected an active session, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sessions_own_independent_state() {
        let hr = hr();
        let store = SessionStore::new(Duration::hours(DEFAULT_SESSION_TTL_HOURS));
        let a = store.create(Session::new(&hr, "EMP001", Role::Admin)).await;
        let b = store.create(Session::new(&hr, "EMP002", Role::Employee)).await;
        assert_eq!(store.len().await, 2);

        {
            let handle = active(store.get(&a).await);
            let mut session = handle.lock().await;
            let viewer = session.role.clone();
            session.time_off.approve(&viewer, "TO-001").unwrap();
        }
        let other = active(store.get(&b).await);
        let other = other.lock().await;
        assert!(!other.time_off.get("TO-001").unwrap().status.is_terminal());

        assert!(store.remove(&a).await);
        assert!(!store.remove(&a).await);
        assert!(matches!(store.get(&a).await, SessionLookup::Missing));
    }

    #[tokio::test]
    async fn expired_sessions_are_reported_and_removed() {
        let hr = hr();
        let store = SessionStore::new(Duration::zero());
        let id = store.create(Session::new(&hr, "EMP001", Role::Admin)).await;
        assert!(matches!(store.get(&id).await, SessionLookup::Expired));
        assert_eq!(store.len().await, 0);
        assert!(matches!(store.get(&id).await, SessionLookup::Missing));
    }

    #[tokio::test]
    async fn create_prunes_expired_entries() {
        let hr = hr();
        let store = SessionStore::new(Duration::zero());
        for _ in 0..100 {
            store.create(Session::new(&hr, "EMP001", Role::Employee)).await;
        }
        // Each create drops the previous, already expired, entry.
        assert_eq!(store.len().await, 1);
    }
}
