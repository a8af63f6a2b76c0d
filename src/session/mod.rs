//! Session store: the bearer token, where it lives, and who hears about changes.
//!
//! One `SessionStore` is created per process and passed around as [`Session`].
//! Every token mutation goes through it and is broadcast on a watch channel
//! together with a generation counter. Consumers that started work under one
//! generation use it to drop results that arrive after a logout or re-login.

pub mod claims;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ClientResult;

pub use claims::TokenClaims;
pub use storage::{FileStorage, MemoryStorage, TokenStorage, SESSION_FILE};

pub type Session = Arc<SessionStore>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub generation: u64,
}

pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn open(storage: Box<dyn TokenStorage>) -> ClientResult<Self> {
        let token = storage.load()?;
        tracing::debug!(
            storage = %storage.describe(),
            authenticated = token.is_some(),
            "session opened"
        );

        let (tx, _) = watch::channel(SessionState {
            token,
            generation: 0,
        });
        Ok(Self { storage, tx })
    }

    pub fn shared(storage: Box<dyn TokenStorage>) -> ClientResult<Session> {
        Ok(Arc::new(Self::open(storage)?))
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().token.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn set_token(&self, token: impl Into<String>) -> ClientResult<()> {
        let token = token.into();
        self.storage.save(Some(&token))?;
        self.publish(Some(token));
        tracing::info!("session token stored");
        Ok(())
    }

    pub fn clear_token(&self) -> ClientResult<()> {
        self.storage.save(None)?;
        self.publish(None);
        tracing::info!("session token cleared");
        Ok(())
    }

    /// Claims of the current token, if it is a readable JWT
    pub fn claims(&self) -> Option<TokenClaims> {
        let token = self.token()?;
        TokenClaims::decode_unverified(&token).ok()
    }

    /// Adopt a token written by another process sharing the storage.
    /// Returns true when the in-memory state changed.
    pub fn sync_from_storage(&self) -> ClientResult<bool> {
        let stored = self.storage.load()?;
        if stored == self.token() {
            return Ok(false);
        }

        tracing::debug!(authenticated = stored.is_some(), "session changed in storage");
        self.publish(stored);
        Ok(true)
    }

    /// Poll storage until the returned task is aborted. Best effort only:
    /// changes between polls collapse into the latest value.
    pub fn watch_storage(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = store.sync_from_storage() {
                    tracing::warn!("session storage poll failed: {}", e);
                }
            }
        })
    }

    fn publish(&self, token: Option<String>) {
        self.tx.send_modify(|state| {
            state.token = token;
            state.generation += 1;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_reads_existing_token() {
        let store = SessionStore::open(Box::new(MemoryStorage::with_token("t0"))).unwrap();
        assert_eq!(store.token().as_deref(), Some("t0"));
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_every_change_bumps_generation() {
        let store = SessionStore::open(Box::new(MemoryStorage::default())).unwrap();
        store.set_token("a").unwrap();
        store.set_token("b").unwrap();
        store.clear_token().unwrap();

        assert_eq!(store.generation(), 3);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_login_and_logout() {
        let store = SessionStore::open(Box::new(MemoryStorage::default())).unwrap();
        let mut rx = store.subscribe();

        store.set_token("abc").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().token.as_deref(), Some("abc"));

        store.clear_token().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().token, None);
    }

    #[test]
    fn test_sync_is_a_no_op_when_storage_agrees() {
        let storage = MemoryStorage::default();
        let store = SessionStore::open(Box::new(storage.clone())).unwrap();
        store.set_token("same").unwrap();

        assert!(!store.sync_from_storage().unwrap());
        assert_eq!(store.generation(), 1);
    }
}
