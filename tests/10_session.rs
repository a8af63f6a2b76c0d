use std::time::Duration;

use anyhow::Result;
use budget_tracker::guard::{GuardDecision, Route, RouteGuard};
use budget_tracker::session::{FileStorage, SessionStore};
use budget_tracker::shell::NavShell;

fn scratch_dir(name: &str) -> Result<std::path::PathBuf> {
    let dir = std::env::temp_dir().join(format!("budget-it-{}-{}", name, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[tokio::test]
async fn login_in_one_store_is_seen_by_another_after_sync() -> Result<()> {
    let dir = scratch_dir("sync")?;
    let first = SessionStore::shared(Box::new(FileStorage::in_dir(&dir)))?;
    let second = SessionStore::shared(Box::new(FileStorage::in_dir(&dir)))?;

    first.set_token("abc")?;
    assert!(!second.is_authenticated());

    assert!(second.sync_from_storage()?);
    assert_eq!(second.token().as_deref(), Some("abc"));

    // Nothing new on disk
    assert!(!second.sync_from_storage()?);

    first.clear_token()?;
    assert!(second.sync_from_storage()?);
    assert!(!second.is_authenticated());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test]
async fn token_survives_a_restart() -> Result<()> {
    let dir = scratch_dir("restart")?;
    {
        let store = SessionStore::open(Box::new(FileStorage::in_dir(&dir)))?;
        store.set_token("persisted")?;
    }

    let reopened = SessionStore::open(Box::new(FileStorage::in_dir(&dir)))?;
    assert_eq!(reopened.token().as_deref(), Some("persisted"));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test]
async fn storage_watcher_publishes_logout_from_elsewhere() -> Result<()> {
    let dir = scratch_dir("watch")?;
    let other = SessionStore::shared(Box::new(FileStorage::in_dir(&dir)))?;
    other.set_token("abc")?;

    let store = SessionStore::shared(Box::new(FileStorage::in_dir(&dir)))?;
    let guard = RouteGuard::new(store.clone());
    assert_eq!(guard.check(Route::Items), GuardDecision::Render(Route::Items));

    let mut rx = store.subscribe();
    let poller = store.watch_storage(Duration::from_millis(20));

    other.clear_token()?;
    tokio::time::timeout(Duration::from_secs(2), rx.changed()).await??;
    poller.abort();

    assert!(rx.borrow().token.is_none());
    assert_eq!(guard.check(Route::Items), GuardDecision::Redirect(Route::Login));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test]
async fn shell_logout_lands_on_login() -> Result<()> {
    let dir = scratch_dir("shell")?;
    let session = SessionStore::shared(Box::new(FileStorage::in_dir(&dir)))?;
    session.set_token("abc")?;

    let shell = NavShell::new(session.clone());
    assert_eq!(shell.navigate("/"), GuardDecision::Redirect(Route::Dashboard));

    assert_eq!(shell.logout()?, Route::Login);
    assert!(!session.is_authenticated());
    assert_eq!(shell.navigate("/dashboard"), GuardDecision::Redirect(Route::Login));
    assert_eq!(shell.navigate("/"), GuardDecision::Redirect(Route::Login));

    // Unknown paths render their not-found page either way
    assert_eq!(
        shell.navigate("/nope"),
        GuardDecision::Render(Route::NotFound("/nope".to_string()))
    );

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
