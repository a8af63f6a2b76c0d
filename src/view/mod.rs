//! Resource views: a local copy of one collection, reconciled from server
//! responses only.
//!
//! Rules every view follows:
//! - mount replaces the collection with the server list
//! - create appends the object the server returned, or re-lists when the
//!   server only acknowledged
//! - update replaces by id, delete removes by id, both after confirmation
//! - a failure records a message and leaves the collection untouched
//! - results arriving after unmount or after the session changed are dropped
//!
//! The state lock is never held across a request, so overlapping mutations
//! are allowed and the last one to resolve wins.

pub mod dashboard;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{ApiClient, Created, ResourceApi, ResourceModel, Updatable, UpdatableApi};
use crate::error::{ClientError, ClientResult};
use crate::models::{BudgetItem, Category, Form, SharedContribution};
use crate::session::Session;

pub use dashboard::Dashboard;

pub type CategoriesView = ResourceView<Category, dyn UpdatableApi<Category>>;
pub type ItemsView = ResourceView<BudgetItem, dyn UpdatableApi<BudgetItem>>;
pub type SharedView = ResourceView<SharedContribution>;

pub fn categories(client: &ApiClient) -> CategoriesView {
    let api: Arc<dyn UpdatableApi<Category>> = Arc::new(client.resource::<Category>());
    ResourceView::new(api, client.session().clone())
}

pub fn items(client: &ApiClient) -> ItemsView {
    let api: Arc<dyn UpdatableApi<BudgetItem>> = Arc::new(client.resource::<BudgetItem>());
    ResourceView::new(api, client.session().clone())
}

pub fn shared(client: &ApiClient) -> SharedView {
    let api: Arc<dyn ResourceApi<SharedContribution>> =
        Arc::new(client.resource::<SharedContribution>());
    ResourceView::new(api, client.session().clone())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub items: Vec<T>,
    pub error: Option<String>,
    /// Requests in flight; non-zero means "loading"
    pub pending: usize,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            error: None,
            pending: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The result arrived after unmount or a session change and was ignored
    Discarded,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Load,
    Create,
    Update,
    Delete,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

struct Ticket {
    generation: u64,
    action: Action,
}

pub struct ResourceView<T: ResourceModel, A: ResourceApi<T> + ?Sized = dyn ResourceApi<T>> {
    api: Arc<A>,
    session: Session,
    state: Arc<Mutex<ViewState<T>>>,
    mounted: Arc<AtomicBool>,
}

impl<T: ResourceModel, A: ResourceApi<T> + ?Sized> Clone for ResourceView<T, A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: Arc::clone(&self.session),
            state: Arc::clone(&self.state),
            mounted: Arc::clone(&self.mounted),
        }
    }
}

impl<T, A> ResourceView<T, A>
where
    T: ResourceModel,
    A: ResourceApi<T> + ?Sized,
{
    pub fn new(api: Arc<A>, session: Session) -> Self {
        Self {
            api,
            session,
            state: Arc::new(Mutex::new(ViewState::default())),
            mounted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.lock().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().pending > 0
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn find(&self, id: i64) -> Option<T> {
        self.lock().items.iter().find(|item| item.id() == id).cloned()
    }

    /// Fetch the collection and replace local state with it
    pub async fn mount(&self) -> ClientResult<Applied> {
        self.mounted.store(true, Ordering::SeqCst);
        self.refresh().await
    }

    /// Results still in flight will be dropped
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub async fn refresh(&self) -> ClientResult<Applied> {
        let ticket = self.begin(Action::Load);
        let result = self.api.list().await;
        self.finish(ticket, result, |state, items| state.items = items)
    }

    pub async fn create<F>(&self, form: &F) -> ClientResult<Applied>
    where
        F: Form<Payload = T::Payload>,
    {
        let payload = self.validate(form, Action::Create)?;

        let ticket = self.begin(Action::Create);
        match self.api.create(&payload).await {
            Ok(Created::Echoed(item)) => self.finish(ticket, Ok(item), |state, item| state.items.push(item)),
            Ok(Created::Acknowledged) => match self.api.list().await {
                Ok(items) => self.finish(ticket, Ok(items), |state, items| state.items = items),
                Err(e) => {
                    let generation = ticket.generation;
                    // The record exists on the server; only the refresh failed
                    let applied = self.finish(ticket, Ok(()), |state, ()| {
                        state.error = Some(format!(
                            "Created {}, but the list could not be refreshed: {}",
                            T::LABEL,
                            e
                        ));
                    });
                    if self.session.generation() == generation {
                        self.expire_on_auth(&e);
                    }
                    applied
                }
            },
            Err(e) => self.finish(ticket, Err::<(), _>(e), |_, _| {}),
        }
    }

    pub async fn delete(&self, id: i64) -> ClientResult<Applied> {
        let ticket = self.begin(Action::Delete);
        let result = self.api.delete(id).await;
        self.finish(ticket, result, |state, ()| state.items.retain(|item| item.id() != id))
    }

    fn validate<F>(&self, form: &F, action: Action) -> ClientResult<T::Payload>
    where
        F: Form<Payload = T::Payload>,
    {
        form.validate().map_err(|e| {
            self.lock().error = Some(describe(&e, action, T::LABEL));
            e
        })
    }

    fn begin(&self, action: Action) -> Ticket {
        self.lock().pending += 1;
        Ticket {
            generation: self.session.generation(),
            action,
        }
    }

    fn finish<R>(
        &self,
        ticket: Ticket,
        result: ClientResult<R>,
        apply: impl FnOnce(&mut ViewState<T>, R),
    ) -> ClientResult<Applied> {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);

        let same_session = self.session.generation() == ticket.generation;
        if !same_session || !self.is_mounted() {
            drop(state);
            tracing::warn!(
                resource = T::PATH,
                action = ticket.action.verb(),
                "discarding late result"
            );
            // An unmounted view still reports a token rejected under the current session
            if let (true, Err(e)) = (same_session, &result) {
                self.expire_on_auth(e);
            }
            return Ok(Applied::Discarded);
        }

        match result {
            Ok(value) => {
                state.error = None;
                apply(&mut *state, value);
                Ok(Applied::Applied)
            }
            Err(e) => {
                state.error = Some(describe(&e, ticket.action, T::LABEL));
                drop(state);
                self.expire_on_auth(&e);
                Err(e)
            }
        }
    }

    fn expire_on_auth(&self, err: &ClientError) {
        if !err.is_auth() {
            return;
        }
        tracing::warn!(resource = T::PATH, "token rejected, forcing logout");
        if let Err(clear) = self.session.clear_token() {
            tracing::warn!("failed to clear session: {}", clear);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T, A> ResourceView<T, A>
where
    T: Updatable,
    A: UpdatableApi<T> + ?Sized,
{
    pub async fn update<F>(&self, id: i64, form: &F) -> ClientResult<Applied>
    where
        F: Form<Payload = T::Payload>,
    {
        let payload = self.validate(form, Action::Update)?;

        let ticket = self.begin(Action::Update);
        let result = self.api.update(id, &payload).await;
        self.finish(ticket, result, |state, updated| {
            if let Some(slot) = state.items.iter_mut().find(|item| item.id() == id) {
                *slot = updated;
            }
        })
    }
}

/// Inline message shown to the user for a failed action
fn describe(err: &ClientError, action: Action, label: &str) -> String {
    match err {
        ClientError::Auth(_) => "Your session has expired. Please log in again.".to_string(),
        ClientError::NotAuthenticated { .. } => "Please log in first.".to_string(),
        ClientError::Network(_) => format!("Could not {} {}: server unreachable", action.verb(), label),
        ClientError::InvalidInput { field_errors, .. } if !field_errors.is_empty() => {
            let fields = field_errors
                .iter()
                .map(|(field, problem)| format!("{}: {}", field, problem))
                .collect::<Vec<_>>()
                .join("; ");
            format!("Could not {} {}: {}", action.verb(), label, fields)
        }
        other => format!("Could not {} {}: {}", action.verb(), label, other),
    }
}
