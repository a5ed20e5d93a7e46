/*
[INPUT]:  TaskApi client, search terms from the coordinator
[OUTPUT]: Current task list snapshot, loading flag, last applied query
[POS]:    Task collection store - sole owner of the in-memory task list
[UPDATE]: When changing refresh/search semantics or staleness rules
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskrunner_adapter::{Task, TaskApi};

use crate::error::{ConsoleError, RemoteOperation, Result};
use crate::notice::Notifier;

pub const EMPTY_SEARCH_NOTICE: &str = "No tasks found matching your search";

/// How a fetch resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with `count` tasks
    Applied { count: usize },
    /// A newer fetch was issued meanwhile; this result was discarded
    Superseded,
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied { .. })
    }
}

/// Read-only copy of the store state for rendering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub last_query: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: Vec<Task>,
    in_flight: usize,
    last_query: Option<String>,
    /// Ticket of the most recently issued fetch
    latest_ticket: u64,
}

/// Holds the task list and replaces it wholesale on every refresh or search.
///
/// Fetches may overlap; each takes a ticket and only the latest issued one is
/// allowed to touch state when it resolves.
pub struct TaskStore<C: ?Sized> {
    client: Arc<C>,
    notifier: Notifier,
    state: Mutex<StoreState>,
}

impl<C: TaskApi + ?Sized> TaskStore<C> {
    pub fn new(client: Arc<C>, notifier: Notifier) -> Self {
        Self {
            client,
            notifier,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Reload the full list and clear the active search
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let ticket = self.begin_fetch();
        let _loading = LoadingFlag(&self.state);

        tracing::debug!(ticket = ticket.0, "refreshing task list");
        let result = self.client.list(None).await;

        let count = {
            let mut state = self.lock();
            if !ticket.is_current(&state) {
                tracing::debug!(ticket = ticket.0, "discarding superseded refresh");
                return Ok(FetchOutcome::Superseded);
            }
            let tasks = result.map_err(|err| ConsoleError::remote(RemoteOperation::List, err))?;
            let count = tasks.len();
            state.tasks = tasks;
            state.last_query = None;
            count
        };
        Ok(FetchOutcome::Applied { count })
    }

    /// Server-side search; a blank query is a plain refresh
    pub async fn apply_search(&self, query: &str) -> Result<FetchOutcome> {
        if query.trim().is_empty() {
            return self.refresh().await;
        }

        let ticket = self.begin_fetch();
        let _loading = LoadingFlag(&self.state);

        tracing::debug!(ticket = ticket.0, query, "searching tasks");
        let result = self.client.search(query).await;

        let count = {
            let mut state = self.lock();
            if !ticket.is_current(&state) {
                tracing::debug!(ticket = ticket.0, query, "discarding superseded search");
                return Ok(FetchOutcome::Superseded);
            }
            let tasks =
                result.map_err(|err| ConsoleError::remote(RemoteOperation::Search, err))?;
            let count = tasks.len();
            state.tasks = tasks;
            state.last_query = Some(query.to_string());
            count
        };

        if count == 0 {
            self.notifier.info(EMPTY_SEARCH_NOTICE);
        }
        Ok(FetchOutcome::Applied { count })
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn last_query(&self) -> Option<String> {
        self.lock().last_query.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        StoreSnapshot {
            tasks: state.tasks.clone(),
            loading: state.in_flight > 0,
            last_query: state.last_query.clone(),
        }
    }

    fn begin_fetch(&self) -> Ticket {
        let mut state = self.lock();
        state.latest_ticket += 1;
        state.in_flight += 1;
        Ticket(state.latest_ticket)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
struct Ticket(u64);

impl Ticket {
    fn is_current(self, state: &StoreState) -> bool {
        state.latest_ticket == self.0
    }
}

/// Drops the in-flight count on every exit path
struct LoadingFlag<'a>(&'a Mutex<StoreState>);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        let mut state = lock_state(self.0);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}
