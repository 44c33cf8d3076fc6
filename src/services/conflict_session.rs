//! Debounced, last-request-wins conflict computation for one form.
//!
//! Each call issues a new epoch. A finished computation writes the result
//! slot only when its epoch is still the newest one, so a slow stale request
//! can never overwrite the answer to a newer selection.
//!
//! This is the library entry point for interactive clients that re-query on
//! every selection change. The HTTP handlers are stateless and call
//! [`compute_conflict_dates`] directly.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use actix_web::rt::{self, task::JoinHandle};
use chrono::NaiveDate;
use tracing::debug;

use super::conflicts::{ConflictContext, ConflictSet, FailurePolicy, compute_conflict_dates};
use crate::config::Config;
use crate::repository::RecordSource;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Default)]
struct SessionState {
    latest_epoch: u64,
    committed_epoch: u64,
    selection: Vec<u64>,
    committed: ConflictSet,
    pending: Option<JoinHandle<()>>,
}

impl SessionState {
    /// Stores `set` if `epoch` is still the newest issued. Returns whether it did.
    fn commit(&mut self, epoch: u64, employee_ids: Vec<u64>, set: ConflictSet) -> bool {
        if epoch != self.latest_epoch {
            debug!(epoch, latest = self.latest_epoch, "Discarding stale conflict result");
            return false;
        }
        self.committed_epoch = epoch;
        self.selection = employee_ids;
        self.committed = set;
        true
    }
}

pub struct ConflictSession {
    source: Arc<dyn RecordSource>,
    context: ConflictContext,
    policy: FailurePolicy,
    debounce: Duration,
    state: Rc<RefCell<SessionState>>,
}

impl ConflictSession {
    pub fn new(source: Arc<dyn RecordSource>, context: ConflictContext) -> Self {
        Self {
            source,
            context,
            policy: FailurePolicy::default(),
            debounce: DEFAULT_DEBOUNCE,
            state: Rc::new(RefCell::new(SessionState::default())),
        }
    }

    /// Session using the configured debounce and failure policy.
    pub fn from_config(source: Arc<dyn RecordSource>, context: ConflictContext, config: &Config) -> Self {
        Self::new(source, context)
            .with_policy(config.conflict_failure_policy)
            .with_debounce(config.conflict_debounce)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Bumps the epoch and drops any pending debounce timer.
    fn issue(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.latest_epoch += 1;
        state.latest_epoch
    }

    /// Schedules a computation for `employee_ids` after the debounce
    /// quiescence. A later call before the timer fires replaces this one.
    pub fn request(&self, employee_ids: Vec<u64>) {
        let epoch = self.issue();
        let source = self.source.clone();
        let state = self.state.clone();
        let (context, policy, debounce) = (self.context, self.policy, self.debounce);

        let handle = rt::spawn(async move {
            rt::time::sleep(debounce).await;
            let set = compute_conflict_dates(source.as_ref(), &employee_ids, context, policy).await;
            let mut state = state.borrow_mut();
            state.pending = None;
            state.commit(epoch, employee_ids, set);
        });

        self.state.borrow_mut().pending = Some(handle);
    }

    /// Computes immediately, without debouncing. The result is returned in
    /// any case but only committed when no newer request was issued meanwhile.
    pub async fn refresh_now(&self, employee_ids: &[u64]) -> ConflictSet {
        let epoch = self.issue();
        let set = compute_conflict_dates(self.source.as_ref(), employee_ids, self.context, self.policy).await;
        self.state
            .borrow_mut()
            .commit(epoch, employee_ids.to_vec(), set.clone());
        set
    }

    /// Last committed result.
    pub fn current(&self) -> ConflictSet {
        self.state.borrow().committed.clone()
    }

    /// Employee selection the committed result belongs to.
    pub fn selection(&self) -> Vec<u64> {
        self.state.borrow().selection.clone()
    }

    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        self.state.borrow().committed.is_date_disabled(date)
    }

    /// True while a newer request than the committed result is outstanding.
    pub fn is_loading(&self) -> bool {
        let state = self.state.borrow();
        state.committed_epoch != state.latest_epoch
    }
}

impl Drop for ConflictSession {
    fn drop(&mut self) {
        if let Some(pending) = self.state.borrow_mut().pending.take() {
            pending.abort();
        }
    }
}
