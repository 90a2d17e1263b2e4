//! Tokio implementation of `core::scheduler::Scheduler`.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::core::action::Action;
use crate::core::scheduler::{Scheduler, TaskId};

/// Runs each scheduled action as a tokio task that sleeps, then sends the
/// action back into the surface's action channel.
pub struct TokioScheduler {
    tx: UnboundedSender<Action>,
    tasks: HashMap<TaskId, AbortHandle>,
    next_id: TaskId,
}

impl TokioScheduler {
    pub fn new(tx: UnboundedSender<Action>) -> Self {
        Self {
            tx,
            tasks: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|h| !h.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, after: Duration, action: Action) -> TaskId {
        // Drop handles of tasks that already ran.
        self.tasks.retain(|_, handle| !handle.is_finished());

        let id = self.next_id;
        self.next_id += 1;
        debug!("Scheduling task {} in {:?}: {:?}", id, after, action);

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if tx.send(action).is_err() {
                warn!("Scheduled task {} fired after its receiver was dropped", id);
            }
        });
        self.tasks.insert(id, handle.abort_handle());
        id
    }

    fn cancel(&mut self, id: TaskId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
