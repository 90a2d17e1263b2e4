//! # Scheduled Actions
//!
//! Delayed work (the redirect notice, prompt expiry) is expressed as "deliver
//! this `Action` after this long". Scheduled tasks can be cancelled one by one
//! or all at once. The tokio-backed implementation lives with the terminal
//! adapter (`term::scheduler`).

use std::time::Duration;

use crate::core::action::Action;

pub type TaskId = u64;

pub trait Scheduler {
    fn schedule(&mut self, after: Duration, action: Action) -> TaskId;
    fn cancel(&mut self, id: TaskId);
    /// Cancels every outstanding task. Implementations also do this on drop,
    /// so nothing fires after the surface that scheduled it is gone.
    fn cancel_all(&mut self);
}
