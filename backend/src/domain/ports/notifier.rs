//! Port through which services announce civic events.

use async_trait::async_trait;

use crate::domain::CivicEvent;

/// Receives domain events after successful mutations.
///
/// Publishing never fails: the mutation that raised the event has already
/// been committed, so implementations log and swallow their own errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: CivicEvent);
}

/// Notifier that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn publish(&self, _event: CivicEvent) {}
}
