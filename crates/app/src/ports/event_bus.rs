//! Event bus port — publish/subscribe for controller events.

use std::future::Future;

use coop_domain::event::Event;

use crate::error::PublishError;

/// Publishes controller events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), PublishError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), PublishError>> + Send {
        (**self).publish(event)
    }
}
