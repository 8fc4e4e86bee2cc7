use crate::{DomainError, DomainEvent};
use async_trait::async_trait;

/// Outbound sink for registry events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), DomainError>;
}
