//! Event repository trait

use crate::error::EventResult;
use crate::models::{Event, EventSummary, NewEvent, TypeCount, VisitorCount};
use async_trait::async_trait;

/// Storage operations for the append-only event log.
///
/// Lists are newest first. Counts are ordered by count descending, ties by key.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Append an event; the store assigns `id` and `created`
    async fn insert(&self, event: NewEvent) -> EventResult<Event>;

    /// All events of one type
    async fn list_by_name(&self, name: &str) -> EventResult<Vec<Event>>;

    /// All events of one visitor
    async fn list_by_visitor(&self, visitor: &str) -> EventResult<Vec<Event>>;

    async fn count_by_name(&self) -> EventResult<Vec<TypeCount>>;

    async fn count_by_visitor(&self) -> EventResult<Vec<VisitorCount>>;

    /// Total count plus distinct types and visitors, each sorted ascending
    async fn summary(&self) -> EventResult<EventSummary>;

    /// Every event in insertion order
    async fn all(&self) -> EventResult<Vec<Event>>;
}
