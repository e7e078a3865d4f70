//! Event service layer

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventSummary, NewEvent, TypeCount, VisitorCount, VisitorId};
use crate::repository::EventRepository;
use crate::schema::EventSchema;
use observability::EventMetrics;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Column width of `events.visitor`.
pub const MAX_VISITOR_LEN: usize = 255;

/// Validates incoming events and queries the event store.
pub struct EventService {
    repository: Arc<dyn EventRepository>,
    schema: Arc<EventSchema>,
}

impl EventService {
    pub fn new<R: EventRepository + 'static>(repository: R, schema: EventSchema) -> Self {
        Self {
            repository: Arc::new(repository),
            schema: Arc::new(schema),
        }
    }

    /// Validate `body` as an event of type `name` and store it.
    #[instrument(skip(self, body), fields(event_name = %name))]
    pub async fn record(&self, name: &str, body: Value) -> EventResult<Event> {
        let event = self.prepare(name, body).inspect_err(|e| {
            if let Some(reason) = e.rejection_reason() {
                EventMetrics::record_rejected(reason);
            }
        })?;

        let event = self.repository.insert(event).await?;
        EventMetrics::record_ingested();
        info!(event_id = event.id, visitor = %event.visitor, "Event recorded");

        Ok(event)
    }

    /// Split `body` into visitor and payload, then check `{name, ...payload}`
    /// against the schema. Payload keys win over the path name during validation.
    pub fn prepare(&self, name: &str, body: Value) -> EventResult<NewEvent> {
        let Value::Object(mut payload) = body else {
            return Err(EventError::MalformedBody);
        };

        let visitor = match payload.remove("visitor") {
            Some(Value::String(visitor))
                if !visitor.is_empty() && visitor.chars().count() <= MAX_VISITOR_LEN =>
            {
                visitor
            }
            _ => return Err(EventError::InvalidVisitor),
        };

        let mut candidate = Map::with_capacity(payload.len() + 1);
        candidate.insert("name".to_string(), Value::String(name.to_string()));
        candidate.extend(payload.clone());
        let candidate = Value::Object(candidate);

        if !self.schema.validate(&candidate) {
            let errors = self.schema.errors(&candidate);
            debug!(?errors, "Event failed schema validation");
            return Err(EventError::InvalidPayload { errors });
        }

        Ok(NewEvent {
            name: name.to_string(),
            visitor,
            payload,
        })
    }

    #[instrument(skip(self))]
    pub async fn events_by_name(&self, name: &str) -> EventResult<Vec<Event>> {
        self.repository.list_by_name(name).await
    }

    #[instrument(skip(self))]
    pub async fn events_by_visitor(&self, visitor: &str) -> EventResult<Vec<Event>> {
        self.repository.list_by_visitor(visitor).await
    }

    #[instrument(skip(self))]
    pub async fn type_counts(&self) -> EventResult<Vec<TypeCount>> {
        self.repository.count_by_name().await
    }

    #[instrument(skip(self))]
    pub async fn visitor_counts(&self) -> EventResult<Vec<VisitorCount>> {
        self.repository.count_by_visitor().await
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> EventResult<EventSummary> {
        self.repository.summary().await
    }

    /// Full export of the event log.
    #[instrument(skip(self))]
    pub async fn download(&self) -> EventResult<Vec<Event>> {
        let events = self.repository.all().await?;
        info!(count = events.len(), "Exporting events");
        Ok(events)
    }

    pub fn mint_visitor(&self) -> VisitorId {
        VisitorId::new()
    }
}
