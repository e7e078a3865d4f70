//! Events Domain
//!
//! Schema-validated ingestion of analytics events and the read-side
//! queries behind the dashboard.
//!
//! ```text
//! POST /api/events/:name ─► EventService::record
//!                              ├─ visitor check (non-empty string)
//!                              ├─ JSON Schema check of {name, ...payload}
//!                              └─► EventRepository::insert ─► Postgres
//! ```

pub mod entity;
mod error;
pub mod handlers;
mod memory;
mod models;
mod postgres;
mod repository;
mod schema;
mod service;

pub use error::{EventError, EventResult};
pub use handlers::{EventsState, register};
pub use memory::InMemoryEventRepository;
pub use models::{Event, EventSummary, NewEvent, TypeCount, VisitorCount, VisitorId};
pub use postgres::PgEventRepository;
pub use repository::EventRepository;
pub use schema::{BUNDLED_SCHEMA, EventSchema};
pub use service::EventService;
