//! Event domain models

use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored analytics event. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-generated, monotonic
    pub id: i32,
    /// Store-assigned insertion time
    pub created: DateTime<Utc>,
    /// Event type, taken from the request path
    pub name: String,
    pub visitor: String,
    /// Always a JSON object
    pub payload: Value,
}

/// A validated event ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub visitor: String,
    pub payload: Map<String, Value>,
}

/// Number of events per event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct TypeCount {
    pub name: String,
    pub count: i64,
}

/// Number of events per visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct VisitorCount {
    pub visitor: String,
    pub count: i64,
}

/// Dashboard summary: total events plus the distinct types and visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub events: u64,
    pub types: Vec<String>,
    pub visitors: Vec<String>,
}

/// A freshly minted visitor identifier. Nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorId {
    pub id: Uuid,
}

impl VisitorId {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for VisitorId {
    fn default() -> Self {
        Self::new()
    }
}
