//! In-memory event store for tests and local runs without Postgres

use crate::error::EventResult;
use crate::models::{Event, EventSummary, NewEvent, TypeCount, VisitorCount};
use crate::repository::EventRepository;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let events = self.events.read().await;
        let mut matching: Vec<Event> = events.iter().filter(|e| keep(e)).cloned().collect();
        matching.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        matching
    }

    async fn count_by(&self, key: impl Fn(&Event) -> &str) -> Vec<(String, i64)> {
        let events = self.events.read().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for event in events.iter() {
            *counts.entry(key(event).to_string()).or_default() += 1;
        }

        // BTreeMap yields keys ascending; the stable sort keeps that for ties
        let mut counts: Vec<(String, i64)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert(&self, event: NewEvent) -> EventResult<Event> {
        let mut events = self.events.write().await;
        let id = events.last().map_or(1, |last| last.id + 1);
        let event = Event {
            id,
            created: Utc::now(),
            name: event.name,
            visitor: event.visitor,
            payload: Value::Object(event.payload),
        };
        events.push(event.clone());
        Ok(event)
    }

    async fn list_by_name(&self, name: &str) -> EventResult<Vec<Event>> {
        Ok(self.newest_first(|e| e.name == name).await)
    }

    async fn list_by_visitor(&self, visitor: &str) -> EventResult<Vec<Event>> {
        Ok(self.newest_first(|e| e.visitor == visitor).await)
    }

    async fn count_by_name(&self) -> EventResult<Vec<TypeCount>> {
        let counts = self.count_by(|e| &e.name).await;
        Ok(counts
            .into_iter()
            .map(|(name, count)| TypeCount { name, count })
            .collect())
    }

    async fn count_by_visitor(&self) -> EventResult<Vec<VisitorCount>> {
        let counts = self.count_by(|e| &e.visitor).await;
        Ok(counts
            .into_iter()
            .map(|(visitor, count)| VisitorCount { visitor, count })
            .collect())
    }

    async fn summary(&self) -> EventResult<EventSummary> {
        let events = self.events.read().await;
        let types: BTreeSet<&str> = events.iter().map(|e| e.name.as_str()).collect();
        let visitors: BTreeSet<&str> = events.iter().map(|e| e.visitor.as_str()).collect();

        Ok(EventSummary {
            events: events.len() as u64,
            types: types.into_iter().map(String::from).collect(),
            visitors: visitors.into_iter().map(String::from).collect(),
        })
    }

    async fn all(&self) -> EventResult<Vec<Event>> {
        Ok(self.events.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn new_event(name: &str, visitor: &str) -> NewEvent {
        let mut payload = Map::new();
        payload.insert("source".into(), json!("test"));
        NewEvent {
            name: name.into(),
            visitor: visitor.into(),
            payload,
        }
    }

    async fn seeded() -> InMemoryEventRepository {
        let repo = InMemoryEventRepository::new();
        for (name, visitor) in [
            ("pageview", "v1"),
            ("click", "v1"),
            ("pageview", "v2"),
            ("signup", "v2"),
            ("pageview", "v1"),
        ] {
            repo.insert(new_event(name, visitor)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryEventRepository::new();
        let first = repo.insert(new_event("a", "v")).await.unwrap();
        let second = repo.insert(new_event("a", "v")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created >= first.created);
        assert_eq!(second.payload, json!({"source": "test"}));
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let repo = seeded().await;

        let pageviews = repo.list_by_name("pageview").await.unwrap();
        let ids: Vec<i32> = pageviews.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 3, 1]);

        let v2 = repo.list_by_visitor("v2").await.unwrap();
        let ids: Vec<i32> = v2.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 3]);

        assert!(repo.list_by_name("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_descending() {
        let repo = seeded().await;

        let types = repo.count_by_name().await.unwrap();
        assert_eq!(
            types,
            vec![
                TypeCount { name: "pageview".into(), count: 3 },
                TypeCount { name: "click".into(), count: 1 },
                TypeCount { name: "signup".into(), count: 1 },
            ]
        );

        let visitors = repo.count_by_visitor().await.unwrap();
        assert_eq!(visitors[0], VisitorCount { visitor: "v1".into(), count: 3 });
        assert_eq!(visitors[1], VisitorCount { visitor: "v2".into(), count: 2 });
    }

    #[tokio::test]
    async fn test_summary_and_download() {
        let repo = seeded().await;

        let summary = repo.summary().await.unwrap();
        assert_eq!(summary.events, 5);
        assert_eq!(summary.types, vec!["click", "pageview", "signup"]);
        assert_eq!(summary.visitors, vec!["v1", "v2"]);

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].id, 1);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let repo = InMemoryEventRepository::new();
        assert_eq!(repo.summary().await.unwrap(), EventSummary::default());
        assert!(repo.count_by_name().await.unwrap().is_empty());
        assert!(repo.all().await.unwrap().is_empty());
    }
}
