//! PostgreSQL-backed event store

use crate::entity::{self, Column, Entity};
use crate::error::EventResult;
use crate::models::{Event, EventSummary, NewEvent, TypeCount, VisitorCount};
use crate::repository::EventRepository;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use serde_json::Value;
use tracing::instrument;

#[derive(Clone)]
pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn newest_first(select: Select<Entity>) -> Select<Entity> {
        select
            .order_by_desc(Column::Created)
            .order_by_desc(Column::Id)
    }

    fn counted_by(column: Column) -> Select<Entity> {
        Entity::find()
            .select_only()
            .column(column)
            .column_as(Column::Id.count(), "count")
            .group_by(column)
            .order_by_desc(Column::Id.count())
            .order_by_asc(column)
    }

    async fn distinct(&self, column: Column) -> EventResult<Vec<String>> {
        let values = Entity::find()
            .select_only()
            .column(column)
            .distinct()
            .order_by_asc(column)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(values)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self, event), fields(event_name = %event.name))]
    async fn insert(&self, event: NewEvent) -> EventResult<Event> {
        let model = entity::ActiveModel {
            name: Set(event.name),
            visitor: Set(event.visitor),
            payload: Set(Value::Object(event.payload)),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(model.into())
    }

    async fn list_by_name(&self, name: &str) -> EventResult<Vec<Event>> {
        let models = Self::newest_first(Entity::find().filter(Column::Name.eq(name)))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_visitor(&self, visitor: &str) -> EventResult<Vec<Event>> {
        let models = Self::newest_first(Entity::find().filter(Column::Visitor.eq(visitor)))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_name(&self) -> EventResult<Vec<TypeCount>> {
        let counts = Self::counted_by(Column::Name)
            .into_model::<TypeCount>()
            .all(&self.db)
            .await?;
        Ok(counts)
    }

    async fn count_by_visitor(&self) -> EventResult<Vec<VisitorCount>> {
        let counts = Self::counted_by(Column::Visitor)
            .into_model::<VisitorCount>()
            .all(&self.db)
            .await?;
        Ok(counts)
    }

    async fn summary(&self) -> EventResult<EventSummary> {
        let events = Entity::find().count(&self.db).await?;
        let types = self.distinct(Column::Name).await?;
        let visitors = self.distinct(Column::Visitor).await?;

        Ok(EventSummary {
            events,
            types,
            visitors,
        })
    }

    async fn all(&self) -> EventResult<Vec<Event>> {
        let models = Entity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
