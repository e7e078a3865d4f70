use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the events table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created: DateTimeWithTimeZone,
    pub name: String,
    pub visitor: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Conversion from Sea-ORM Model to domain Event
impl From<Model> for crate::models::Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            created: model.created.into(),
            name: model.name,
            visitor: model.visitor,
            payload: model.payload,
        }
    }
}
