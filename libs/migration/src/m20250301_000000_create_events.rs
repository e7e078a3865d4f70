use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(
                        timestamp_with_time_zone(Events::Created)
                            .default(Expr::current_timestamp()),
                    )
                    .col(string_len(Events::Name, 255))
                    .col(string_len(Events::Visitor, 255))
                    .col(json_binary(Events::Payload).default(Expr::cust("'{}'::jsonb")))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_name")
                    .table(Events::Table)
                    .col(Events::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_visitor")
                    .table(Events::Table)
                    .col(Events::Visitor)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_events_visitor").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_events_name").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Created,
    Name,
    Visitor,
    Payload,
}
