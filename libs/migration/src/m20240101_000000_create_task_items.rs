use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskItems::Table)
                    .if_not_exists()
                    .col(pk_auto(TaskItems::Id))
                    .col(string_len(TaskItems::Title, 70))
                    .col(string_len_null(TaskItems::Description, 250))
                    .col(boolean(TaskItems::IsCompleted).default(false))
                    .col(
                        timestamp_with_time_zone(TaskItems::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Backs the newest-first listing, with and without the completion filter
        manager
            .create_index(
                Index::create()
                    .name("idx_task_items_created_at")
                    .table(TaskItems::Table)
                    .col(TaskItems::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_task_items_is_completed")
                    .table(TaskItems::Table)
                    .col(TaskItems::IsCompleted)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskItems::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TaskItems {
    Table,
    Id,
    Title,
    Description,
    IsCompleted,
    CreatedAt,
}
