use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use crate::{
    entity,
    error::{TaskError, TaskResult},
    models::{NewTaskItem, TaskItem},
    repository::{TaskRepository, UnitOfWork},
};

pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn get_by_id(&self, id: i32) -> TaskResult<Option<TaskItem>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, completed: Option<bool>) -> TaskResult<Vec<TaskItem>> {
        let mut query = entity::Entity::find();

        if let Some(completed) = completed {
            query = query.filter(entity::Column::IsCompleted.eq(completed));
        }

        // Newest first; id breaks ties between rows created in the same instant
        let models = query
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn begin(&self) -> TaskResult<Box<dyn UnitOfWork>> {
        let txn = self.db.begin().await?;
        Ok(Box::new(PgUnitOfWork {
            txn: Some(txn),
            affected: 0,
        }))
    }

    async fn ping(&self) -> TaskResult<()> {
        database::postgres::check_health(&self.db)
            .await
            .map_err(|e| TaskError::Internal(e.to_string()))
    }
}

/// Unit of work over a database transaction.
///
/// Statements run inside the transaction as they are issued; `commit` makes
/// them visible. Dropping without commit rolls the transaction back.
struct PgUnitOfWork {
    txn: Option<DatabaseTransaction>,
    affected: u64,
}

impl PgUnitOfWork {
    fn txn(&self) -> TaskResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| TaskError::Internal("unit of work already committed".to_string()))
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> TaskResult<Option<TaskItem>> {
        let model = entity::Entity::find_by_id(id).one(self.txn()?).await?;
        Ok(model.map(Into::into))
    }

    async fn insert(&mut self, item: NewTaskItem) -> TaskResult<TaskItem> {
        let active_model: entity::ActiveModel = item.into();
        let model = active_model.insert(self.txn()?).await?;

        self.affected += 1;
        Ok(model.into())
    }

    async fn update(&mut self, item: TaskItem) -> TaskResult<TaskItem> {
        let active_model: entity::ActiveModel = item.into();
        let model = active_model.update(self.txn()?).await?;

        self.affected += 1;
        Ok(model.into())
    }

    async fn remove(&mut self, item: TaskItem) -> TaskResult<()> {
        let result = entity::Entity::delete_by_id(item.id)
            .exec(self.txn()?)
            .await?;

        self.affected += result.rows_affected;
        Ok(())
    }

    async fn commit(&mut self) -> TaskResult<u64> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| TaskError::Internal("unit of work already committed".to_string()))?;
        txn.commit().await?;

        tracing::debug!(affected = self.affected, "Committed task changes");
        Ok(std::mem::take(&mut self.affected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i32, title: &str, is_completed: bool) -> entity::Model {
        entity::Model {
            id,
            title: title.to_string(),
            description: None,
            is_completed,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, id as u32)
                .unwrap()
                .into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(3, "Design database schema", true)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let item = repo.get_by_id(3).await.unwrap().unwrap();
        assert_eq!(item.id, 3);
        assert_eq!(item.title, "Design database schema");
        assert!(item.is_completed);
    }

    #[tokio::test]
    async fn test_get_by_id_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        assert!(repo.get_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_store_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(2, "b", false), model(1, "a", false)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let items = repo.list(Some(false)).await.unwrap();
        let ids: Vec<i32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_unit_of_work_insert_and_commit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(8, "Write unit tests", false)]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let mut uow = repo.begin().await.unwrap();
        let created = uow
            .insert(NewTaskItem {
                title: "Write unit tests".to_string(),
                description: None,
                is_completed: false,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 8);

        assert_eq!(uow.commit().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unit_of_work_remove_counts_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let mut uow = repo.begin().await.unwrap();
        let item: TaskItem = model(5, "Write unit tests", false).into();
        uow.remove(item).await.unwrap();

        assert_eq!(uow.commit().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unit_of_work_rejects_second_commit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PgTaskRepository::new(db);

        let mut uow = repo.begin().await.unwrap();
        assert_eq!(uow.commit().await.unwrap(), 0);
        assert!(matches!(uow.commit().await, Err(TaskError::Internal(_))));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        assert!(matches!(
            repo.list(None).await,
            Err(TaskError::Database(_))
        ));
    }
}
