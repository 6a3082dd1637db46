use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};
use validator::Validate;

use crate::cache::{CacheKey, TaskCache};
use crate::error::TaskResult;
use crate::models::{CreateTaskItem, TaskItemDto, UpdateTaskItem};
use crate::repository::TaskRepository;

/// Cache-aside service over a [`TaskRepository`].
///
/// Reads check the cache first and populate it on a miss. Writes go to the
/// repository and then invalidate the affected keys once the commit succeeds.
/// Cache failures degrade to store-only behaviour; repository failures propagate.
pub struct TaskService<R: TaskRepository + ?Sized> {
    repository: Arc<R>,
    cache: TaskCache,
}

impl<R: TaskRepository + ?Sized> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: self.cache.clone(),
        }
    }
}

impl<R: TaskRepository + ?Sized> TaskService<R> {
    pub fn new(repository: Arc<R>, cache: TaskCache) -> Self {
        Self { repository, cache }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// List tasks, newest first, optionally filtered by completion state
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, completed: Option<bool>) -> TaskResult<Vec<TaskItemDto>> {
        let key = CacheKey::task_list(completed);

        if let Some(items) = self.cache.get::<Vec<TaskItemDto>>(&key).await.into_hit() {
            return Ok(items);
        }

        let items: Vec<TaskItemDto> = self
            .repository
            .list(completed)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        // Empty results are cached too
        self.cache.set(&key, &items).await;
        Ok(items)
    }

    /// Get a task by ID. Absence is never cached.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: i32) -> TaskResult<Option<TaskItemDto>> {
        let key = CacheKey::task_item(id);

        if let Some(item) = self.cache.get::<TaskItemDto>(&key).await.into_hit() {
            return Ok(Some(item));
        }

        let Some(item) = self.repository.get_by_id(id).await? else {
            debug!("Task not in store");
            return Ok(None);
        };

        let dto = TaskItemDto::from(item);
        self.cache.set(&key, &dto).await;
        Ok(Some(dto))
    }

    /// Create a task. Only the unfiltered list key is invalidated.
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: CreateTaskItem) -> TaskResult<TaskItemDto> {
        input.validate()?;

        let mut uow = self.repository.begin().await?;
        let created = uow.insert(input.into_new(Utc::now())).await?;
        uow.commit().await?;

        self.cache.remove(&CacheKey::task_list(None)).await;
        Ok(created.into())
    }

    /// Replace a task's mutable fields. Returns `false` when the task does not exist.
    #[instrument(skip(self, input), fields(task_id = %id))]
    pub async fn update_task(&self, id: i32, input: UpdateTaskItem) -> TaskResult<bool> {
        input.validate()?;

        let mut uow = self.repository.begin().await?;
        let Some(mut item) = uow.get_by_id(id).await? else {
            return Ok(false);
        };

        item.apply_update(input);
        uow.update(item).await?;
        uow.commit().await?;

        self.cache.invalidate(&CacheKey::write_invalidation(id)).await;
        Ok(true)
    }

    /// Delete a task. Returns `false` when the task does not exist.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: i32) -> TaskResult<bool> {
        let mut uow = self.repository.begin().await?;
        let Some(item) = uow.get_by_id(id).await? else {
            return Ok(false);
        };

        uow.remove(item).await?;
        uow.commit().await?;

        self.cache.invalidate(&CacheKey::write_invalidation(id)).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MockCacheStore};
    use crate::error::TaskError;
    use crate::models::TaskItem;
    use crate::repository::{MockTaskRepository, MockUnitOfWork};
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn task(id: i32, title: &str) -> TaskItem {
        TaskItem {
            id,
            title: title.to_string(),
            description: Some("desc".to_string()),
            is_completed: false,
            created_at: Utc::now(),
        }
    }

    fn service(repo: MockTaskRepository, store: MockCacheStore) -> TaskService<MockTaskRepository> {
        TaskService::new(Arc::new(repo), TaskCache::with_default_ttl(Arc::new(store)))
    }

    fn expect_removals(store: &mut MockCacheStore, keys: &[&'static str]) {
        let mut seq = Sequence::new();
        for key in keys {
            store
                .expect_remove()
                .with(eq(*key))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }
    }

    #[tokio::test]
    async fn test_list_cache_hit_skips_store() {
        let dto = TaskItemDto::from(task(1, "Cached"));
        let payload = serde_json::to_vec(&vec![dto.clone()]).unwrap();

        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .with(eq("TaskItems_True"))
            .returning(move |_| Ok(Some(payload.clone())));

        let mut repo = MockTaskRepository::new();
        repo.expect_list().never();

        let items = service(repo, store).list_tasks(Some(true)).await.unwrap();
        assert_eq!(items, vec![dto]);
    }

    #[tokio::test]
    async fn test_list_miss_caches_empty_result() {
        let mut store = MockCacheStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, value, _| key == "TaskItems_" && value == b"[]")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut repo = MockTaskRepository::new();
        repo.expect_list()
            .with(eq(None))
            .times(1)
            .returning(|_| Ok(vec![]));

        let items = service(repo, store).list_tasks(None).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_list_cache_failures_fall_through_to_store() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .returning(|_| Err(CacheError::Backend("down".into())));
        store
            .expect_set()
            .returning(|_, _, _| Err(CacheError::Backend("down".into())));

        let mut repo = MockTaskRepository::new();
        repo.expect_list()
            .with(eq(Some(false)))
            .times(1)
            .returning(|_| Ok(vec![task(2, "Open")]));

        let items = service(repo, store).list_tasks(Some(false)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[tokio::test]
    async fn test_corrupt_cached_item_is_a_miss() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .with(eq("taskItem_5"))
            .returning(|_| Ok(Some(b"{broken".to_vec())));
        store.expect_set().times(1).returning(|_, _, _| Ok(()));

        let mut repo = MockTaskRepository::new();
        repo.expect_get_by_id()
            .with(eq(5))
            .times(1)
            .returning(|id| Ok(Some(task(id, "Fresh"))));

        let item = service(repo, store).get_task(5).await.unwrap().unwrap();
        assert_eq!(item.title, "Fresh");
    }

    #[tokio::test]
    async fn test_get_absent_is_not_cached() {
        let mut store = MockCacheStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().never();

        let mut repo = MockTaskRepository::new();
        repo.expect_get_by_id().times(2).returning(|_| Ok(None));

        let service = service(repo, store);
        assert!(service.get_task(42).await.unwrap().is_none());
        assert!(service.get_task(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_store_failure_propagates() {
        let mut store = MockCacheStore::new();
        store.expect_get().returning(|_| Ok(None));

        let mut repo = MockTaskRepository::new();
        repo.expect_get_by_id()
            .returning(|_| Err(TaskError::Database(sea_orm::DbErr::Custom("gone".into()))));

        let result = service(repo, store).get_task(1).await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_invalidates_only_unfiltered_list() {
        let mut store = MockCacheStore::new();
        expect_removals(&mut store, &["TaskItems_"]);

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().times(1).returning(|| {
            let mut uow = MockUnitOfWork::new();
            let mut seq = Sequence::new();
            uow.expect_insert()
                .withf(|new| new.title == "Write docs" && new.is_completed)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|new| {
                    Ok(TaskItem {
                        id: 8,
                        title: new.title,
                        description: new.description,
                        is_completed: new.is_completed,
                        created_at: new.created_at,
                    })
                });
            uow.expect_commit()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|| Ok(1));
            Ok(Box::new(uow))
        });

        let before = Utc::now();
        let created = service(repo, store)
            .create_task(CreateTaskItem::new("Write docs").completed(true))
            .await
            .unwrap();

        assert_eq!(created.id, 8);
        assert!(created.is_completed);
        assert!(created.created_at >= before);
    }

    #[tokio::test]
    async fn test_create_commit_failure_leaves_cache_untouched() {
        let mut store = MockCacheStore::new();
        store.expect_remove().never();

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_insert().returning(|new| {
                Ok(TaskItem {
                    id: 1,
                    title: new.title,
                    description: new.description,
                    is_completed: new.is_completed,
                    created_at: new.created_at,
                })
            });
            uow.expect_commit()
                .returning(|| Err(TaskError::Database(sea_orm::DbErr::Custom("commit".into()))));
            Ok(Box::new(uow))
        });

        let result = service(repo, store)
            .create_task(CreateTaskItem::new("t"))
            .await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let mut repo = MockTaskRepository::new();
        repo.expect_begin().never();

        let result = service(repo, MockCacheStore::new())
            .create_task(CreateTaskItem::new("x".repeat(71)))
            .await;
        assert!(matches!(result, Err(TaskError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_overwrites_and_invalidates_all_keys() {
        let mut store = MockCacheStore::new();
        expect_removals(
            &mut store,
            &["taskItem_2", "TaskItems_True", "TaskItems_False", "TaskItems_"],
        );

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().times(1).returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id()
                .with(eq(2))
                .returning(|id| Ok(Some(task(id, "Old"))));
            uow.expect_update()
                .withf(|item| item.id == 2 && item.title == "Updated" && item.description.is_none())
                .times(1)
                .returning(Ok);
            uow.expect_commit().times(1).returning(|| Ok(1));
            Ok(Box::new(uow))
        });

        let updated = service(repo, store)
            .update_task(2, UpdateTaskItem::new("Updated"))
            .await
            .unwrap();
        assert!(updated);
    }

    #[tokio::test]
    async fn test_update_missing_returns_false_without_invalidation() {
        let mut store = MockCacheStore::new();
        store.expect_remove().never();

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id().returning(|_| Ok(None));
            uow.expect_update().never();
            uow.expect_commit().never();
            Ok(Box::new(uow))
        });

        let updated = service(repo, store)
            .update_task(999, UpdateTaskItem::new("Updated"))
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_update_commit_failure_leaves_cache_untouched() {
        let mut store = MockCacheStore::new();
        store.expect_remove().never();

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id()
                .returning(|id| Ok(Some(task(id, "Old"))));
            uow.expect_update().returning(Ok);
            uow.expect_commit()
                .returning(|| Err(TaskError::Database(sea_orm::DbErr::Custom("commit".into()))));
            Ok(Box::new(uow))
        });

        let result = service(repo, store)
            .update_task(2, UpdateTaskItem::new("Updated"))
            .await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_and_invalidates_all_keys() {
        let mut store = MockCacheStore::new();
        expect_removals(
            &mut store,
            &["taskItem_3", "TaskItems_True", "TaskItems_False", "TaskItems_"],
        );

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id()
                .with(eq(3))
                .returning(|id| Ok(Some(task(id, "Doomed"))));
            uow.expect_remove()
                .withf(|item| item.id == 3)
                .times(1)
                .returning(|_| Ok(()));
            uow.expect_commit().times(1).returning(|| Ok(1));
            Ok(Box::new(uow))
        });

        assert!(service(repo, store).delete_task(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_commit_failure_leaves_cache_untouched() {
        let mut store = MockCacheStore::new();
        store.expect_remove().never();

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id()
                .returning(|id| Ok(Some(task(id, "Doomed"))));
            uow.expect_remove().returning(|_| Ok(()));
            uow.expect_commit()
                .returning(|| Err(TaskError::Database(sea_orm::DbErr::Custom("commit".into()))));
            Ok(Box::new(uow))
        });

        let result = service(repo, store).delete_task(3).await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let mut store = MockCacheStore::new();
        store.expect_remove().never();

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id().returning(|_| Ok(None));
            uow.expect_remove().never();
            Ok(Box::new(uow))
        });

        assert!(!service(repo, store).delete_task(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidation_failure_does_not_fail_delete() {
        let mut store = MockCacheStore::new();
        store
            .expect_remove()
            .times(4)
            .returning(|_| Err(CacheError::Backend("down".into())));

        let mut repo = MockTaskRepository::new();
        repo.expect_begin().returning(|| {
            let mut uow = MockUnitOfWork::new();
            uow.expect_get_by_id().returning(|id| Ok(Some(task(id, "x"))));
            uow.expect_remove().returning(|_| Ok(()));
            uow.expect_commit().returning(|| Ok(1));
            Ok(Box::new(uow))
        });

        assert!(service(repo, store).delete_task(1).await.unwrap());
    }
}
