use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::{TaskError, TaskResult},
    models::{NewTaskItem, TaskItem},
    repository::{TaskRepository, UnitOfWork},
};

#[derive(Debug)]
struct State {
    items: BTreeMap<i32, TaskItem>,
    next_id: i32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Process-local task store.
///
/// Ids come from a sequence starting at 1 that is consumed when an insert is
/// staged, so a discarded unit of work leaves a gap like a database sequence.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the sample tasks shipped in the seed migration.
    pub fn with_sample_data() -> Self {
        let created_at = sample_created_at();
        let items: BTreeMap<i32, TaskItem> = SAMPLE_TASKS
            .iter()
            .enumerate()
            .map(|(idx, (title, description, is_completed))| {
                let id = idx as i32 + 1;
                let item = TaskItem {
                    id,
                    title: (*title).to_string(),
                    description: Some((*description).to_string()),
                    is_completed: *is_completed,
                    created_at,
                };
                (id, item)
            })
            .collect();

        let next_id = items.len() as i32 + 1;
        Self {
            state: Arc::new(RwLock::new(State { items, next_id })),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }
}

const SAMPLE_TASKS: [(&str, &str, bool); 7] = [
    (
        "Complete project documentation",
        "Finalize and submit the project documentation by end of the week.",
        true,
    ),
    (
        "Implement user authentication",
        "Set up JWT authentication for the API.",
        false,
    ),
    (
        "Design database schema",
        "Create the initial database schema using EF Core.",
        true,
    ),
    (
        "Set up CI/CD pipeline",
        "Configure GitHub Actions for automated testing and deployment.",
        false,
    ),
    (
        "Write unit tests",
        "Implement unit tests for the service layer.",
        false,
    ),
    (
        "Create API documentation",
        "Generate API documentation using Swagger.",
        true,
    ),
    (
        "Deploy to production",
        "Deploy the application to the production environment.",
        false,
    ),
];

fn sample_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn get_by_id(&self, id: i32) -> TaskResult<Option<TaskItem>> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn list(&self, completed: Option<bool>) -> TaskResult<Vec<TaskItem>> {
        let state = self.state.read().await;
        let mut items: Vec<TaskItem> = state
            .items
            .values()
            .filter(|item| completed.is_none_or(|c| item.is_completed == c))
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn begin(&self) -> TaskResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
            committed: false,
        }))
    }

    async fn ping(&self) -> TaskResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
enum Change {
    Insert(TaskItem),
    Update(TaskItem),
    Remove(i32),
}

struct InMemoryUnitOfWork {
    state: Arc<RwLock<State>>,
    staged: Vec<Change>,
    committed: bool,
}

impl InMemoryUnitOfWork {
    fn ensure_open(&self) -> TaskResult<()> {
        if self.committed {
            return Err(TaskError::Internal(
                "unit of work already committed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn get_by_id(&mut self, id: i32) -> TaskResult<Option<TaskItem>> {
        self.ensure_open()?;

        // Staged changes shadow the committed state
        let mut current = self.state.read().await.items.get(&id).cloned();
        for change in &self.staged {
            match change {
                Change::Insert(item) | Change::Update(item) if item.id == id => {
                    current = Some(item.clone());
                }
                Change::Remove(removed) if *removed == id => current = None,
                _ => {}
            }
        }
        Ok(current)
    }

    async fn insert(&mut self, item: NewTaskItem) -> TaskResult<TaskItem> {
        self.ensure_open()?;

        let id = {
            let mut state = self.state.write().await;
            let id = state.next_id;
            state.next_id += 1;
            id
        };

        let item = TaskItem {
            id,
            title: item.title,
            description: item.description,
            is_completed: item.is_completed,
            created_at: item.created_at,
        };
        self.staged.push(Change::Insert(item.clone()));
        Ok(item)
    }

    async fn update(&mut self, item: TaskItem) -> TaskResult<TaskItem> {
        self.ensure_open()?;
        self.staged.push(Change::Update(item.clone()));
        Ok(item)
    }

    async fn remove(&mut self, item: TaskItem) -> TaskResult<()> {
        self.ensure_open()?;
        self.staged.push(Change::Remove(item.id));
        Ok(())
    }

    async fn commit(&mut self) -> TaskResult<u64> {
        self.ensure_open()?;

        let mut state = self.state.write().await;
        let mut affected = 0;

        for change in self.staged.drain(..) {
            match change {
                Change::Insert(item) => {
                    state.items.insert(item.id, item);
                    affected += 1;
                }
                Change::Update(item) => {
                    if let Some(existing) = state.items.get_mut(&item.id) {
                        *existing = item;
                        affected += 1;
                    }
                }
                Change::Remove(id) => {
                    if state.items.remove(&id).is_some() {
                        affected += 1;
                    }
                }
            }
        }

        self.committed = true;
        tracing::debug!(affected, "Committed task changes");
        Ok(affected)
    }
}
