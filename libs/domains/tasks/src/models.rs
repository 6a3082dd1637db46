use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Persisted task record
#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TaskItem {
    /// Overwrite every mutable field from `input`. `id` and `created_at` are kept.
    pub fn apply_update(&mut self, input: UpdateTaskItem) {
        self.title = input.title;
        self.description = input.description;
        self.is_completed = input.is_completed;
    }
}

/// Task as returned by the API and stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskItemDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Write unit tests")]
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TaskItem> for TaskItemDto {
    fn from(item: TaskItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            is_completed: item.is_completed,
            created_at: item.created_at,
        }
    }
}

/// Payload for creating a task. Updates use the same shape and replace every field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskItem {
    #[validate(
        length(min = 1, max = 70, message = "Task Title must be between 1 and 70 characters"),
        custom(function = "not_blank")
    )]
    #[schema(example = "Write unit tests", min_length = 1, max_length = 70)]
    pub title: String,

    #[validate(length(max = 250, message = "Task Description is too long"))]
    #[schema(max_length = 250)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_completed: bool,
}

pub type UpdateTaskItem = CreateTaskItem;

impl CreateTaskItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Stamp the creation time, producing the record handed to the store.
    pub fn into_new(self, created_at: DateTime<Utc>) -> NewTaskItem {
        NewTaskItem {
            title: self.title,
            description: self.description,
            is_completed: self.is_completed,
            created_at,
        }
    }
}

fn not_blank(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Task Title is required".into());
        return Err(err);
    }
    Ok(())
}

/// Task about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskItem {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Query string for listing tasks
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Only completed (`true`) or open (`false`) tasks; all when omitted
    pub completed: Option<bool>,
}
