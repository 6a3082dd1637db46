use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{NewTaskItem, TaskItem};

/// Sea-ORM Entity for the task_items table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(70))")]
    pub title: String,
    #[sea_orm(column_type = "String(StringLen::N(250))", nullable)]
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TaskItem {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            is_completed: model.is_completed,
            created_at: model.created_at.into(),
        }
    }
}

impl From<NewTaskItem> for ActiveModel {
    fn from(input: NewTaskItem) -> Self {
        ActiveModel {
            id: NotSet,
            title: Set(input.title),
            description: Set(input.description),
            is_completed: Set(input.is_completed),
            created_at: Set(input.created_at.into()),
        }
    }
}

/// Full-row update; `created_at` is left untouched.
impl From<TaskItem> for ActiveModel {
    fn from(item: TaskItem) -> Self {
        ActiveModel {
            id: Set(item.id),
            title: Set(item.title),
            description: Set(item.description),
            is_completed: Set(item.is_completed),
            created_at: NotSet,
        }
    }
}
