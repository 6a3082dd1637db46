use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ErrorResponse, IdPath, QueryParams, ValidatedJson,
    errors::responses::{
        BadRequestInvalidIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, TooManyRequestsResponse,
    },
};
use std::sync::Arc;
use tracing::{info, trace, warn};
use utoipa::OpenApi;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTaskItem, ListTasksQuery, TaskItemDto};
use crate::repository::TaskRepository;
use crate::service::TaskService;

/// Mount point of [`router`] in the public API
pub const TASKS_PATH: &str = "/api/tasks";

const TAG: &str = "tasks";

/// OpenAPI documentation for Tasks API
#[derive(OpenApi)]
#[openapi(
    paths(list_tasks, create_task, get_task, update_task, delete_task),
    components(
        schemas(TaskItemDto, CreateTaskItem),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestInvalidIdResponse,
            TooManyRequestsResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Task management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the task router with all HTTP endpoints
pub fn router<R: TaskRepository + ?Sized + 'static>(service: TaskService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(shared_service)
}

fn location(id: i32) -> String {
    format!("{}/{}", TASKS_PATH, id)
}

/// List tasks, newest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListTasksQuery),
    responses(
        (status = 200, description = "List of tasks", body = Vec<TaskItemDto>),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 429, response = TooManyRequestsResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_tasks<R: TaskRepository + ?Sized>(
    State(service): State<Arc<TaskService<R>>>,
    QueryParams(query): QueryParams<ListTasksQuery>,
) -> TaskResult<Json<Vec<TaskItemDto>>> {
    trace!(completed = ?query.completed, "Get taskItems");

    let tasks = service.list_tasks(query.completed).await?;
    Ok(Json(tasks))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = TaskItemDto),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_task<R: TaskRepository + ?Sized>(
    State(service): State<Arc<TaskService<R>>>,
    IdPath(id): IdPath,
) -> TaskResult<Json<TaskItemDto>> {
    info!("Fetching taskItem with ID: {}", id);

    if id <= 0 {
        warn!("Invalid ID {} provided for fetching taskItem", id);
        return Err(TaskError::InvalidId(id));
    }

    match service.get_task(id).await? {
        Some(task) => Ok(Json(task)),
        None => {
            warn!("TaskItem with ID {} not found", id);
            Err(TaskError::NotFound(id))
        }
    }
}

/// Create a new task
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateTaskItem,
    responses(
        (status = 201, description = "Task created successfully", body = TaskItemDto,
            headers(("Location" = String, description = "URL of the created task"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_task<R: TaskRepository + ?Sized>(
    State(service): State<Arc<TaskService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateTaskItem>,
) -> TaskResult<impl IntoResponse> {
    trace!(title = %input.title, "Creating new taskItem");

    let task = service.create_task(input).await?;
    info!("Created new taskItem with ID: {}", task.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location(task.id))],
        Json(task),
    ))
}

/// Replace a task's fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = CreateTaskItem,
    responses(
        (status = 204, description = "Task updated successfully"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_task<R: TaskRepository + ?Sized>(
    State(service): State<Arc<TaskService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<CreateTaskItem>,
) -> TaskResult<StatusCode> {
    trace!("Updating taskItem with ID: {}", id);

    if !service.update_task(id, input).await? {
        warn!("TaskItem with ID {} not found for update", id);
        return Err(TaskError::NotFound(id));
    }

    info!("Updated taskItem with ID: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_task<R: TaskRepository + ?Sized>(
    State(service): State<Arc<TaskService<R>>>,
    IdPath(id): IdPath,
) -> TaskResult<StatusCode> {
    trace!("Deleting taskItem with ID: {}", id);

    if id <= 0 {
        warn!("Invalid ID {} for deletion", id);
        return Err(TaskError::InvalidId(id));
    }

    if !service.delete_task(id).await? {
        warn!("TaskItem with ID {} not found for deletion", id);
        return Err(TaskError::NotFound(id));
    }

    info!("Deleted taskItem with ID: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
