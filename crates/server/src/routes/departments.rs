use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use models::{CountResponse, DeleteResponse, Department, DepartmentFullInfo, DepartmentInput, Id, PaginatedDepartments};
use serde::Deserialize;
use service::pagination::{Pagination, DEFAULT_LIMIT};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

fn default_limit() -> u64 { DEFAULT_LIMIT }

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl ListQuery {
    fn page(&self) -> Pagination { Pagination::new(self.skip, self.limit) }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    pub name: String,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ManagerQuery {
    pub manager_id: String,
}

/// Routes of the departments resource. The collection root answers with and
/// without the trailing slash.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/departments/", get(list).post(create))
        .route("/departments", get(list).post(create))
        .route("/departments/count", get(count))
        .route("/departments/get_by_name", get(get_by_name))
        .route("/departments/get_department_by_manager", get(get_by_manager))
        .route("/departments/get_by_employee/:employee_id", get(get_by_employee))
        .route("/departments/departments/full_info", get(full_info))
        .route("/departments/:id", get(get_one).put(update).delete(delete))
}

#[utoipa::path(
    post, path = "/departments/", tag = "departments",
    request_body = crate::openapi::DepartmentInputDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::DepartmentDoc),
        (status = 422, description = "Malformed body"),
        (status = 500, description = "Create Failed")
    )
)]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<DepartmentInput>) -> Result<Json<Department>, JsonApiError> {
    state
        .departments
        .create(input)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while creating department"))
}

#[utoipa::path(
    get, path = "/departments/", tag = "departments",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = crate::openapi::PaginatedDepartmentsDoc),
        (status = 400, description = "Malformed query"),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<PaginatedDepartments>, JsonApiError> {
    state
        .departments
        .list(q.page())
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while listing departments"))
}

#[utoipa::path(
    get, path = "/departments/count", tag = "departments",
    responses(
        (status = 200, description = "OK", body = crate::openapi::CountDoc),
        (status = 500, description = "Count Failed")
    )
)]
pub async fn count(State(state): State<AppState>) -> Result<Json<CountResponse>, JsonApiError> {
    state
        .departments
        .count()
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while counting departments"))
}

#[utoipa::path(
    put, path = "/departments/{id}", tag = "departments",
    params(("id" = String, Path, description = "Department ID")),
    request_body = crate::openapi::DepartmentInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::DepartmentDoc),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Malformed body"),
        (status = 500, description = "Update Failed")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<ApiJson<DepartmentInput>, JsonApiError>,
) -> Result<Json<Department>, JsonApiError> {
    const FAILED: &str = "Internal error while updating department";
    // an unparseable id is reported ahead of a malformed body
    let ApiJson(input) = match body {
        Ok(body) => body,
        Err(rejected) => {
            Id::parse(&id).map_err(|e| JsonApiError::from_service(e.into(), FAILED))?;
            return Err(rejected);
        }
    };
    state
        .departments
        .update(&id, input)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, FAILED))
}

#[utoipa::path(
    delete, path = "/departments/{id}", tag = "departments",
    params(("id" = String, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::DeleteDoc),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Delete Failed")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DeleteResponse>, JsonApiError> {
    state
        .departments
        .delete(&id)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while deleting department"))
}

#[utoipa::path(
    get, path = "/departments/get_by_name", tag = "departments",
    params(NameQuery),
    responses(
        (status = 200, description = "OK", body = [crate::openapi::DepartmentDoc]),
        (status = 400, description = "Missing or malformed query"),
        (status = 500, description = "Search Failed")
    )
)]
pub async fn get_by_name(State(state): State<AppState>, ApiQuery(q): ApiQuery<NameQuery>) -> Result<Json<Vec<Department>>, JsonApiError> {
    state
        .departments
        .find_by_name(&q.name, Pagination::new(q.skip, q.limit))
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while searching departments by name"))
}

#[utoipa::path(
    get, path = "/departments/get_department_by_manager", tag = "departments",
    params(ManagerQuery),
    responses(
        (status = 200, description = "OK", body = [crate::openapi::DepartmentDoc]),
        (status = 400, description = "Missing or malformed query"),
        (status = 500, description = "Search Failed")
    )
)]
pub async fn get_by_manager(State(state): State<AppState>, ApiQuery(q): ApiQuery<ManagerQuery>) -> Result<Json<Vec<Department>>, JsonApiError> {
    state
        .departments
        .find_by_manager(&q.manager_id)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while searching departments by manager"))
}

#[utoipa::path(
    get, path = "/departments/get_by_employee/{employee_id}", tag = "departments",
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "OK", body = [crate::openapi::DepartmentDoc]),
        (status = 500, description = "Search Failed")
    )
)]
pub async fn get_by_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Vec<Department>>, JsonApiError> {
    state
        .departments
        .find_by_employee(&employee_id)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while searching departments by employee"))
}

#[utoipa::path(
    get, path = "/departments/departments/full_info", tag = "departments",
    responses(
        (status = 200, description = "OK", body = [crate::openapi::DepartmentFullInfoDoc]),
        (status = 500, description = "Join Failed")
    )
)]
pub async fn full_info(State(state): State<AppState>) -> Result<Json<Vec<DepartmentFullInfo>>, JsonApiError> {
    state
        .departments
        .full_info()
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Error while fetching full department data"))
}

#[utoipa::path(
    get, path = "/departments/{id}", tag = "departments",
    params(("id" = String, Path, description = "Department ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::DepartmentDoc),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Fetch Failed")
    )
)]
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Department>, JsonApiError> {
    state
        .departments
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Internal error while fetching department"))
}
