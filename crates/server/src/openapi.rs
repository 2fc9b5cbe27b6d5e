use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Department as returned by the API; unset fields are omitted.
#[derive(ToSchema)]
pub struct DepartmentDoc {
    /// 24 character hex identifier
    pub id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager_id: Option<String>,
    pub employee_ids: Option<Vec<String>>,
}

/// Partial field set for create and update.
#[derive(ToSchema)]
pub struct DepartmentInputDoc {
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager_id: Option<String>,
    pub employee_ids: Option<Vec<String>>,
}

#[derive(ToSchema)]
pub struct PaginatedDepartmentsDoc {
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub data: Vec<DepartmentDoc>,
}

#[derive(ToSchema)]
pub struct CountDoc { pub count: u64 }

#[derive(ToSchema)]
pub struct DeleteDoc { pub detail: String, pub employees_updated: u64 }

/// Employee document with every stored field plus resolved `benefits`.
#[derive(ToSchema)]
pub struct EmployeeWithBenefitsDoc {
    pub id: String,
    pub department_id: Option<String>,
    pub benefits_id: Option<Vec<String>>,
    #[schema(value_type = Vec<Object>)]
    pub benefits: Vec<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct DepartmentFullInfoDoc {
    pub department_id: String,
    pub department_name: Option<String>,
    pub location: Option<String>,
    pub employees: Vec<EmployeeWithBenefitsDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::departments::create,
        crate::routes::departments::list,
        crate::routes::departments::count,
        crate::routes::departments::update,
        crate::routes::departments::delete,
        crate::routes::departments::get_by_name,
        crate::routes::departments::get_by_manager,
        crate::routes::departments::get_by_employee,
        crate::routes::departments::full_info,
        crate::routes::departments::get_one,
    ),
    components(
        schemas(
            HealthResponse,
            DepartmentDoc,
            DepartmentInputDoc,
            PaginatedDepartmentsDoc,
            CountDoc,
            DeleteDoc,
            EmployeeWithBenefitsDoc,
            DepartmentFullInfoDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "departments")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_department_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/departments/",
            "/departments/count",
            "/departments/{id}",
            "/departments/get_by_name",
            "/departments/get_department_by_manager",
            "/departments/get_by_employee/{employee_id}",
            "/departments/departments/full_info",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
