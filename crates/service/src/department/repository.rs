use async_trait::async_trait;
use models::{BenefitRecord, Department, DepartmentInput, EmployeeRecord, Id};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Store access for the departments resource.
///
/// One method per store round trip; the service composes them. Methods named
/// `find_all_*` are intentionally unbounded, a paged variant belongs next to
/// them rather than in place of them.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Insert only the supplied fields and return the generated identifier.
    async fn insert(&self, input: &DepartmentInput) -> Result<Id, ServiceError>;
    async fn find_by_id(&self, id: &Id) -> Result<Option<Department>, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
    /// Natural store order, windowed.
    async fn list(&self, page: Pagination) -> Result<Vec<Department>, ServiceError>;
    /// Merge the supplied fields; `false` when no record matched.
    async fn update(&self, id: &Id, input: &DepartmentInput) -> Result<bool, ServiceError>;
    /// `false` when no record matched.
    async fn delete(&self, id: &Id) -> Result<bool, ServiceError>;
    /// Null out `department_id` on every employee still pointing at
    /// `department_id`; returns how many were modified.
    async fn clear_employee_department(&self, department_id: &str) -> Result<u64, ServiceError>;
    /// Case-insensitive literal substring match on `name`.
    async fn find_by_name(&self, name: &str, page: Pagination) -> Result<Vec<Department>, ServiceError>;
    async fn find_all_by_manager(&self, manager_id: &str) -> Result<Vec<Department>, ServiceError>;
    async fn find_all_by_employee(&self, employee_id: &str) -> Result<Vec<Department>, ServiceError>;
    async fn find_all(&self) -> Result<Vec<Department>, ServiceError>;
    async fn find_employees_by_department(&self, department_id: &str) -> Result<Vec<EmployeeRecord>, ServiceError>;
    async fn find_benefits_by_ids(&self, ids: &[Id]) -> Result<Vec<BenefitRecord>, ServiceError>;
}
