use std::sync::Arc;

use models::{
    CountResponse, DeleteResponse, Department, DepartmentFullInfo, DepartmentInput, EmployeeWithBenefits, Id,
    PaginatedDepartments,
};
use tracing::{debug, error, info, instrument, warn};

use super::repository::DepartmentRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

pub const DELETED_DETAIL: &str = "Department deleted successfully";

/// Application service for the departments resource.
///
/// Every operation is a short sequence of awaited repository calls with no
/// transaction around them. Store failures surface immediately, without retry.
#[derive(Clone)]
pub struct DepartmentService {
    repo: Arc<dyn DepartmentRepository>,
}

fn parse_id(raw: &str) -> Result<Id, ServiceError> {
    Id::parse(raw).map_err(|e| {
        warn!(id = %raw, "invalid department id");
        ServiceError::from(e)
    })
}

fn log_failure(op: &'static str) -> impl Fn(&ServiceError) {
    move |e: &ServiceError| error!(op, error = %e, "department operation failed")
}

impl DepartmentService {
    pub fn new(repo: Arc<dyn DepartmentRepository>) -> Self { Self { repo } }

    /// Insert the supplied fields and return the stored record.
    #[instrument(skip(self))]
    pub async fn create(&self, input: DepartmentInput) -> Result<Department, ServiceError> {
        debug!("creating department");
        let id = self.repo.insert(&input).await.inspect_err(log_failure("create"))?;
        match self.repo.find_by_id(&id).await.inspect_err(log_failure("create"))? {
            Some(created) => {
                info!(id = %created.id, "department created");
                Ok(created)
            }
            None => {
                error!(id = %id, "department missing right after insert");
                Err(ServiceError::Internal(format!("department {} missing after insert", id)))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: Pagination) -> Result<PaginatedDepartments, ServiceError> {
        let total = self.repo.count().await.inspect_err(log_failure("list"))?;
        let data = self.repo.list(page).await.inspect_err(log_failure("list"))?;
        info!(total, returned = data.len(), "listed departments");
        Ok(PaginatedDepartments { total, skip: page.skip, limit: page.limit, data })
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<CountResponse, ServiceError> {
        let count = self.repo.count().await.inspect_err(log_failure("count"))?;
        info!(count, "counted departments");
        Ok(CountResponse { count })
    }

    /// Merge-patch update. An empty field set only checks existence.
    #[instrument(skip(self))]
    pub async fn update(&self, raw_id: &str, input: DepartmentInput) -> Result<Department, ServiceError> {
        let id = parse_id(raw_id)?;
        if !input.is_empty() {
            let matched = self.repo.update(&id, &input).await.inspect_err(log_failure("update"))?;
            if !matched {
                warn!(id = %id, "department not found for update");
                return Err(ServiceError::not_found("department"));
            }
        }
        match self.repo.find_by_id(&id).await.inspect_err(log_failure("update"))? {
            Some(updated) => {
                info!(id = %id, "department updated");
                Ok(updated)
            }
            None => {
                warn!(id = %id, "department not found for update");
                Err(ServiceError::not_found("department"))
            }
        }
    }

    /// Detach employees, then remove the department.
    ///
    /// The two steps are independent writes: if the department turns out not
    /// to exist the employee update is not rolled back. Re-running the delete
    /// is harmless because the fan-out only matches employees still pointing
    /// at this department.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<DeleteResponse, ServiceError> {
        let id = parse_id(raw_id)?;
        let key = id.to_string();

        let employees_updated = self.repo.clear_employee_department(&key).await.inspect_err(log_failure("delete"))?;
        info!(id = %id, employees_updated, "cleared department reference on employees");

        if !self.repo.delete(&id).await.inspect_err(log_failure("delete"))? {
            warn!(id = %id, "department not found for delete");
            return Err(ServiceError::not_found("department"));
        }
        info!(id = %id, "department deleted");
        Ok(DeleteResponse { detail: DELETED_DETAIL.to_string(), employees_updated })
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str, page: Pagination) -> Result<Vec<Department>, ServiceError> {
        let found = self.repo.find_by_name(name, page).await.inspect_err(log_failure("find_by_name"))?;
        info!(count = found.len(), "departments matched by name");
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn find_by_manager(&self, manager_id: &str) -> Result<Vec<Department>, ServiceError> {
        let found = self
            .repo
            .find_all_by_manager(manager_id)
            .await
            .inspect_err(log_failure("find_by_manager"))?;
        info!(count = found.len(), "departments matched by manager");
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn find_by_employee(&self, employee_id: &str) -> Result<Vec<Department>, ServiceError> {
        let found = self
            .repo
            .find_all_by_employee(employee_id)
            .await
            .inspect_err(log_failure("find_by_employee"))?;
        info!(count = found.len(), "departments matched by employee");
        Ok(found)
    }

    /// Every department with its employees and their resolved benefits.
    ///
    /// One employee query per department and one benefit query per employee.
    /// Benefit references that are malformed or point nowhere are dropped.
    #[instrument(skip(self))]
    pub async fn full_info(&self) -> Result<Vec<DepartmentFullInfo>, ServiceError> {
        let departments = self.repo.find_all().await.inspect_err(log_failure("full_info"))?;
        let mut out = Vec::with_capacity(departments.len());

        for dep in departments {
            let employees = self
                .repo
                .find_employees_by_department(&dep.id.to_string())
                .await
                .inspect_err(log_failure("full_info"))?;

            let mut enriched = Vec::with_capacity(employees.len());
            for employee in employees {
                let ids = employee.parsed_benefit_ids();
                let benefits = if ids.is_empty() {
                    Vec::new()
                } else {
                    self.repo.find_benefits_by_ids(&ids).await.inspect_err(log_failure("full_info"))?
                };
                let referenced = employee.benefits_id.as_ref().map_or(0, Vec::len);
                if benefits.len() < referenced {
                    debug!(employee = %employee.id, referenced, resolved = benefits.len(), "unresolved benefit references dropped");
                }
                enriched.push(EmployeeWithBenefits::new(employee, benefits));
            }

            out.push(DepartmentFullInfo {
                department_id: dep.id,
                department_name: dep.name,
                location: dep.location,
                employees: enriched,
            });
        }

        info!(departments = out.len(), "built department full info");
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<Department, ServiceError> {
        let id = parse_id(raw_id)?;
        debug!(id = %id, "fetching department");
        match self.repo.find_by_id(&id).await.inspect_err(log_failure("get"))? {
            Some(dep) => Ok(dep),
            None => {
                warn!(id = %id, "department not found");
                Err(ServiceError::not_found("department"))
            }
        }
    }
}
