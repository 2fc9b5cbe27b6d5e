use std::sync::Arc;

use async_trait::async_trait;
use models::{BenefitRecord, Department, DepartmentInput, EmployeeRecord, ExternalId, Id};
use tokio::sync::RwLock;

use super::repository::DepartmentRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

#[derive(Default)]
struct Collections {
    departments: Vec<Department>,
    employees: Vec<EmployeeRecord>,
    benefits: Vec<BenefitRecord>,
}

/// In-process store holding the three collections.
///
/// Insertion order is the natural iteration order, like an unsorted MongoDB
/// scan. Employees and benefits are seeded through the inherent methods since
/// the departments resource never creates them.
#[derive(Clone, Default)]
pub struct MemoryDepartmentRepository {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryDepartmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_employee(&self, employee: EmployeeRecord) {
        self.inner.write().await.employees.push(employee);
    }

    pub async fn insert_benefit(&self, benefit: BenefitRecord) {
        self.inner.write().await.benefits.push(benefit);
    }

    pub async fn employee(&self, id: &ExternalId) -> Option<EmployeeRecord> {
        self.inner.read().await.employees.iter().find(|e| &e.id == id).cloned()
    }

    async fn filter_departments<F>(&self, pred: F) -> Vec<Department>
    where
        F: Fn(&Department) -> bool,
    {
        let cols = self.inner.read().await;
        cols.departments.iter().filter(|d| pred(d)).cloned().collect()
    }
}

fn name_matches(department: &Department, needle_lower: &str) -> bool {
    department
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle_lower))
}

#[async_trait]
impl DepartmentRepository for MemoryDepartmentRepository {
    async fn insert(&self, input: &DepartmentInput) -> Result<Id, ServiceError> {
        let id = Id::new();
        self.inner.write().await.departments.push(input.clone().into_department(id));
        Ok(id)
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<Department>, ServiceError> {
        let cols = self.inner.read().await;
        Ok(cols.departments.iter().find(|d| &d.id == id).cloned())
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(self.inner.read().await.departments.len() as u64)
    }

    async fn list(&self, page: Pagination) -> Result<Vec<Department>, ServiceError> {
        let cols = self.inner.read().await;
        Ok(page.window(cols.departments.iter().cloned()))
    }

    async fn update(&self, id: &Id, input: &DepartmentInput) -> Result<bool, ServiceError> {
        let mut cols = self.inner.write().await;
        match cols.departments.iter_mut().find(|d| &d.id == id) {
            Some(dep) => {
                input.apply_to(dep);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &Id) -> Result<bool, ServiceError> {
        let mut cols = self.inner.write().await;
        let before = cols.departments.len();
        cols.departments.retain(|d| &d.id != id);
        Ok(cols.departments.len() != before)
    }

    async fn clear_employee_department(&self, department_id: &str) -> Result<u64, ServiceError> {
        let mut cols = self.inner.write().await;
        let mut modified = 0;
        for emp in cols.employees.iter_mut().filter(|e| e.department_id.as_deref() == Some(department_id)) {
            emp.department_id = None;
            modified += 1;
        }
        Ok(modified)
    }

    async fn find_by_name(&self, name: &str, page: Pagination) -> Result<Vec<Department>, ServiceError> {
        let needle = name.to_lowercase();
        let matches = self.filter_departments(|d| name_matches(d, &needle)).await;
        Ok(page.window(matches))
    }

    async fn find_all_by_manager(&self, manager_id: &str) -> Result<Vec<Department>, ServiceError> {
        Ok(self.filter_departments(|d| d.manager_id.as_deref() == Some(manager_id)).await)
    }

    async fn find_all_by_employee(&self, employee_id: &str) -> Result<Vec<Department>, ServiceError> {
        Ok(self.filter_departments(|d| d.has_employee(employee_id)).await)
    }

    async fn find_all(&self) -> Result<Vec<Department>, ServiceError> {
        Ok(self.inner.read().await.departments.clone())
    }

    async fn find_employees_by_department(&self, department_id: &str) -> Result<Vec<EmployeeRecord>, ServiceError> {
        let cols = self.inner.read().await;
        Ok(cols
            .employees
            .iter()
            .filter(|e| e.department_id.as_deref() == Some(department_id))
            .cloned()
            .collect())
    }

    async fn find_benefits_by_ids(&self, ids: &[Id]) -> Result<Vec<BenefitRecord>, ServiceError> {
        let cols = self.inner.read().await;
        Ok(cols.benefits.iter().filter(|b| ids.iter().any(|id| b.id == *id)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> DepartmentInput {
        DepartmentInput { name: Some(name.into()), ..Default::default() }
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() -> Result<(), anyhow::Error> {
        let repo = MemoryDepartmentRepository::new();
        for n in ["a", "b", "c", "d"] {
            repo.insert(&named(n)).await?;
        }
        let page = repo.list(Pagination::new(1, 2)).await?;
        let names: Vec<_> = page.iter().filter_map(|d| d.name.as_deref()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(repo.count().await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn name_search_is_case_insensitive_and_literal() -> Result<(), anyhow::Error> {
        let repo = MemoryDepartmentRepository::new();
        repo.insert(&named("Engineering")).await?;
        repo.insert(&named("R&D (Labs)")).await?;
        repo.insert(&DepartmentInput::default()).await?;

        assert_eq!(repo.find_by_name("ENGINE", Pagination::default()).await?.len(), 1);
        assert_eq!(repo.find_by_name("(labs", Pagination::default()).await?.len(), 1);
        assert_eq!(repo.find_by_name(".*", Pagination::default()).await?.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn clearing_employees_only_touches_matching_ones() -> Result<(), anyhow::Error> {
        let repo = MemoryDepartmentRepository::new();
        let a = EmployeeRecord::new(Id::new()).with_department("dep-1");
        let b = EmployeeRecord::new(Id::new()).with_department("dep-2");
        repo.insert_employee(a.clone()).await;
        repo.insert_employee(b.clone()).await;

        assert_eq!(repo.clear_employee_department("dep-1").await?, 1);
        assert_eq!(repo.clear_employee_department("dep-1").await?, 0);
        assert_eq!(repo.employee(&a.id).await.unwrap().department_id, None);
        assert_eq!(repo.employee(&b.id).await.unwrap().department_id.as_deref(), Some("dep-2"));
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_report_misses() -> Result<(), anyhow::Error> {
        let repo = MemoryDepartmentRepository::new();
        let missing = Id::new();
        assert!(!repo.update(&missing, &named("x")).await?);
        assert!(!repo.delete(&missing).await?);

        let id = repo.insert(&named("x")).await?;
        assert!(repo.delete(&id).await?);
        assert!(repo.find_by_id(&id).await?.is_none());
        Ok(())
    }
}
