use serde::{Deserialize, Serialize};

use crate::id::Id;

/// A department as stored and returned by the API.
///
/// Fields the caller never supplied stay `None` and are omitted from the JSON
/// output. `manager_id` and `employee_ids` are plain identifier strings; they
/// are neither validated nor kept in sync with the employee collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_ids: Option<Vec<String>>,
}

/// Partial field set accepted by create and update.
///
/// Serializing only emits the supplied fields, so the value doubles as a
/// MongoDB `$set` document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_ids: Option<Vec<String>>,
}

impl DepartmentInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none() && self.manager_id.is_none() && self.employee_ids.is_none()
    }

    /// Materialize a new record under `id`.
    pub fn into_department(self, id: Id) -> Department {
        Department {
            id,
            name: self.name,
            location: self.location,
            manager_id: self.manager_id,
            employee_ids: self.employee_ids,
        }
    }

    /// Merge-patch: overwrite only the supplied fields.
    pub fn apply_to(&self, department: &mut Department) {
        if let Some(name) = &self.name {
            department.name = Some(name.clone());
        }
        if let Some(location) = &self.location {
            department.location = Some(location.clone());
        }
        if let Some(manager_id) = &self.manager_id {
            department.manager_id = Some(manager_id.clone());
        }
        if let Some(employee_ids) = &self.employee_ids {
            department.employee_ids = Some(employee_ids.clone());
        }
    }
}

impl Department {
    pub fn has_employee(&self, employee_id: &str) -> bool {
        self.employee_ids.as_ref().is_some_and(|ids| ids.iter().any(|e| e == employee_id))
    }
}

/// Envelope of `GET /departments/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginatedDepartments {
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub data: Vec<Department>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub detail: String,
    pub employees_updated: u64,
}
