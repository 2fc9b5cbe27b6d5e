use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::{ExternalId, Id};

/// Employee document as read from the employee collection, which another
/// service owns. Only the fields the departments resource relies on are
/// typed; everything else rides along in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: ExternalId,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits_id: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmployeeRecord {
    pub fn new(id: impl Into<ExternalId>) -> Self {
        Self { id: id.into(), department_id: None, benefits_id: None, extra: Map::new() }
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    pub fn with_benefits<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.benefits_id = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Benefit references that parse as identifiers; malformed ones are dropped.
    pub fn parsed_benefit_ids(&self) -> Vec<Id> {
        self.benefits_id
            .iter()
            .flatten()
            .filter_map(|raw| Id::parse(raw).ok())
            .collect()
    }
}

/// Benefit document from the benefit collection; only `id` is interpreted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenefitRecord {
    pub id: ExternalId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BenefitRecord {
    pub fn new(id: impl Into<ExternalId>) -> Self {
        Self { id: id.into(), extra: Map::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// An employee with `benefits` holding the resolved benefit records. A
/// `benefits` field already stored on the employee is replaced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmployeeWithBenefits {
    #[serde(flatten)]
    pub employee: EmployeeRecord,
    pub benefits: Vec<BenefitRecord>,
}

impl EmployeeWithBenefits {
    pub fn new(mut employee: EmployeeRecord, benefits: Vec<BenefitRecord>) -> Self {
        employee.extra.remove("benefits");
        Self { employee, benefits }
    }
}

/// One entry of `GET /departments/departments/full_info`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepartmentFullInfo {
    pub department_id: Id,
    pub department_name: Option<String>,
    pub location: Option<String>,
    pub employees: Vec<EmployeeWithBenefits>,
}
