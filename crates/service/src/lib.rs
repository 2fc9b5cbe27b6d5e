//! Service layer for the departments resource.
//! - `department::DepartmentService` holds the business rules.
//! - `department::DepartmentRepository` is the storage seam, backed by MongoDB
//!   in production and by an in-process store in tests and local runs.

pub mod errors;
pub mod pagination;
pub mod department;
#[cfg(test)]
pub mod test_support;
