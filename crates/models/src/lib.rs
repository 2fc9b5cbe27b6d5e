//! Domain types of the departments resource and the MongoDB connection helper.

pub mod errors;
pub mod db;
pub mod id;
pub mod department;
pub mod employee;

pub use department::{CountResponse, DeleteResponse, Department, DepartmentInput, PaginatedDepartments};
pub use employee::{BenefitRecord, DepartmentFullInfo, EmployeeRecord, EmployeeWithBenefits};
pub use id::{ExternalId, Id};
