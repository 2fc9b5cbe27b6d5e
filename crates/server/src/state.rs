use std::sync::Arc;

use service::department::{DepartmentRepository, DepartmentService};

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub departments: DepartmentService,
}

impl AppState {
    pub fn new(repo: Arc<dyn DepartmentRepository>) -> Self {
        Self { departments: DepartmentService::new(repo) }
    }
}
