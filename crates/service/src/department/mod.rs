pub mod repository;
pub mod mongo;
pub mod memory;
pub mod service;

pub use memory::MemoryDepartmentRepository;
pub use mongo::MongoDepartmentRepository;
pub use repository::DepartmentRepository;
pub use service::DepartmentService;
