pub mod json_file;

pub mod user_repo;
pub use user_repo::UserRepository;

pub mod defect_store;
pub use defect_store::DefectStore;
pub mod defect_repo;
pub use defect_repo::PgDefectRepository;
pub mod local_defect_store;
pub use local_defect_store::LocalDefectStore;
pub mod defect_outbox;
pub use defect_outbox::DefectOutbox;

pub mod budget_repo;
pub use budget_repo::BudgetRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod material_repo;
pub use material_repo::MaterialRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
