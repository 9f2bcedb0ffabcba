pub mod auth;
pub mod budget_service;
pub mod dashboard_service;
pub mod defect_service;
pub mod material_service;
pub mod project_service;
pub mod report_service;
pub mod storage;
pub mod task_service;
