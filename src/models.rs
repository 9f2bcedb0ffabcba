pub mod auth;
pub mod budget;
pub mod dashboard;
pub mod defect;
pub mod material;
pub mod project;
pub mod rbac;
pub mod report;
pub mod task;
