pub mod auth;
pub mod budget;
pub mod dashboard;
pub mod defects;
pub mod materials;
pub mod projects;
pub mod reports;
pub mod tasks;
