pub mod csv;
pub mod error;
pub mod i18n;
