// Database entities - SeaORM models
pub mod audit_log;
pub mod role;
pub mod user;
