pub mod audit_log;
pub mod guard;
pub mod ownership;
pub mod password;
pub mod roles;
pub mod token;
