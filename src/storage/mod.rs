mod repository;

pub use repository::*;

/// SQL migration for the ledger and master-data schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQL migration for payroll records
pub const MIGRATION_002_PAYROLL: &str = include_str!("migrations/002_payroll.sql");
