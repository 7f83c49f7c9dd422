pub mod pg;
pub mod rds;
