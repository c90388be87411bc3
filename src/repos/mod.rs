pub mod error;
pub mod scratch_repo;
