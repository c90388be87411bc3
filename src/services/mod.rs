pub mod cache;
pub mod diagnostics;
pub mod fs;
pub mod health;
