pub mod checker;
pub mod datastore;

pub use checker::{HealthCheck, HealthChecker, ProbeError};
