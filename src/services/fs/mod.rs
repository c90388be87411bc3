pub mod client;
pub mod local;

pub use client::{FileStore, FsError};
pub use local::LocalFileStore;
