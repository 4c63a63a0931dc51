pub mod file_store;
pub mod lock;
pub mod recovery;
pub mod workspace;
