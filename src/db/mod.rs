pub mod memory;
pub mod pg_store;
pub mod repository;
