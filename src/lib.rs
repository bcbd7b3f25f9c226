//! blobvault - a transactional blob repository over pluggable partitioned stores

pub mod record;
pub mod repository;
pub mod store;
