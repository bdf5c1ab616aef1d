pub mod in_memory_store;
pub mod position_snapshot;
pub mod position_store;
pub mod subscription;
