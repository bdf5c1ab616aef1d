pub mod session_context;
pub mod session_store;
