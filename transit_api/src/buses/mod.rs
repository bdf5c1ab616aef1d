pub mod bus;
pub mod list;
pub mod routes;
pub mod ws;
