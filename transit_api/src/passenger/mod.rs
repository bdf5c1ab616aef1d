pub mod buses;
pub mod routes;
pub mod ws;
