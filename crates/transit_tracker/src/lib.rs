pub mod config;
pub mod driver;
pub mod error;
pub mod geo;
pub mod passenger;
pub mod position_source;
pub mod session;
pub mod store;
pub mod vehicle;

#[cfg(test)]
pub(crate) mod test_utils;
