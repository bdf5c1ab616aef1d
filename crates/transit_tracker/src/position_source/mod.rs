pub mod geo_position_source;
pub mod simulated_source;
