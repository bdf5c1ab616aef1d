pub mod distance;
pub mod eta;
pub mod geo_point;
pub mod kilometers;
pub mod kmh;
