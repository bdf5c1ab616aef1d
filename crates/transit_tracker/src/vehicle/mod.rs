pub mod vehicle_id;
pub mod vehicle_meta;
pub mod vehicle_record;
