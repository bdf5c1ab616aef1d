pub mod annotated_bus;
pub mod passenger_feed;
pub mod passenger_matcher;
pub mod route_query;
