pub mod driver_publisher;
