pub mod analyze_route;
pub mod batch_route;
pub mod default_route;
pub mod views;
