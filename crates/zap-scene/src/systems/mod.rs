pub mod dispatch;
pub mod raycast;
pub mod resources;
