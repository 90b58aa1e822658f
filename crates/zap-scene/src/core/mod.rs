pub mod collision;
pub mod error;
pub mod rng;
pub mod scene;
pub mod time;
