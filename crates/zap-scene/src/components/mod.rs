pub mod model;
pub mod node;
pub mod script;
pub mod texture;
