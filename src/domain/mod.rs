pub mod classifier;
pub mod detection;
pub mod errors;
pub mod model;
pub mod stream;
pub mod waste;
