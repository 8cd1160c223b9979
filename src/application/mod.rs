pub mod overlay;
pub mod ports;
pub mod services;
