pub mod canvas;
#[cfg(test)]
pub mod fake;
pub mod http;
pub mod onnx;
pub mod scheduler;
pub mod sink;
pub mod v4l2;
