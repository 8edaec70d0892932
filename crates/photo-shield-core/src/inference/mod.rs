//! Face detection inference using Candle.

mod blazeface;
mod device;
mod face_detector;
mod loader;

pub use blazeface::{non_max_suppression, BlazeFace, RawFace, INPUT_SIZE};
pub use device::select_device;
pub use face_detector::{BlazeFaceConfig, BlazeFaceDetector};
pub use loader::{load_safetensors, LazyModel};
