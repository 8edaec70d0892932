//! Inference device selection.

use candle_core::Device;
use tracing::{debug, info};

/// Picks the inference device.
///
/// With `prefer_gpu`, tries Metal then CUDA when those features are compiled
/// in, and falls back to the CPU.
#[must_use]
pub fn select_device(prefer_gpu: bool) -> Device {
    if prefer_gpu {
        #[cfg(feature = "metal")]
        {
            if let Ok(device) = Device::new_metal(0) {
                info!("Running face detection on Metal");
                return device;
            }
        }

        #[cfg(feature = "cuda")]
        {
            if let Ok(device) = Device::new_cuda(0) {
                info!("Running face detection on CUDA");
                return device;
            }
        }

        debug!("No GPU backend available");
    }

    info!("Running face detection on CPU");
    Device::Cpu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_when_gpu_not_preferred() {
        assert!(matches!(select_device(false), Device::Cpu));
    }
}
