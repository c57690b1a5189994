// Location: src/gpu/device.rs

use candle_core::{DType, Device};
use tracing::debug;

use crate::error::Result;

/// Pick the device inference runs on: CUDA device 0 when the crate is built with
/// the `cuda` feature and a GPU answers, the CPU otherwise.
pub fn select_device(force_cpu: bool) -> Result<Device> {
    if force_cpu {
        debug!("CPU forced by configuration");
        return Ok(Device::Cpu);
    }

    #[cfg(feature = "cuda")]
    {
        if candle_core::utils::cuda_is_available() {
            let device = Device::new_cuda(0)?;
            debug!(device = "cuda:0", "Using GPU");
            return Ok(device);
        }
    }

    debug!(device = "cpu", "Using CPU");
    Ok(Device::Cpu)
}

/// Weights dtype for a device. BF16 kernels are only worth it on the GPU.
pub fn default_dtype(device: &Device) -> DType {
    if device.is_cuda() {
        DType::BF16
    } else {
        DType::F32
    }
}
