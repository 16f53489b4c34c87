use std::str::FromStr;

use candle_core::Device;
use tracing::{debug, warn};

use super::error::ModelError;

/// Where the classifier should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// First available GPU backend compiled in, else CPU.
    #[default]
    Auto,
    /// Always CPU, even when a GPU backend is compiled.
    Cpu,
}

impl FromStr for DevicePreference {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            other => Err(ModelError::InvalidConfig {
                reason: format!("unknown device preference '{other}' (expected auto or cpu)"),
            }),
        }
    }
}

/// Resolves a [`DevicePreference`] to a candle device.
///
/// GPU backends are gated by the `metal` / `cuda` cargo features. Failing to open a
/// GPU is not an error; every failure is logged and the classifier drops to CPU.
pub fn select_device(preference: DevicePreference) -> Result<Device, ModelError> {
    if preference == DevicePreference::Cpu {
        debug!("CPU device requested explicitly");
        return Ok(Device::Cpu);
    }

    let failures = match open_gpu() {
        Ok(device) => return Ok(device),
        Err(failures) => failures,
    };

    let reason = if !cfg!(any(feature = "metal", feature = "cuda")) {
        "no GPU backend compiled".to_string()
    } else if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };

    warn!(reason = %reason, "Classifier falling back to CPU device");
    Ok(Device::Cpu)
}

#[allow(unused_mut)]
fn open_gpu() -> Result<Device, Vec<String>> {
    let mut failures = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            tracing::info!("Running sentiment classifier on Metal");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            failures.push(format!("metal failed: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            tracing::info!("Running sentiment classifier on CUDA");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            failures.push(format!("cuda failed: {e}"));
        }
    }

    Err(failures)
}
