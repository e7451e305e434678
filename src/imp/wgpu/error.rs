// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt::Display;

/// Failures while standing up a wgpu device.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    NoSuchAdapter(#[from] wgpu::RequestAdapterError),
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
}

impl Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::NoSuchAdapter(e) => write!(f, "no such adapter: {}", e),
            SetupError::RequestDeviceError(e) => write!(f, "{}", e),
        }
    }
}

impl From<SetupError> for crate::error::Error {
    fn from(error: SetupError) -> Self {
        crate::error::Error::unsupported(error.to_string())
    }
}
