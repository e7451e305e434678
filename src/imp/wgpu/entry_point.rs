// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::SetupError;

/// The wgpu instance devices are created from.
#[derive(Debug)]
pub struct EntryPoint(pub(super) wgpu::Instance);

impl EntryPoint {
    /// An instance configured from the `WGPU_*` environment variables.
    pub fn new() -> Self {
        let descriptor = wgpu::InstanceDescriptor::from_env_or_default();
        EntryPoint(wgpu::Instance::new(&descriptor))
    }

    /// Picks an adapter with no surface requirement.
    pub fn headless_adapter(&self) -> Result<wgpu::Adapter, SetupError> {
        let options = wgpu::RequestAdapterOptions {
            power_preference: Default::default(),
            force_fallback_adapter: false,
            compatible_surface: None,
        };
        Ok(test_executors::spin_on(self.0.request_adapter(&options))?)
    }
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self::new()
    }
}
