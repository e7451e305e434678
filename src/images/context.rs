// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The per-device state textures share.

use crate::error::Error;
use crate::images::sampler_cache::SamplerCache;
use crate::imp::{Capabilities, Device};

/// A device together with the caches built on top of it.
///
/// Textures hold an `Arc` to their context.  All recording goes into the
/// device's single pending batch; [`GraphicsContext::flush`] and
/// [`GraphicsContext::finish`] are the only ways that batch leaves the CPU
/// other than a texture readback.
#[derive(Debug)]
pub struct GraphicsContext<D: Device> {
    device: D,
    samplers: SamplerCache<D>,
}

impl<D: Device> GraphicsContext<D> {
    pub fn new(device: D) -> Self {
        logwise::info_sync!(
            "graphics context with capabilities {caps}",
            caps = logwise::privacy::LogIt(device.capabilities())
        );
        GraphicsContext {
            device,
            samplers: SamplerCache::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn capabilities(&self) -> &Capabilities {
        self.device.capabilities()
    }

    pub fn sampler_cache(&self) -> &SamplerCache<D> {
        &self.samplers
    }

    /// Submits pending work without waiting for it.
    pub fn flush(&self) -> D::Batch {
        self.device.submit()
    }

    /// Submits pending work and blocks until the device has executed it.
    pub fn finish(&self) -> Result<(), Error> {
        let batch = self.device.submit();
        self.device.wait(&batch)
    }
}
