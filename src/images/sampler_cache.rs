// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Shared native samplers keyed by their state.

use crate::bindings::sampler::SamplerState;
use crate::imp::Device;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One native sampler per distinct [`SamplerState`].
///
/// The cache owns the samplers; textures keep weak links, so clearing the
/// cache frees every sampler no texture is currently binding.
#[derive(Debug)]
pub struct SamplerCache<D: Device> {
    samplers: Mutex<HashMap<SamplerState, Arc<D::Sampler>>>,
}

impl<D: Device> Default for SamplerCache<D> {
    fn default() -> Self {
        SamplerCache {
            samplers: Mutex::new(HashMap::new()),
        }
    }
}

impl<D: Device> SamplerCache<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sampler for `state`, created on first use.
    pub fn resolve(&self, device: &D, state: &SamplerState) -> Arc<D::Sampler> {
        let mut samplers = self.samplers.lock().unwrap_or_else(PoisonError::into_inner);
        samplers
            .entry(*state)
            .or_insert_with(|| {
                logwise::trace_sync!("creating sampler {state}", state = logwise::privacy::LogIt(state));
                Arc::new(device.create_sampler(state))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.samplers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.samplers.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
