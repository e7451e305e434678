// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The texture component and the shared context it records into. */

pub mod context;
pub mod sampler_cache;
pub mod texture;

pub use context::GraphicsContext;
pub use sampler_cache::SamplerCache;
pub use texture::Texture;
