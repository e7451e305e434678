// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Defines the engine-facing descriptions: settings, usage, image data, samplers */

pub mod coordinates;
pub mod image_slices;
pub mod sampler;
pub mod texture_settings;
pub mod visible_to;

pub use coordinates::Rect;
pub use image_slices::{ImageSlice, ImageSlices};
pub use sampler::SamplerState;
pub use texture_settings::{TextureKind, TextureSettings};
