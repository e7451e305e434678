// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The [`Device`](crate::imp::Device) contract on top of wgpu.

Blits are recorded into one pending `wgpu::CommandEncoder` and submitted to
the queue together.  Mipmaps are generated with a render-pass blit per level.
Channel swizzles in [`NativeFormat`](crate::pixel_formats::NativeFormat) are
not expressible in wgpu views and are left to the sampling shader.
*/

mod device;
mod entry_point;
mod error;
mod mipmap;
mod pixel_format;
mod sampler;

pub use device::{WgpuBatch, WgpuBuffer, WgpuDevice, WgpuTexture};
pub use entry_point::EntryPoint;
pub use error::SetupError;
pub use pixel_format::wgpu_format;
pub use sampler::WgpuSampler;
