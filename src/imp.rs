// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Backend implementations and the contract they share.

A [`Device`] is everything a texture needs from the graphics API underneath it:
allocation of textures and buffers, a batched blit encoder, submission with a
blocking wait, MSAA negotiation and sampler creation.  Two backends ship here:

- [`soft`]: a CPU reference device, always available
- `wgpu` (feature `backend_wgpu`): the same contract on top of wgpu
*/

use crate::bindings::sampler::SamplerState;
use crate::bindings::visible_to::{BufferUsages, TextureUsages};
use crate::bindings::coordinates::mip_dimension;
use crate::error::Error;
use crate::pixel_formats::{FormatFamily, NativeFormat, PixelFormat};
use std::fmt::Debug;

pub mod soft;

#[cfg(feature = "backend_wgpu")]
pub mod wgpu;

/// Feature levels negotiated once when a device is created.
///
/// Textures consult these flags instead of probing the device per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub compression_bc: bool,
    pub compression_etc2: bool,
    pub compression_astc: bool,
    pub norm16_formats: bool,
    pub depth32float_stencil8: bool,
    /// Linear filtering (and therefore mipmap generation) of 32-bit float formats.
    pub float32_filterable: bool,
    /// Mipmap generation for volume textures.
    pub volume_mipmap_generation: bool,
    /// Copying the depth aspect of `Depth24UnormStencil8` into a buffer.
    pub depth24_stencil8_readback: bool,
    /// Buffer copies into depth formats other than `Depth16Unorm`.
    pub depth_upload: bool,
    /// Required multiple for `bytes_per_row` in buffer/texture copies.
    pub copy_row_alignment: u32,
    pub max_texture_dimension_2d: u32,
    pub max_texture_dimension_3d: u32,
    pub max_array_layers: u32,
}

impl Capabilities {
    /// Everything supported, no alignment requirement.
    pub fn full() -> Self {
        Capabilities {
            compression_bc: true,
            compression_etc2: true,
            compression_astc: true,
            norm16_formats: true,
            depth32float_stencil8: true,
            float32_filterable: true,
            volume_mipmap_generation: true,
            depth24_stencil8_readback: true,
            depth_upload: true,
            copy_row_alignment: 1,
            max_texture_dimension_2d: 16384,
            max_texture_dimension_3d: 2048,
            max_array_layers: 2048,
        }
    }

    pub fn supports_format(&self, format: PixelFormat) -> bool {
        match format.family() {
            FormatFamily::Plain | FormatFamily::Float32 | FormatFamily::Depth => true,
            FormatFamily::Norm16 => self.norm16_formats,
            FormatFamily::Bc => self.compression_bc,
            FormatFamily::Etc2 => self.compression_etc2,
            FormatFamily::Astc => self.compression_astc,
            FormatFamily::Depth32Stencil8 => self.depth32float_stencil8,
        }
    }

    pub fn is_filterable(&self, format: PixelFormat) -> bool {
        format.is_filterable() && (format.family() != FormatFamily::Float32 || self.float32_filterable)
    }

    /// Whether a texture region of `format` can be copied into a buffer.
    pub fn supports_readback(&self, format: PixelFormat) -> bool {
        format != PixelFormat::Depth24UnormStencil8 || self.depth24_stencil8_readback
    }

    /// Whether a buffer can be copied into a texture of `format`.
    pub fn supports_upload(&self, format: PixelFormat) -> bool {
        !format.is_depth_stencil() || format == PixelFormat::Depth16Unorm || self.depth_upload
    }
}

/// Native texture type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    D2,
    D2Array,
    D3,
    Cube,
    D2Multisample,
}

/// Everything needed to allocate one native texture.
///
/// Storage is always device-private; the CPU reaches it only through copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor<'a> {
    pub label: &'a str,
    pub kind: NativeKind,
    pub width: u32,
    pub height: u32,
    /// Depth of a [`NativeKind::D3`] texture, 1 otherwise.
    pub depth: u32,
    /// Array length; 6 for cubes.
    pub array_layers: u32,
    pub mip_count: u32,
    pub sample_count: u32,
    pub format: NativeFormat,
    pub usage: TextureUsages,
}

impl TextureDescriptor<'_> {
    pub fn mip_width(&self, mip: u32) -> u32 {
        mip_dimension(self.width, mip)
    }
    pub fn mip_height(&self, mip: u32) -> u32 {
        mip_dimension(self.height, mip)
    }
    pub fn mip_depth(&self, mip: u32) -> u32 {
        mip_dimension(self.depth, mip)
    }
}

/// Which part of a texel a copy touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureAspect {
    All,
    /// Depth without stencil, used when reading depth/stencil formats back.
    DepthOnly,
}

/// Linear layout of texel rows inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferLayout {
    pub offset: u64,
    pub bytes_per_row: u32,
    /// Rows (block rows for compressed formats) in one image.
    pub rows_per_image: u32,
}

/// One single-layer region of one subresource.
///
/// Volume textures address depth through `z` with `array_layer` 0; every other
/// kind addresses its slice through `array_layer` with `z` 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CopyTarget {
    pub mip: u32,
    pub array_layer: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub aspect: TextureAspect,
}

/// A command appended to the device's pending blit batch.
#[derive(Debug)]
pub enum BlitCommand<'a, D: Device> {
    CopyBufferToTexture {
        buffer: &'a D::Buffer,
        layout: BufferLayout,
        texture: &'a D::Texture,
        target: CopyTarget,
    },
    CopyTextureToBuffer {
        texture: &'a D::Texture,
        target: CopyTarget,
        buffer: &'a D::Buffer,
        layout: BufferLayout,
    },
    /// Derive every level from level 0 with the device's filtering.
    GenerateMipmaps { texture: &'a D::Texture },
    /// Zero one whole slice of one mip level, every aspect included.
    Clear {
        texture: &'a D::Texture,
        mip: u32,
        array_layer: u32,
        z: u32,
    },
}

/// The graphics API beneath a texture.
///
/// All methods take `&self`; a device serialises its pending batch internally
/// and assumes one recording thread.
pub trait Device: Debug + Send + Sync + Sized + 'static {
    type Texture: Debug + Send + Sync + 'static;
    type Buffer: Debug + Send + Sync + 'static;
    type Sampler: Debug + Send + Sync + 'static;
    /// A submitted batch that can be waited on.
    type Batch: Debug;

    fn capabilities(&self) -> &Capabilities;

    /// Allocates a texture, or `None` when the device is out of memory.
    fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Option<Self::Texture>;

    /// Largest supported sample count not above `requested` (at least 1).
    fn closest_sample_count(&self, format: NativeFormat, requested: u32) -> u32;

    /// Allocates a linear buffer owned by the caller.
    fn create_buffer(&self, size: u64, usage: BufferUsages, label: &str) -> Option<Self::Buffer>;

    /// A short-lived CPU-visible buffer holding `contents`, usable as a copy source.
    fn create_upload_buffer(&self, contents: &[u8], label: &str) -> Self::Buffer;

    /// A short-lived CPU-visible buffer of `size` bytes, usable as a copy destination.
    fn create_readback_buffer(&self, size: u64, label: &str) -> Self::Buffer;

    /// Copies completed buffer contents out.  Only valid once the batch that
    /// wrote the buffer has been waited on.
    fn read_buffer(&self, buffer: &Self::Buffer, offset: u64, out: &mut [u8]) -> Result<(), Error>;

    /// Appends to the pending batch, creating the blit encoder if needed.
    fn encode(&self, command: BlitCommand<'_, Self>);

    /// Submits everything encoded so far.
    fn submit(&self) -> Self::Batch;

    /// Blocks until `batch` has executed.
    fn wait(&self, batch: &Self::Batch) -> Result<(), Error>;

    fn create_sampler(&self, state: &SamplerState) -> Self::Sampler;
}
