// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Engine-neutral pixel formats and the byte-size rules that go with them.
//!
//! Every data transfer in this crate computes its row pitch and slice size
//! from the functions in this module:
//!
//! - [`uncompressed_row_size`] - `width * bytes_per_texel`
//! - [`compressed_row_size`] - `ceil(width / block_width) * bytes_per_block`
//! - [`slice_size`] - row size times the number of rows (block rows for compressed formats)
//!
//! # Examples
//!
//! ```
//! use native_texture::pixel_formats::{PixelFormat, row_size, slice_size};
//!
//! assert_eq!(row_size(PixelFormat::Rgba8Unorm, 4), 16);
//! assert_eq!(slice_size(PixelFormat::Rgba8Unorm, 4, 4), 64);
//! // BC1 packs each 4x4 block into 8 bytes.
//! assert_eq!(slice_size(PixelFormat::Bc1, 8, 8), 32);
//! ```

/*
Formats are a runtime enum rather than zero-sized marker types: a texture's format arrives in a
settings struct alongside its kind and size, so the byte rules dispatch on the value.
 */
pub(crate) mod texel;

/// An engine pixel format.
///
/// The in-memory channel order of each variant is the order in its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8Unorm,
    Rg8Unorm,
    /// Luminance + alpha.  Stored as two 8-bit channels and swizzled on read.
    La8Unorm,
    Rgba8Unorm,
    Bgra8Unorm,
    Rgba16Unorm,
    R16Float,
    Rg16Float,
    Rgba16Float,
    R32Float,
    Rg32Float,
    Rgba32Float,
    Rgb10A2Unorm,
    R32Uint,
    Bc1,
    Bc3,
    Bc4,
    Bc5,
    Bc7,
    Etc2Rgb8,
    Etc2Rgba8,
    Astc4x4,
    Depth16Unorm,
    /// 24-bit depth in the low bytes of a 32-bit word, stencil in the high byte.
    Depth24UnormStencil8,
    Depth32Float,
    /// 32-bit float depth followed by 8-bit stencil, padded to 64 bits.
    Depth32FloatStencil8,
}

/// Broad family of a format, used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFamily {
    Plain,
    Norm16,
    Float32,
    Bc,
    Etc2,
    Astc,
    Depth,
    Depth32Stencil8,
}

impl PixelFormat {
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            PixelFormat::Bc1
                | PixelFormat::Bc3
                | PixelFormat::Bc4
                | PixelFormat::Bc5
                | PixelFormat::Bc7
                | PixelFormat::Etc2Rgb8
                | PixelFormat::Etc2Rgba8
                | PixelFormat::Astc4x4
        )
    }

    pub const fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::Depth16Unorm
                | PixelFormat::Depth24UnormStencil8
                | PixelFormat::Depth32Float
                | PixelFormat::Depth32FloatStencil8
        )
    }

    pub const fn has_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::Depth24UnormStencil8 | PixelFormat::Depth32FloatStencil8
        )
    }

    /// Texel block size.  `(1, 1)` for uncompressed formats.
    pub const fn block_dimensions(self) -> (u32, u32) {
        if self.is_compressed() { (4, 4) } else { (1, 1) }
    }

    /// Bytes per texel block (per texel for uncompressed formats).
    pub const fn block_bytes(self) -> u32 {
        match self {
            PixelFormat::R8Unorm => 1,
            PixelFormat::Rg8Unorm | PixelFormat::La8Unorm => 2,
            PixelFormat::Rgba8Unorm | PixelFormat::Bgra8Unorm => 4,
            PixelFormat::Rgba16Unorm => 8,
            PixelFormat::R16Float => 2,
            PixelFormat::Rg16Float => 4,
            PixelFormat::Rgba16Float => 8,
            PixelFormat::R32Float => 4,
            PixelFormat::Rg32Float => 8,
            PixelFormat::Rgba32Float => 16,
            PixelFormat::Rgb10A2Unorm => 4,
            PixelFormat::R32Uint => 4,
            PixelFormat::Bc1 | PixelFormat::Bc4 | PixelFormat::Etc2Rgb8 => 8,
            PixelFormat::Bc3
            | PixelFormat::Bc5
            | PixelFormat::Bc7
            | PixelFormat::Etc2Rgba8
            | PixelFormat::Astc4x4 => 16,
            PixelFormat::Depth16Unorm => 2,
            PixelFormat::Depth24UnormStencil8 => 4,
            PixelFormat::Depth32Float => 4,
            PixelFormat::Depth32FloatStencil8 => 8,
        }
    }

    /// Bytes per texel when only the depth aspect is copied out.
    ///
    /// Equal to [`Self::block_bytes`] for everything but depth/stencil formats.
    pub const fn depth_aspect_bytes(self) -> u32 {
        match self {
            PixelFormat::Depth16Unorm => 2,
            PixelFormat::Depth24UnormStencil8 => 4,
            PixelFormat::Depth32Float => 4,
            PixelFormat::Depth32FloatStencil8 => 4,
            other => other.block_bytes(),
        }
    }

    pub const fn has_srgb_variant(self) -> bool {
        matches!(
            self,
            PixelFormat::Rgba8Unorm
                | PixelFormat::Bgra8Unorm
                | PixelFormat::Bc1
                | PixelFormat::Bc3
                | PixelFormat::Bc7
                | PixelFormat::Etc2Rgb8
                | PixelFormat::Etc2Rgba8
                | PixelFormat::Astc4x4
        )
    }

    /// Whether the format can be a colour render target.
    pub const fn is_color_renderable(self) -> bool {
        !self.is_compressed() && !self.is_depth_stencil()
    }

    /// Whether the format supports linear filtering.
    ///
    /// 32-bit float formats are filterable only when the device says so; see
    /// [`crate::imp::Capabilities::float32_filterable`].
    pub const fn is_filterable(self) -> bool {
        !matches!(self, PixelFormat::R32Uint) && !self.is_depth_stencil()
    }

    pub const fn family(self) -> FormatFamily {
        match self {
            PixelFormat::Rgba16Unorm => FormatFamily::Norm16,
            PixelFormat::R32Float | PixelFormat::Rg32Float | PixelFormat::Rgba32Float => {
                FormatFamily::Float32
            }
            PixelFormat::Bc1
            | PixelFormat::Bc3
            | PixelFormat::Bc4
            | PixelFormat::Bc5
            | PixelFormat::Bc7 => FormatFamily::Bc,
            PixelFormat::Etc2Rgb8 | PixelFormat::Etc2Rgba8 => FormatFamily::Etc2,
            PixelFormat::Astc4x4 => FormatFamily::Astc,
            PixelFormat::Depth32FloatStencil8 => FormatFamily::Depth32Stencil8,
            PixelFormat::Depth16Unorm
            | PixelFormat::Depth24UnormStencil8
            | PixelFormat::Depth32Float => FormatFamily::Depth,
            _ => FormatFamily::Plain,
        }
    }
}

pub fn is_compressed(format: PixelFormat) -> bool {
    format.is_compressed()
}

pub fn is_depth_stencil(format: PixelFormat) -> bool {
    format.is_depth_stencil()
}

/// Bytes in one row of blocks of a compressed format.
pub fn compressed_row_size(format: PixelFormat, width: u32) -> usize {
    debug_assert!(format.is_compressed());
    let (block_width, _) = format.block_dimensions();
    width.div_ceil(block_width) as usize * format.block_bytes() as usize
}

/// Bytes in one row of texels of an uncompressed format.
pub fn uncompressed_row_size(format: PixelFormat, width: u32) -> usize {
    debug_assert!(!format.is_compressed());
    width as usize * format.block_bytes() as usize
}

/// Bytes in one row, dispatching on compression.
pub fn row_size(format: PixelFormat, width: u32) -> usize {
    if format.is_compressed() {
        compressed_row_size(format, width)
    } else {
        uncompressed_row_size(format, width)
    }
}

/// Number of rows a region of `height` texels occupies in linear memory.
pub fn block_rows(format: PixelFormat, height: u32) -> u32 {
    let (_, block_height) = format.block_dimensions();
    height.div_ceil(block_height)
}

/// Bytes in a `width` x `height` region.
pub fn slice_size(format: PixelFormat, width: u32, height: u32) -> usize {
    row_size(format, width) * block_rows(format, height) as usize
}

/// Source channel for one output channel of a swizzled format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwizzleChannel {
    R,
    G,
    B,
    A,
    Zero,
    One,
}

/// Per-channel read swizzle, in RGBA order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzle(pub [SwizzleChannel; 4]);

/// The format as the device sees it: engine format, effective sRGB flag and
/// an optional read swizzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeFormat {
    pub format: PixelFormat,
    /// `true` only when sRGB was requested and the format has an sRGB variant.
    pub srgb: bool,
    pub swizzle: Option<Swizzle>,
}

impl NativeFormat {
    /// Derives the native format for an engine format and sRGB request.
    pub fn derive(format: PixelFormat, srgb: bool) -> Self {
        let swizzle = match format {
            PixelFormat::La8Unorm => Some(Swizzle([
                SwizzleChannel::R,
                SwizzleChannel::R,
                SwizzleChannel::R,
                SwizzleChannel::G,
            ])),
            _ => None,
        };
        NativeFormat {
            format,
            srgb: srgb && format.has_srgb_variant(),
            swizzle,
        }
    }

    /// A plain linear native format with no swizzle.
    pub const fn linear(format: PixelFormat) -> Self {
        NativeFormat {
            format,
            srgb: false,
            swizzle: None,
        }
    }
}

impl From<PixelFormat> for NativeFormat {
    fn from(format: PixelFormat) -> Self {
        NativeFormat::derive(format, false)
    }
}
