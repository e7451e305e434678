// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Addressing and staging layout shared by every texture copy.

use crate::bindings::coordinates::Rect;
use crate::bindings::texture_settings::TextureKind;
use crate::imp::{BufferLayout, CopyTarget, TextureAspect};
use crate::pixel_formats::{PixelFormat, block_rows, row_size};
use std::borrow::Cow;

/// Maps a slice index onto `(array_layer, z)`.
///
/// Volume slices are depth layers; every other kind indexes its array (cube
/// faces included).
pub(crate) fn slice_target(kind: TextureKind, slice: u32) -> (u32, u32) {
    match kind {
        TextureKind::Volume => (0, slice),
        TextureKind::Tex2D | TextureKind::Tex2DArray | TextureKind::Cube => (slice, 0),
    }
}

/// Aspect copied when reading a texture of this format into a buffer.
pub(crate) fn readback_aspect(format: PixelFormat) -> TextureAspect {
    if format.is_depth_stencil() {
        TextureAspect::DepthOnly
    } else {
        TextureAspect::All
    }
}

pub(crate) fn copy_target(
    kind: TextureKind,
    mip: u32,
    slice: u32,
    rect: Rect,
    aspect: TextureAspect,
) -> CopyTarget {
    let (array_layer, z) = slice_target(kind, slice);
    CopyTarget {
        mip,
        array_layer,
        x: rect.x,
        y: rect.y,
        z,
        width: rect.width,
        height: rect.height,
        aspect,
    }
}

/// Bytes in one tightly packed row of `width` texels for `aspect`.
pub(crate) fn tight_row(format: PixelFormat, width: u32, aspect: TextureAspect) -> usize {
    match aspect {
        TextureAspect::All => row_size(format, width),
        TextureAspect::DepthOnly => format.depth_aspect_bytes() as usize * width as usize,
    }
}

/// How a region is laid out in a transfer buffer.
///
/// Caller data is always tightly packed.  When the device needs rows aligned
/// to a multiple the tight row does not meet, the staging copy pads every row
/// out to the next multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StagingLayout {
    tight_row: usize,
    staged_row: usize,
    rows: usize,
}

impl StagingLayout {
    pub(crate) fn new(format: PixelFormat, width: u32, height: u32, alignment: u32, aspect: TextureAspect) -> Self {
        let tight_row = tight_row(format, width, aspect);
        let alignment = alignment.max(1) as usize;
        StagingLayout {
            tight_row,
            staged_row: tight_row.div_ceil(alignment) * alignment,
            rows: block_rows(format, height) as usize,
        }
    }

    pub(crate) fn is_repacked(&self) -> bool {
        self.staged_row != self.tight_row
    }

    /// Bytes of caller data the region covers.
    pub(crate) fn tight_size(&self) -> usize {
        self.tight_row * self.rows
    }

    pub(crate) fn staged_size(&self) -> usize {
        self.staged_row * self.rows
    }

    pub(crate) fn buffer_layout(&self) -> BufferLayout {
        BufferLayout {
            offset: 0,
            bytes_per_row: self.staged_row as u32,
            rows_per_image: self.rows as u32,
        }
    }

    /// Caller data in staging layout.  Borrows when no padding is needed.
    pub(crate) fn pack<'a>(&self, data: &'a [u8]) -> Cow<'a, [u8]> {
        let data = &data[..self.tight_size()];
        if !self.is_repacked() {
            return Cow::Borrowed(data);
        }
        let mut staged = vec![0; self.staged_size()];
        for (src, dst) in data
            .chunks_exact(self.tight_row)
            .zip(staged.chunks_exact_mut(self.staged_row))
        {
            dst[..self.tight_row].copy_from_slice(src);
        }
        Cow::Owned(staged)
    }

    /// Strips row padding from `staged` into `dest`.
    pub(crate) fn unpack(&self, staged: &[u8], dest: &mut [u8]) {
        if !self.is_repacked() {
            dest[..self.tight_size()].copy_from_slice(&staged[..self.tight_size()]);
            return;
        }
        for (src, dst) in staged
            .chunks_exact(self.staged_row)
            .zip(dest.chunks_exact_mut(self.tight_row))
            .take(self.rows)
        {
            dst.copy_from_slice(&src[..self.tight_row]);
        }
    }
}
