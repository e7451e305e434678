// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! CPU-side image data handed to and returned from textures.

use crate::pixel_formats::{PixelFormat, slice_size};

/// One decoded 2D image: a single slice of a single mip level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlice {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl ImageSlice {
    /// Wraps existing bytes.  `data` must hold at least a full slice.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        assert!(
            data.len() >= slice_size(format, width, height),
            "{}x{} {:?} needs {} bytes, got {}",
            width,
            height,
            format,
            slice_size(format, width, height),
            data.len()
        );
        ImageSlice {
            width,
            height,
            format,
            data,
        }
    }

    /// An all-zero image.
    pub fn zeroed(width: u32, height: u32, format: PixelFormat) -> Self {
        ImageSlice {
            width,
            height,
            format,
            data: vec![0; slice_size(format, width, height)],
        }
    }

    /// Fills every texel with `texel`, which must be one texel of `format`.
    pub fn solid(width: u32, height: u32, format: PixelFormat, texel: &[u8]) -> Self {
        assert!(!format.is_compressed(), "solid fill needs an uncompressed format");
        assert_eq!(texel.len(), format.block_bytes() as usize);
        let data = texel.repeat(width as usize * height as usize);
        ImageSlice {
            width,
            height,
            format,
            data,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Initial data for a texture, indexed `[slice][mip]`.
///
/// Entries may be missing; construction uploads only what is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlices {
    slices: Vec<Vec<Option<ImageSlice>>>,
}

impl ImageSlices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table with `slices` x `mips` entries from a generator.
    pub fn full_from_fn(
        slices: u32,
        mips: u32,
        mut f: impl FnMut(u32, u32) -> ImageSlice,
    ) -> Self {
        let slices = (0..slices)
            .map(|slice| (0..mips).map(|mip| Some(f(slice, mip))).collect())
            .collect();
        ImageSlices { slices }
    }

    pub fn set(&mut self, slice: u32, mip: u32, image: ImageSlice) {
        let (slice, mip) = (slice as usize, mip as usize);
        if self.slices.len() <= slice {
            self.slices.resize_with(slice + 1, Vec::new);
        }
        let mips = &mut self.slices[slice];
        if mips.len() <= mip {
            mips.resize(mip + 1, None);
        }
        mips[mip] = Some(image);
    }

    pub fn get(&self, slice: u32, mip: u32) -> Option<&ImageSlice> {
        self.slices
            .get(slice as usize)
            .and_then(|mips| mips.get(mip as usize))
            .and_then(Option::as_ref)
    }

    /// Whether no entry is present at all.
    pub fn is_empty(&self) -> bool {
        self.slices.iter().flatten().all(Option::is_none)
    }

    /// Number of mip levels spanned by the entries of any slice.
    pub fn mip_count(&self) -> u32 {
        self.slices
            .iter()
            .filter_map(|mips| mips.iter().rposition(Option::is_some))
            .max()
            .map_or(0, |last| last as u32 + 1)
    }

    pub fn slice_count(&self) -> u32 {
        self.slices.len() as u32
    }
}
