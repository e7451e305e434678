// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texel memory of a software texture.
//!
//! Each mip level is one allocation laid out as `[array_layer][z][block_row][block]`
//! with tightly packed rows.

use crate::imp::{BufferLayout, CopyTarget, NativeKind, TextureAspect, TextureDescriptor};
use crate::pixel_formats::{PixelFormat, block_rows, row_size, slice_size};

#[derive(Debug)]
pub(crate) struct TextureStorage {
    pub(crate) kind: NativeKind,
    pub(crate) format: PixelFormat,
    pub(crate) srgb: bool,
    width: u32,
    height: u32,
    depth: u32,
    layers: u32,
    samples: u32,
    pub(crate) levels: Vec<Vec<u8>>,
}

impl TextureStorage {
    /// Bytes a texture with this descriptor occupies.
    pub(crate) fn byte_size(descriptor: &TextureDescriptor<'_>) -> u64 {
        (0..descriptor.mip_count)
            .map(|mip| Self::level_size(descriptor, mip) as u64)
            .sum()
    }

    fn level_size(descriptor: &TextureDescriptor<'_>, mip: u32) -> usize {
        slice_size(
            descriptor.format.format,
            descriptor.mip_width(mip),
            descriptor.mip_height(mip),
        ) * descriptor.array_layers as usize
            * descriptor.mip_depth(mip) as usize
            * descriptor.sample_count as usize
    }

    pub(crate) fn new(descriptor: &TextureDescriptor<'_>) -> Self {
        let levels = (0..descriptor.mip_count)
            .map(|mip| vec![0; Self::level_size(descriptor, mip)])
            .collect();
        TextureStorage {
            kind: descriptor.kind,
            format: descriptor.format.format,
            srgb: descriptor.format.srgb,
            width: descriptor.width,
            height: descriptor.height,
            depth: descriptor.depth,
            layers: descriptor.array_layers,
            samples: descriptor.sample_count,
            levels,
        }
    }

    pub(crate) fn mip_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub(crate) fn layers(&self) -> u32 {
        self.layers
    }

    /// `(width, height, depth)` of a level.
    pub(crate) fn extent(&self, mip: u32) -> (u32, u32, u32) {
        use crate::bindings::coordinates::mip_dimension;
        (
            mip_dimension(self.width, mip),
            mip_dimension(self.height, mip),
            mip_dimension(self.depth, mip),
        )
    }

    fn slice_bytes(&self, mip: u32) -> usize {
        let (w, h, _) = self.extent(mip);
        slice_size(self.format, w, h) * self.samples as usize
    }

    /// Byte offset of a single 2D slice inside its level.
    pub(crate) fn slice_offset(&self, mip: u32, array_layer: u32, z: u32) -> usize {
        let (_, _, d) = self.extent(mip);
        assert!(array_layer < self.layers, "layer {array_layer} out of {}", self.layers);
        assert!(z < d, "z {z} out of depth {d}");
        (array_layer as usize * d as usize + z as usize) * self.slice_bytes(mip)
    }

    pub(crate) fn row_pitch(&self, mip: u32) -> usize {
        let (w, _, _) = self.extent(mip);
        row_size(self.format, w)
    }

    fn check_target(&self, target: &CopyTarget) {
        assert!(self.kind != NativeKind::D2Multisample, "multisampled textures are not copyable");
        assert!(target.mip < self.mip_count(), "mip {} out of {}", target.mip, self.mip_count());
        let (w, h, _) = self.extent(target.mip);
        assert!(
            target.x + target.width <= w && target.y + target.height <= h,
            "region {}x{}+{}+{} outside {}x{} level",
            target.width,
            target.height,
            target.x,
            target.y,
            w,
            h
        );
        let (bw, bh) = self.format.block_dimensions();
        assert!(
            target.x % bw == 0 && target.y % bh == 0,
            "compressed regions start on block boundaries"
        );
    }

    /// Block-row iteration shared by writes and reads: yields
    /// `(texture_offset, buffer_offset)` for each row of the region.
    fn rows(&self, target: &CopyTarget, layout: &BufferLayout) -> impl Iterator<Item = (usize, usize)> {
        let (bw, bh) = self.format.block_dimensions();
        let base = self.slice_offset(target.mip, target.array_layer, target.z);
        let pitch = self.row_pitch(target.mip);
        let x_bytes = (target.x / bw) as usize * self.format.block_bytes() as usize;
        let first_row = (target.y / bh) as usize;
        let bytes_per_row = layout.bytes_per_row as usize;
        let offset = layout.offset as usize;
        (0..block_rows(self.format, target.height) as usize).map(move |r| {
            (
                base + (first_row + r) * pitch + x_bytes,
                offset + r * bytes_per_row,
            )
        })
    }

    pub(crate) fn write(&mut self, target: &CopyTarget, layout: &BufferLayout, source: &[u8]) {
        self.check_target(target);
        let len = row_size(self.format, target.width);
        let rows: Vec<_> = self.rows(target, layout).collect();
        let level = &mut self.levels[target.mip as usize];
        for (dst, src) in rows {
            level[dst..dst + len].copy_from_slice(&source[src..src + len]);
        }
    }

    pub(crate) fn read(&self, target: &CopyTarget, layout: &BufferLayout, destination: &mut [u8]) {
        self.check_target(target);
        let level = &self.levels[target.mip as usize];
        match target.aspect {
            TextureAspect::All => {
                let len = row_size(self.format, target.width);
                for (src, dst) in self.rows(target, layout) {
                    destination[dst..dst + len].copy_from_slice(&level[src..src + len]);
                }
            }
            TextureAspect::DepthOnly => {
                let texel = self.format.block_bytes() as usize;
                let depth = self.format.depth_aspect_bytes() as usize;
                for (src, dst) in self.rows(target, layout) {
                    for x in 0..target.width as usize {
                        let from = &level[src + x * texel..src + x * texel + depth];
                        let to = &mut destination[dst + x * depth..dst + (x + 1) * depth];
                        to.copy_from_slice(from);
                        if self.format == PixelFormat::Depth24UnormStencil8 {
                            //stencil lives in the high byte
                            to[3] = 0;
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn clear(&mut self, mip: u32, array_layer: u32, z: u32) {
        let offset = self.slice_offset(mip, array_layer, z);
        let len = self.slice_bytes(mip);
        self.levels[mip as usize][offset..offset + len].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::visible_to::TextureUsages;
    use crate::pixel_formats::NativeFormat;

    fn descriptor(kind: NativeKind, format: PixelFormat, depth: u32, layers: u32) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: "storage",
            kind,
            width: 4,
            height: 4,
            depth,
            array_layers: layers,
            mip_count: 3,
            sample_count: 1,
            format: NativeFormat::linear(format),
            usage: TextureUsages::all(),
        }
    }

    fn target(mip: u32, array_layer: u32, z: u32, width: u32, height: u32) -> CopyTarget {
        CopyTarget {
            mip,
            array_layer,
            x: 0,
            y: 0,
            z,
            width,
            height,
            aspect: TextureAspect::All,
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn sizes_cover_every_level() {
        let d = descriptor(NativeKind::D3, PixelFormat::R8Unorm, 4, 1);
        // 4x4x4 + 2x2x2 + 1x1x1
        assert_eq!(TextureStorage::byte_size(&d), 64 + 8 + 1);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn volume_slices_are_distinct() {
        let d = descriptor(NativeKind::D3, PixelFormat::R8Unorm, 4, 1);
        let mut storage = TextureStorage::new(&d);
        let layout = BufferLayout { offset: 0, bytes_per_row: 4, rows_per_image: 4 };
        storage.write(&target(0, 0, 2, 4, 4), &layout, &[7; 16]);
        assert_eq!(storage.slice_offset(0, 0, 2), 32);
        assert!(storage.levels[0][32..48].iter().all(|b| *b == 7));
        assert!(storage.levels[0][..32].iter().all(|b| *b == 0));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn padded_rows_are_skipped() {
        let d = descriptor(NativeKind::D2, PixelFormat::R8Unorm, 1, 1);
        let mut storage = TextureStorage::new(&d);
        let layout = BufferLayout { offset: 0, bytes_per_row: 8, rows_per_image: 2 };
        let mut source = vec![0xee; 16];
        source[..2].copy_from_slice(&[1, 2]);
        source[8..10].copy_from_slice(&[3, 4]);
        storage.write(&target(0, 0, 0, 2, 2), &layout, &source);
        assert_eq!(&storage.levels[0][..2], &[1, 2]);
        assert_eq!(&storage.levels[0][4..6], &[3, 4]);
        assert_eq!(storage.levels[0][2], 0);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn depth_only_read_strips_stencil() {
        let d = descriptor(NativeKind::D2, PixelFormat::Depth24UnormStencil8, 1, 1);
        let mut storage = TextureStorage::new(&d);
        storage.levels[0][..4].copy_from_slice(&[1, 2, 3, 0xff]);
        let mut out = [0xaa; 4];
        let mut t = target(0, 0, 0, 1, 1);
        t.aspect = TextureAspect::DepthOnly;
        storage.read(&t, &BufferLayout { offset: 0, bytes_per_row: 4, rows_per_image: 1 }, &mut out);
        assert_eq!(out, [1, 2, 3, 0]);
    }
}
