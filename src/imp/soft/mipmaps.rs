// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Box-filter mipmap generation for software textures.

use super::storage::TextureStorage;
use crate::imp::NativeKind;
use crate::pixel_formats::texel::{self, Texel};

/// Rebuilds levels 1.. of every layer from the level above.
///
/// Each destination texel averages the 2x2 (2x2x2 for volumes) block of its
/// parent level, clamped at the edges for odd sizes.
pub(crate) fn generate(storage: &mut TextureStorage) {
    assert!(
        texel::is_decodable(storage.format),
        "{:?} cannot be filtered in software",
        storage.format
    );
    let volume = storage.kind == NativeKind::D3;
    for mip in 1..storage.mip_count() {
        let (sw, sh, sd) = storage.extent(mip - 1);
        let (dw, dh, dd) = storage.extent(mip);
        for layer in 0..storage.layers() {
            for z in 0..dd {
                let source_zs: Vec<u32> = if volume && sd > 1 {
                    vec![(z * 2).min(sd - 1), (z * 2 + 1).min(sd - 1)]
                } else {
                    vec![z.min(sd - 1)]
                };
                for y in 0..dh {
                    for x in 0..dw {
                        let mut taps: Vec<Texel> = Vec::with_capacity(8);
                        for &sz in &source_zs {
                            for sy in [(y * 2).min(sh - 1), (y * 2 + 1).min(sh - 1)] {
                                for sx in [(x * 2).min(sw - 1), (x * 2 + 1).min(sw - 1)] {
                                    taps.push(read_texel(storage, mip - 1, layer, sz, sx, sy));
                                }
                            }
                        }
                        let value = texel::average(&taps);
                        write_texel(storage, mip, layer, z, x, y, value);
                    }
                }
            }
        }
    }
}

fn texel_offset(storage: &TextureStorage, mip: u32, layer: u32, z: u32, x: u32, y: u32) -> usize {
    storage.slice_offset(mip, layer, z)
        + y as usize * storage.row_pitch(mip)
        + x as usize * storage.format.block_bytes() as usize
}

fn read_texel(storage: &TextureStorage, mip: u32, layer: u32, z: u32, x: u32, y: u32) -> Texel {
    let offset = texel_offset(storage, mip, layer, z, x, y);
    let size = storage.format.block_bytes() as usize;
    texel::decode(
        storage.format,
        storage.srgb,
        &storage.levels[mip as usize][offset..offset + size],
    )
}

fn write_texel(storage: &mut TextureStorage, mip: u32, layer: u32, z: u32, x: u32, y: u32, value: Texel) {
    let offset = texel_offset(storage, mip, layer, z, x, y);
    let size = storage.format.block_bytes() as usize;
    let (format, srgb) = (storage.format, storage.srgb);
    texel::encode(
        format,
        srgb,
        value,
        &mut storage.levels[mip as usize][offset..offset + size],
    );
}
