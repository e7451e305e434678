// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texel decode/encode for CPU-side filtering.
//!
//! Channels are kept in memory order; filtering is per channel so BGRA needs no
//! reordering.  sRGB formats are filtered in linear space.

use super::PixelFormat;
use half::f16;

/// Decoded texel, up to four channels in memory order.
pub(crate) type Texel = [f32; 4];

fn channel_count(format: PixelFormat) -> Option<usize> {
    match format {
        PixelFormat::R8Unorm | PixelFormat::R16Float | PixelFormat::R32Float => Some(1),
        PixelFormat::Rg8Unorm
        | PixelFormat::La8Unorm
        | PixelFormat::Rg16Float
        | PixelFormat::Rg32Float => Some(2),
        PixelFormat::Rgba8Unorm
        | PixelFormat::Bgra8Unorm
        | PixelFormat::Rgba16Unorm
        | PixelFormat::Rgba16Float
        | PixelFormat::Rgba32Float
        | PixelFormat::Rgb10A2Unorm => Some(4),
        _ => None,
    }
}

/// Whether [`decode`] and [`encode`] understand this format.
pub(crate) fn is_decodable(format: PixelFormat) -> bool {
    channel_count(format).is_some()
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn unorm8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn decode(format: PixelFormat, srgb: bool, bytes: &[u8]) -> Texel {
    let mut out = [0.0; 4];
    match format {
        PixelFormat::R8Unorm
        | PixelFormat::Rg8Unorm
        | PixelFormat::La8Unorm
        | PixelFormat::Rgba8Unorm
        | PixelFormat::Bgra8Unorm => {
            for (o, b) in out.iter_mut().zip(bytes) {
                *o = *b as f32 / 255.0;
            }
            if srgb {
                for c in out.iter_mut().take(3) {
                    *c = srgb_to_linear(*c);
                }
            }
        }
        PixelFormat::Rgba16Unorm => {
            for (o, b) in out.iter_mut().zip(bytes.chunks_exact(2)) {
                *o = u16::from_le_bytes([b[0], b[1]]) as f32 / 65535.0;
            }
        }
        PixelFormat::R16Float | PixelFormat::Rg16Float | PixelFormat::Rgba16Float => {
            for (o, b) in out.iter_mut().zip(bytes.chunks_exact(2)) {
                *o = f16::from_le_bytes([b[0], b[1]]).to_f32();
            }
        }
        PixelFormat::R32Float | PixelFormat::Rg32Float | PixelFormat::Rgba32Float => {
            for (o, b) in out.iter_mut().zip(bytes.chunks_exact(4)) {
                *o = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            }
        }
        PixelFormat::Rgb10A2Unorm => {
            let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            out[0] = (word & 0x3ff) as f32 / 1023.0;
            out[1] = ((word >> 10) & 0x3ff) as f32 / 1023.0;
            out[2] = ((word >> 20) & 0x3ff) as f32 / 1023.0;
            out[3] = (word >> 30) as f32 / 3.0;
        }
        other => unreachable!("{other:?} has no texel decoding"),
    }
    out
}

pub(crate) fn encode(format: PixelFormat, srgb: bool, texel: Texel, bytes: &mut [u8]) {
    let channels = channel_count(format).unwrap_or(0);
    match format {
        PixelFormat::R8Unorm
        | PixelFormat::Rg8Unorm
        | PixelFormat::La8Unorm
        | PixelFormat::Rgba8Unorm
        | PixelFormat::Bgra8Unorm => {
            for (i, b) in bytes.iter_mut().take(channels).enumerate() {
                let c = if srgb && i < 3 {
                    linear_to_srgb(texel[i])
                } else {
                    texel[i]
                };
                *b = unorm8(c);
            }
        }
        PixelFormat::Rgba16Unorm => {
            for (i, b) in bytes.chunks_exact_mut(2).take(channels).enumerate() {
                let v = (texel[i].clamp(0.0, 1.0) * 65535.0).round() as u16;
                b.copy_from_slice(&v.to_le_bytes());
            }
        }
        PixelFormat::R16Float | PixelFormat::Rg16Float | PixelFormat::Rgba16Float => {
            for (i, b) in bytes.chunks_exact_mut(2).take(channels).enumerate() {
                b.copy_from_slice(&f16::from_f32(texel[i]).to_le_bytes());
            }
        }
        PixelFormat::R32Float | PixelFormat::Rg32Float | PixelFormat::Rgba32Float => {
            for (i, b) in bytes.chunks_exact_mut(4).take(channels).enumerate() {
                b.copy_from_slice(&texel[i].to_le_bytes());
            }
        }
        PixelFormat::Rgb10A2Unorm => {
            let q = |c: f32, max: f32| (c.clamp(0.0, 1.0) * max).round() as u32;
            let word = q(texel[0], 1023.0)
                | (q(texel[1], 1023.0) << 10)
                | (q(texel[2], 1023.0) << 20)
                | (q(texel[3], 3.0) << 30);
            bytes[..4].copy_from_slice(&word.to_le_bytes());
        }
        other => unreachable!("{other:?} has no texel encoding"),
    }
}

/// Averages texels channel-wise.
pub(crate) fn average(texels: &[Texel]) -> Texel {
    let mut sum = [0.0f32; 4];
    for t in texels {
        for (s, c) in sum.iter_mut().zip(t) {
            *s += c;
        }
    }
    let n = texels.len().max(1) as f32;
    sum.map(|s| s / n)
}
