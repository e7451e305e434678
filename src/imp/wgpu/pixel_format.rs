// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::imp::Capabilities;
use crate::pixel_formats::{NativeFormat, PixelFormat};
use wgpu::{AstcBlock, AstcChannel, Features, TextureFormat};

/// The wgpu format a native format is stored in.
pub fn wgpu_format(format: NativeFormat) -> TextureFormat {
    let srgb = format.srgb;
    let pick = |linear, srgb_variant| if srgb { srgb_variant } else { linear };
    match format.format {
        PixelFormat::R8Unorm => TextureFormat::R8Unorm,
        PixelFormat::Rg8Unorm => TextureFormat::Rg8Unorm,
        //luminance in R, alpha in G; expanded by the sampling swizzle
        PixelFormat::La8Unorm => TextureFormat::Rg8Unorm,
        PixelFormat::Rgba8Unorm => pick(TextureFormat::Rgba8Unorm, TextureFormat::Rgba8UnormSrgb),
        PixelFormat::Bgra8Unorm => pick(TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb),
        PixelFormat::Rgba16Unorm => TextureFormat::Rgba16Unorm,
        PixelFormat::R16Float => TextureFormat::R16Float,
        PixelFormat::Rg16Float => TextureFormat::Rg16Float,
        PixelFormat::Rgba16Float => TextureFormat::Rgba16Float,
        PixelFormat::R32Float => TextureFormat::R32Float,
        PixelFormat::Rg32Float => TextureFormat::Rg32Float,
        PixelFormat::Rgba32Float => TextureFormat::Rgba32Float,
        PixelFormat::Rgb10A2Unorm => TextureFormat::Rgb10a2Unorm,
        PixelFormat::R32Uint => TextureFormat::R32Uint,
        PixelFormat::Bc1 => pick(TextureFormat::Bc1RgbaUnorm, TextureFormat::Bc1RgbaUnormSrgb),
        PixelFormat::Bc3 => pick(TextureFormat::Bc3RgbaUnorm, TextureFormat::Bc3RgbaUnormSrgb),
        PixelFormat::Bc4 => TextureFormat::Bc4RUnorm,
        PixelFormat::Bc5 => TextureFormat::Bc5RgUnorm,
        PixelFormat::Bc7 => pick(TextureFormat::Bc7RgbaUnorm, TextureFormat::Bc7RgbaUnormSrgb),
        PixelFormat::Etc2Rgb8 => pick(TextureFormat::Etc2Rgb8Unorm, TextureFormat::Etc2Rgb8UnormSrgb),
        PixelFormat::Etc2Rgba8 => pick(TextureFormat::Etc2Rgba8Unorm, TextureFormat::Etc2Rgba8UnormSrgb),
        PixelFormat::Astc4x4 => TextureFormat::Astc {
            block: AstcBlock::B4x4,
            channel: if srgb { AstcChannel::UnormSrgb } else { AstcChannel::Unorm },
        },
        PixelFormat::Depth16Unorm => TextureFormat::Depth16Unorm,
        PixelFormat::Depth24UnormStencil8 => TextureFormat::Depth24PlusStencil8,
        PixelFormat::Depth32Float => TextureFormat::Depth32Float,
        PixelFormat::Depth32FloatStencil8 => TextureFormat::Depth32FloatStencil8,
    }
}

/// Optional features worth enabling when the adapter has them.
pub(super) fn wanted_features() -> Features {
    Features::TEXTURE_COMPRESSION_BC
        | Features::TEXTURE_COMPRESSION_ETC2
        | Features::TEXTURE_COMPRESSION_ASTC
        | Features::TEXTURE_FORMAT_16BIT_NORM
        | Features::DEPTH32FLOAT_STENCIL8
        | Features::FLOAT32_FILTERABLE
        | Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
}

/// Capabilities of a device created with `features` and `limits`.
pub(super) fn capabilities(features: Features, limits: &wgpu::Limits) -> Capabilities {
    Capabilities {
        compression_bc: features.contains(Features::TEXTURE_COMPRESSION_BC),
        compression_etc2: features.contains(Features::TEXTURE_COMPRESSION_ETC2),
        compression_astc: features.contains(Features::TEXTURE_COMPRESSION_ASTC),
        norm16_formats: features.contains(Features::TEXTURE_FORMAT_16BIT_NORM),
        depth32float_stencil8: features.contains(Features::DEPTH32FLOAT_STENCIL8),
        float32_filterable: features.contains(Features::FLOAT32_FILTERABLE),
        //mip blits render into 2D views only
        volume_mipmap_generation: false,
        //Depth24Plus has no defined memory layout
        depth24_stencil8_readback: false,
        //copies into Depth32Float and Depth24Plus* are validation errors
        depth_upload: false,
        copy_row_alignment: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        max_texture_dimension_2d: limits.max_texture_dimension_2d,
        max_texture_dimension_3d: limits.max_texture_dimension_3d,
        max_array_layers: limits.max_texture_array_layers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn srgb_picks_the_srgb_variant() {
        assert_eq!(
            wgpu_format(NativeFormat::derive(PixelFormat::Rgba8Unorm, true)),
            TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            wgpu_format(NativeFormat::derive(PixelFormat::La8Unorm, true)),
            TextureFormat::Rg8Unorm
        );
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn block_sizes_agree() {
        for format in [
            PixelFormat::Rgba8Unorm,
            PixelFormat::Rgba16Float,
            PixelFormat::Rgb10A2Unorm,
            PixelFormat::Bc1,
            PixelFormat::Bc7,
            PixelFormat::Etc2Rgb8,
            PixelFormat::Astc4x4,
        ] {
            let wgpu = wgpu_format(NativeFormat::linear(format));
            assert_eq!(wgpu.block_dimensions(), format.block_dimensions(), "{format:?}");
            assert_eq!(wgpu.block_copy_size(None), Some(format.block_bytes()), "{format:?}");
        }
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn features_map_to_capabilities() {
        let caps = capabilities(Features::TEXTURE_COMPRESSION_BC, &wgpu::Limits::default());
        assert!(caps.compression_bc);
        assert!(!caps.compression_astc);
        assert_eq!(caps.copy_row_alignment, 256);
        assert!(!caps.supports_readback(PixelFormat::Depth24UnormStencil8));
        assert!(!caps.supports_upload(PixelFormat::Depth32Float));
        assert!(caps.supports_upload(PixelFormat::Depth16Unorm));
    }
}
