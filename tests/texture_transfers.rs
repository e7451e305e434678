// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Uploads, readbacks and buffer copies against the software device.

use native_texture::Error;
use native_texture::bindings::texture_settings::TextureKind;
use native_texture::bindings::visible_to::BufferUsages;
use native_texture::bindings::{ImageSlice, ImageSlices, Rect, TextureSettings};
use native_texture::images::{GraphicsContext, Texture};
use native_texture::imp::soft::{CopyDirection, SoftDevice, SoftDeviceConfig};
use native_texture::imp::{Capabilities, Device};
use native_texture::pixel_formats::{PixelFormat, slice_size};
use std::sync::Arc;

fn context(config: SoftDeviceConfig) -> Arc<GraphicsContext<SoftDevice>> {
    Arc::new(GraphicsContext::new(SoftDevice::with_config(config)))
}

fn aligned(alignment: u32) -> SoftDeviceConfig {
    SoftDeviceConfig {
        capabilities: Capabilities {
            copy_row_alignment: alignment,
            ..Capabilities::full()
        },
        ..Default::default()
    }
}

/// Every (slice, mip) filled with a byte unique to it.
fn tagged(texture_settings: &TextureSettings, slices: u32) -> ImageSlices {
    let format = texture_settings.format;
    ImageSlices::full_from_fn(slices, texture_settings.mip_count, |slice, mip| {
        let w = (texture_settings.width >> mip).max(1);
        let h = (texture_settings.height >> mip).max(1);
        let tag = (slice * 16 + mip + 1) as u8;
        ImageSlice::new(w, h, format, vec![tag; slice_size(format, w, h)])
    })
}

fn assert_round_trip(settings: TextureSettings, slices: u32) {
    let context = context(SoftDeviceConfig::default());
    let data = tagged(&settings, slices);
    let texture = Texture::new(&context, settings, Some(&data)).unwrap();
    for mip in 0..texture.mip_count() {
        for slice in 0..texture.slice_count(mip) {
            let rect = Rect::full(texture.width(mip), texture.height(mip));
            let image = texture.readback(slice, mip, rect).unwrap();
            assert_eq!(
                Some(&image.data),
                data.get(slice, mip).map(|i| &i.data),
                "slice {slice} mip {mip}"
            );
        }
    }
    assert_eq!(context.device().stats().mipmap_generations, 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn uploaded_red_reads_back() {
    let context = context(SoftDeviceConfig::default());
    let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None).unwrap();
    let red = ImageSlice::solid(4, 4, PixelFormat::Rgba8Unorm, &[255, 0, 0, 255]);
    texture.upload_bytes(&red.data, 0, 0, Rect::full(4, 4)).unwrap();
    let image = texture.readback(0, 0, Rect::full(4, 4)).unwrap();
    assert_eq!(image.data, red.data);
    // the pending zero fill and upload went out with the readback
    let stats = context.device().stats();
    assert_eq!(stats.submissions, 1);
    assert_eq!(stats.waits, 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn arrays_round_trip() {
    let settings = TextureSettings::builder(TextureKind::Tex2DArray, 8, 4, PixelFormat::Rgba8Unorm)
        .layers(3)
        .full_mip_chain()
        .build();
    assert_round_trip(settings, 3);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn volumes_round_trip() {
    let settings = TextureSettings::builder(TextureKind::Volume, 4, 4, PixelFormat::R16Float)
        .depth(4)
        .full_mip_chain()
        .build();
    assert_round_trip(settings, 4);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn cubes_round_trip() {
    let settings = TextureSettings::builder(TextureKind::Cube, 4, 4, PixelFormat::Bgra8Unorm)
        .full_mip_chain()
        .srgb(true)
        .build();
    assert_round_trip(settings, 6);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn compressed_textures_round_trip() {
    let settings = TextureSettings::builder(TextureKind::Tex2D, 8, 8, PixelFormat::Bc1)
        .mip_count(3)
        .build();
    assert_round_trip(settings, 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn volume_slices_address_depth_and_array_slices_address_layers() {
    let context = context(SoftDeviceConfig::default());
    let volume = TextureSettings::builder(TextureKind::Volume, 2, 2, PixelFormat::R8Unorm)
        .depth(3)
        .build();
    let array = TextureSettings::builder(TextureKind::Tex2DArray, 2, 2, PixelFormat::R8Unorm)
        .layers(3)
        .build();
    let volume = Texture::new(&context, volume, None).unwrap();
    let array = Texture::new(&context, array, None).unwrap();
    context.finish().unwrap();

    let log = context.device().copy_log();
    let targets = |id: u64| -> Vec<(u32, u32)> {
        log.iter()
            .filter(|r| r.texture_id == id && r.direction == CopyDirection::BufferToTexture)
            .map(|r| (r.target.array_layer, r.target.z))
            .collect()
    };
    assert_eq!(targets(volume.handle().unwrap().id()), vec![(0, 0), (0, 1), (0, 2)]);
    assert_eq!(targets(array.handle().unwrap().id()), vec![(0, 0), (1, 0), (2, 0)]);

    volume.upload_bytes(&[9; 4], 0, 2, Rect::full(2, 2)).unwrap();
    assert_eq!(volume.readback(2, 0, Rect::full(2, 2)).unwrap().data, vec![9; 4]);
    assert_eq!(volume.readback(1, 0, Rect::full(2, 2)).unwrap().data, vec![0; 4]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn unaligned_rows_are_repacked() {
    let context = context(aligned(256));
    let texture = Texture::new(&context, TextureSettings::new_2d(3, 2, PixelFormat::R8Unorm), None).unwrap();
    let data = [1, 2, 3, 4, 5, 6];
    texture.upload_bytes(&data, 0, 0, Rect::full(3, 2)).unwrap();
    assert_eq!(texture.readback(0, 0, Rect::full(3, 2)).unwrap().data, data);
    let log = context.device().copy_log();
    assert!(log.iter().all(|r| r.layout.bytes_per_row == 256));
    assert_eq!(log.len(), 3);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn sub_rectangles_leave_the_rest_alone() {
    let context = context(SoftDeviceConfig::default());
    let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::R8Unorm), None).unwrap();
    texture.upload_bytes(&[9; 4], 0, 0, Rect::new(1, 1, 2, 2)).unwrap();
    let image = texture.readback(0, 0, Rect::full(4, 4)).unwrap();
    #[rustfmt::skip]
    let expected = vec![
        0, 0, 0, 0,
        0, 9, 9, 0,
        0, 9, 9, 0,
        0, 0, 0, 0,
    ];
    assert_eq!(image.data, expected);
    let corner = texture.readback(0, 0, Rect::new(2, 2, 2, 2)).unwrap();
    assert_eq!(corner.data, vec![9, 0, 0, 0]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn buffer_copies_are_batched() {
    let context = context(SoftDeviceConfig::default());
    let device = context.device();
    let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None).unwrap();
    let source = device
        .create_buffer(64, BufferUsages::COPY_SRC, "source")
        .unwrap();
    let data: Vec<u8> = (0..64).collect();
    source.write(0, &data);
    let destination = device
        .create_buffer(80, BufferUsages::COPY_DST | BufferUsages::MAP_READ, "destination")
        .unwrap();

    texture.copy_from_buffer(&source, 0, 0, 0, Rect::full(4, 4)).unwrap();
    texture.copy_to_buffer(&destination, 16, 0, 0, Rect::full(4, 4)).unwrap();
    assert_eq!(destination.contents(), vec![0; 80]);

    context.finish().unwrap();
    let contents = destination.contents();
    assert_eq!(&contents[..16], &[0; 16]);
    assert_eq!(&contents[16..], &data[..]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
#[should_panic(expected = "not a multiple of 256")]
fn buffer_copies_require_aligned_rows() {
    let context = context(aligned(256));
    let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None).unwrap();
    let buffer = context
        .device()
        .create_buffer(64, BufferUsages::COPY_SRC, "source")
        .unwrap();
    let _ = texture.copy_from_buffer(&buffer, 0, 0, 0, Rect::full(4, 4));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn depth_readback_drops_stencil() {
    let context = context(SoftDeviceConfig::default());
    let texture = Texture::new(
        &context,
        TextureSettings::new_2d(2, 1, PixelFormat::Depth32FloatStencil8),
        None,
    )
    .unwrap();
    texture
        .upload_bytes(&[1, 2, 3, 4, 0xff, 0, 0, 0, 5, 6, 7, 8, 0xee, 0, 0, 0], 0, 0, Rect::full(2, 1))
        .unwrap();
    let image = texture.readback(0, 0, Rect::full(2, 1)).unwrap();
    assert_eq!(image.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn packed_depth_stencil_readback_can_be_unsupported() {
    let context = context(SoftDeviceConfig {
        capabilities: Capabilities {
            depth24_stencil8_readback: false,
            ..Capabilities::full()
        },
        ..Default::default()
    });
    let texture = Texture::new(
        &context,
        TextureSettings::new_2d(2, 2, PixelFormat::Depth24UnormStencil8),
        None,
    )
    .unwrap();
    assert!(matches!(
        texture.readback(0, 0, Rect::full(2, 2)),
        Err(Error::UnsupportedPlatform { .. })
    ));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn readback_into_fills_a_caller_buffer() {
    let context = context(aligned(4));
    let texture = Texture::new(&context, TextureSettings::new_2d(3, 3, PixelFormat::Rg8Unorm), None).unwrap();
    let data: Vec<u8> = (1..=18).collect();
    texture.upload_bytes(&data, 0, 0, Rect::full(3, 3)).unwrap();
    let mut out = vec![0; 18];
    texture.readback_into(&mut out, 0, 0, Rect::full(3, 3)).unwrap();
    assert_eq!(out, data);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn sparse_data_keeps_supplied_slices() {
    let context = context(SoftDeviceConfig::default());
    let settings = TextureSettings::builder(TextureKind::Tex2DArray, 2, 2, PixelFormat::R8Unorm)
        .layers(2)
        .build();
    let mut data = ImageSlices::new();
    data.set(1, 0, ImageSlice::solid(2, 2, PixelFormat::R8Unorm, &[9]));
    let texture = Texture::new(&context, settings, Some(&data)).unwrap();
    assert_eq!(texture.readback(1, 0, Rect::full(2, 2)).unwrap().data, vec![9; 4]);
    assert_eq!(texture.readback(0, 0, Rect::full(2, 2)).unwrap().data, vec![0; 4]);
    // one upload, one zero fill
    assert_eq!(context.device().stats().buffer_to_texture_copies, 2);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn supplied_upper_levels_are_not_regenerated() {
    let context = context(SoftDeviceConfig::default());
    let settings = TextureSettings::builder(TextureKind::Tex2D, 4, 4, PixelFormat::R8Unorm)
        .mip_count(3)
        .build();
    let mut data = ImageSlices::new();
    data.set(0, 2, ImageSlice::solid(1, 1, PixelFormat::R8Unorm, &[42]));
    let texture = Texture::new(&context, settings, Some(&data)).unwrap();
    assert_eq!(texture.readback(0, 2, Rect::full(1, 1)).unwrap().data, vec![42]);
    assert_eq!(texture.readback(0, 0, Rect::full(4, 4)).unwrap().data, vec![0; 16]);
    assert_eq!(context.device().stats().mipmap_generations, 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn depth_uploads_can_be_unsupported() {
    let context = context(SoftDeviceConfig {
        capabilities: Capabilities {
            depth_upload: false,
            ..Capabilities::full()
        },
        ..Default::default()
    });
    let settings = TextureSettings::new_2d(2, 2, PixelFormat::Depth32Float);
    let texture = Texture::new(&context, settings.clone(), None).unwrap();
    assert!(matches!(
        texture.upload_bytes(&[0; 16], 0, 0, Rect::full(2, 2)),
        Err(Error::UnsupportedPlatform { .. })
    ));
    let buffer = context
        .device()
        .create_buffer(16, BufferUsages::COPY_SRC, "depth")
        .unwrap();
    assert!(matches!(
        texture.copy_from_buffer(&buffer, 0, 0, 0, Rect::full(2, 2)),
        Err(Error::UnsupportedPlatform { .. })
    ));

    let mut data = ImageSlices::new();
    data.set(0, 0, ImageSlice::zeroed(2, 2, PixelFormat::Depth32Float));
    assert!(matches!(
        Texture::new(&context, settings, Some(&data)),
        Err(Error::UnsupportedPlatform { .. })
    ));
    assert_eq!(context.device().live_textures(), 1);

    // Depth16Unorm stays uploadable
    let small = Texture::new(&context, TextureSettings::new_2d(1, 1, PixelFormat::Depth16Unorm), None).unwrap();
    small.upload_bytes(&[0x34, 0x12], 0, 0, Rect::full(1, 1)).unwrap();
    assert_eq!(small.readback(0, 0, Rect::full(1, 1)).unwrap().data, vec![0x34, 0x12]);
}
