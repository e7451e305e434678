// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Construction, MSAA negotiation, failure cleanup and release.

use native_texture::Error;
use native_texture::bindings::sampler::SamplerState;
use native_texture::bindings::texture_settings::TextureKind;
use native_texture::bindings::{Rect, TextureSettings};
use native_texture::images::{GraphicsContext, Texture};
use native_texture::imp::Capabilities;
use native_texture::imp::soft::{SoftDevice, SoftDeviceConfig};
use native_texture::pixel_formats::PixelFormat;
use std::sync::Arc;

fn context(config: SoftDeviceConfig) -> Arc<GraphicsContext<SoftDevice>> {
    Arc::new(GraphicsContext::new(SoftDevice::with_config(config)))
}

fn render_target(msaa: u32) -> TextureSettings {
    TextureSettings::builder(TextureKind::Tex2D, 16, 16, PixelFormat::Rgba8Unorm)
        .render_target(true)
        .msaa(msaa)
        .debug_name("render target")
        .build()
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn empty_texture_reads_back_zeros() {
    let context = context(SoftDeviceConfig::default());
    let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None).unwrap();
    let image = texture.readback(0, 0, Rect::new(0, 0, 4, 4)).unwrap();
    assert_eq!(image.data, vec![0; 64]);
    assert_eq!((image.width, image.height), (4, 4));
    let stats = context.device().stats();
    assert_eq!(stats.buffer_to_texture_copies, 1);
    assert_eq!(stats.texture_to_buffer_copies, 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn msaa_is_clamped_to_the_device() {
    let context = context(SoftDeviceConfig {
        sample_counts: vec![1, 2, 4],
        ..Default::default()
    });
    let texture = Texture::new(&context, render_target(8), None).unwrap();
    assert_eq!(texture.requested_msaa(), 8);
    assert_eq!(texture.msaa(), 4);
    assert_eq!(texture.msaa_handle().unwrap().sample_count(), 4);
    assert_eq!(context.device().live_textures(), 2);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn single_sample_has_no_companion() {
    let context = context(SoftDeviceConfig {
        sample_counts: vec![1],
        ..Default::default()
    });
    let texture = Texture::new(&context, render_target(4), None).unwrap();
    assert_eq!(texture.msaa(), 1);
    assert!(texture.msaa_handle().is_none());
    assert_eq!(context.device().live_textures(), 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn out_of_memory_leaks_nothing() {
    let context = context(SoftDeviceConfig {
        memory_budget: Some(16),
        ..Default::default()
    });
    let result = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None);
    assert!(matches!(result, Err(Error::OutOfMemory { .. })));
    assert_eq!(context.device().live_textures(), 0);
    assert_eq!(context.device().allocated_bytes(), 0);
    assert_eq!(context.device().pending_commands(), 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn unsupported_formats_fail_before_allocating() {
    let context = context(SoftDeviceConfig {
        capabilities: Capabilities {
            compression_astc: false,
            ..Capabilities::full()
        },
        ..Default::default()
    });
    let result = Texture::new(&context, TextureSettings::new_2d(8, 8, PixelFormat::Astc4x4), None);
    assert!(matches!(result, Err(Error::UnsupportedPlatform { .. })));
    assert_eq!(context.device().live_textures(), 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn invalid_settings_are_rejected() {
    let context = context(SoftDeviceConfig::default());
    let result = Texture::new(&context, TextureSettings::new_2d(0, 4, PixelFormat::R8Unorm), None);
    assert!(matches!(result, Err(Error::InvalidSettings(_))));
    let msaa_mips = TextureSettings::builder(TextureKind::Tex2D, 8, 8, PixelFormat::Rgba8Unorm)
        .render_target(true)
        .msaa(4)
        .mip_count(2)
        .build();
    assert!(matches!(Texture::new(&context, msaa_mips, None), Err(Error::InvalidSettings(_))));
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn uploads_wait_for_a_submission() {
    let context = context(SoftDeviceConfig::default());
    let texture = Texture::new(&context, TextureSettings::new_2d(2, 2, PixelFormat::R8Unorm), None).unwrap();
    texture.upload_bytes(&[1, 2, 3, 4], 0, 0, Rect::full(2, 2)).unwrap();
    let device = context.device();
    // zero fill plus the upload
    assert_eq!(device.pending_commands(), 2);
    assert_eq!(device.stats().submissions, 0);
    assert_eq!(device.inspect_slice(texture.handle().unwrap(), 0, 0, 0), vec![0; 4]);

    context.flush();
    assert_eq!(device.pending_commands(), 0);
    assert_eq!(device.stats().submissions, 1);
    assert_eq!(device.inspect_slice(texture.handle().unwrap(), 0, 0, 0), vec![1, 2, 3, 4]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn depth_textures_are_cleared() {
    let context = context(SoftDeviceConfig::default());
    let settings = TextureSettings::builder(TextureKind::Cube, 4, 4, PixelFormat::Depth32Float)
        .mip_count(2)
        .build();
    let texture = Texture::new(&context, settings, None).unwrap();
    context.finish().unwrap();
    let stats = context.device().stats();
    assert_eq!(stats.clears, 12);
    assert_eq!(stats.buffer_to_texture_copies, 0);
    assert_eq!(stats.mipmap_generations, 0);
    assert_eq!(texture.readback(5, 1, Rect::full(2, 2)).unwrap().data, vec![0; 16]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn release_is_idempotent_and_drop_releases() {
    let context = context(SoftDeviceConfig::default());
    let mut texture = Texture::new(&context, render_target(2), None).unwrap();
    assert_eq!(context.device().live_textures(), 2);
    texture.release();
    assert_eq!(context.device().live_textures(), 0);
    texture.release();
    assert!(texture.handle().is_none() && texture.msaa_handle().is_none());
    assert_eq!(texture.upload_bytes(&[0; 4], 0, 0, Rect::full(1, 1)), Err(Error::Released));

    let other = Texture::new(&context, TextureSettings::new_2d(2, 2, PixelFormat::R8Unorm), None).unwrap();
    assert_eq!(context.device().live_textures(), 1);
    drop(other);
    assert_eq!(context.device().live_textures(), 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn equal_sampler_states_share_one_sampler() {
    let context = context(SoftDeviceConfig::default());
    let a = Texture::new(&context, TextureSettings::new_2d(2, 2, PixelFormat::R8Unorm), None).unwrap();
    let mut b = Texture::new(&context, TextureSettings::new_2d(2, 2, PixelFormat::R8Unorm), None).unwrap();
    assert!(Arc::ptr_eq(&a.sampler(), &b.sampler()));
    assert_eq!(context.sampler_cache().len(), 1);

    b.set_sampler_state(SamplerState::nearest());
    assert_eq!(b.sampler_state(), SamplerState::nearest());
    assert!(!Arc::ptr_eq(&a.sampler(), &b.sampler()));
    assert_eq!(context.sampler_cache().len(), 2);
    assert_eq!(context.device().stats().samplers_created, 2);
    // no GPU work
    assert_eq!(context.device().pending_commands(), 2);

    context.sampler_cache().clear();
    assert_eq!(a.sampler().state, SamplerState::default());
    assert_eq!(context.device().stats().samplers_created, 3);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn accessors_describe_the_texture() {
    let context = context(SoftDeviceConfig::default());
    let settings = TextureSettings::builder(TextureKind::Volume, 8, 4, PixelFormat::Rgba16Float)
        .depth(4)
        .full_mip_chain()
        .debug_name("fog")
        .build();
    let texture = Texture::new(&context, settings, None).unwrap();
    assert_eq!(texture.kind(), TextureKind::Volume);
    assert_eq!(texture.mip_count(), 4);
    assert_eq!((texture.width(1), texture.height(1), texture.depth(1)), (4, 2, 2));
    assert_eq!((texture.width(3), texture.height(3), texture.depth(3)), (1, 1, 1));
    assert_eq!(texture.slice_count(0), 4);
    assert_eq!(texture.slice_count(2), 1);
    assert_eq!(texture.layer_count(), 1);
    assert_eq!(texture.format(), PixelFormat::Rgba16Float);
    assert!(texture.is_readable());
    assert!(!texture.is_render_target());
    assert!(!texture.is_srgb());
    assert_eq!(texture.debug_name(), "fog");
}
