// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! A texture backed by a native device texture.

A [`Texture`] owns the device texture built from its [`TextureSettings`],
plus a multisampled companion when the device grants MSAA.  Uploads and
buffer copies are appended to the context's pending batch and return
immediately.  [`Texture::readback`] is the one blocking operation: it submits
the whole batch and waits for it.

```
use native_texture::bindings::{ImageSlice, Rect, TextureSettings};
use native_texture::images::{GraphicsContext, Texture};
use native_texture::imp::soft::SoftDevice;
use native_texture::pixel_formats::PixelFormat;
use std::sync::Arc;

let context = Arc::new(GraphicsContext::new(SoftDevice::new()));
let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None).unwrap();
let red = ImageSlice::solid(4, 4, PixelFormat::Rgba8Unorm, &[255, 0, 0, 255]);
texture.upload_bytes(&red.data, 0, 0, Rect::full(4, 4)).unwrap();
assert_eq!(texture.readback(0, 0, Rect::full(4, 4)).unwrap().data, red.data);
```
*/

pub(crate) mod transfer;

use crate::bindings::coordinates::{Rect, mip_dimension};
use crate::bindings::image_slices::{ImageSlice, ImageSlices};
use crate::bindings::sampler::SamplerState;
use crate::bindings::texture_settings::{TextureKind, TextureSettings};
use crate::bindings::visible_to::TextureUsages;
use crate::error::Error;
use crate::images::context::GraphicsContext;
use crate::imp::{
    BlitCommand, BufferLayout, Capabilities, Device, NativeKind, TextureAspect, TextureDescriptor,
};
use crate::pixel_formats::{NativeFormat, PixelFormat, block_rows, slice_size};
use std::sync::{Arc, Weak};
use transfer::StagingLayout;

/// A native texture and everything needed to fill, copy and read it.
#[derive(Debug)]
pub struct Texture<D: Device> {
    context: Arc<GraphicsContext<D>>,
    settings: TextureSettings,
    native_format: NativeFormat,
    msaa: u32,
    primary: Option<D::Texture>,
    msaa_texture: Option<D::Texture>,
    sampler_state: SamplerState,
    sampler: Weak<D::Sampler>,
}

fn native_kind(kind: TextureKind) -> NativeKind {
    match kind {
        TextureKind::Tex2D => NativeKind::D2,
        TextureKind::Tex2DArray => NativeKind::D2Array,
        TextureKind::Volume => NativeKind::D3,
        TextureKind::Cube => NativeKind::Cube,
    }
}

/// Whether mip levels of a texture with these settings can be derived on the device.
fn mipmap_support(settings: &TextureSettings, caps: &Capabilities) -> Result<(), Error> {
    let format = settings.format;
    let unsupported = |reason| Err(Error::MipmapsUnsupported { format, reason });
    if settings.mip_count <= 1 {
        unsupported("texture has a single mip level")
    } else if format.is_compressed() {
        unsupported("compressed formats cannot be rendered into")
    } else if !format.is_color_renderable() {
        unsupported("format is not colour-renderable")
    } else if !caps.is_filterable(format) {
        unsupported("format is not filterable on this device")
    } else if settings.kind == TextureKind::Volume && !caps.volume_mipmap_generation {
        unsupported("device cannot generate volume mipmaps")
    } else {
        Ok(())
    }
}

impl<D: Device> Texture<D> {
    /// Creates the native texture and fills its initial contents.
    ///
    /// Every (slice, mip) pair `data` leaves out is zero-filled.  When
    /// `settings` asks for several mip levels and `data` supplies at most
    /// level 0, the rest are generated.  On error nothing allocated here
    /// outlives the call.
    pub fn new(
        context: &Arc<GraphicsContext<D>>,
        settings: TextureSettings,
        data: Option<&ImageSlices>,
    ) -> Result<Self, Error> {
        let caps = context.capabilities();
        settings.validate(caps)?;
        if !caps.supports_format(settings.format) {
            return Err(Error::unsupported(format!("{:?} textures", settings.format)));
        }
        let has_data = data.is_some_and(|data| !data.is_empty());
        if has_data && !caps.supports_upload(settings.format) {
            return Err(Error::unsupported(format!("initial data for {:?} textures", settings.format)));
        }
        let supplied_mips = data.map_or(0, ImageSlices::mip_count);
        let needs_generation = settings.mip_count > 1 && supplied_mips < 2;
        let can_generate = mipmap_support(&settings, caps);
        if needs_generation && has_data {
            can_generate.clone()?;
        }

        let native_format = NativeFormat::derive(settings.format, settings.srgb);
        let usage = TextureUsages::from_settings(settings.readable, settings.render_target);
        let descriptor = TextureDescriptor {
            label: &settings.debug_name,
            kind: native_kind(settings.kind),
            width: settings.width,
            height: settings.height,
            depth: settings.volume_depth(),
            array_layers: settings.array_layers(),
            mip_count: settings.mip_count,
            sample_count: 1,
            format: native_format,
            usage,
        };
        let device = context.device();
        let primary = device.create_texture(&descriptor).ok_or_else(|| {
            logwise::error_sync!(
                "texture {name}: primary allocation failed",
                name = logwise::privacy::LogIt(&settings.debug_name)
            );
            Error::out_of_memory(format!("{}x{} {:?}", settings.width, settings.height, settings.format))
        })?;

        let msaa = device.closest_sample_count(native_format, settings.requested_msaa());
        let msaa_texture = if msaa > 1 {
            let msaa_descriptor = TextureDescriptor {
                kind: NativeKind::D2Multisample,
                mip_count: 1,
                sample_count: msaa,
                usage: usage.multisampled(),
                ..descriptor.clone()
            };
            match device.create_texture(&msaa_descriptor) {
                Some(texture) => Some(texture),
                None => {
                    drop(primary);
                    logwise::error_sync!(
                        "texture {name}: {msaa}x MSAA allocation failed",
                        name = logwise::privacy::LogIt(&settings.debug_name),
                        msaa = msaa
                    );
                    return Err(Error::out_of_memory(format!("{msaa}x multisampled companion")));
                }
            }
        } else {
            None
        };
        if msaa != settings.requested_msaa() {
            logwise::warn_sync!(
                "texture {name}: requested {requested}x MSAA, device granted {msaa}x",
                name = logwise::privacy::LogIt(&settings.debug_name),
                requested = settings.requested_msaa(),
                msaa = msaa
            );
        }

        let sampler_state = settings.sampler;
        let mut texture = Texture {
            context: context.clone(),
            settings,
            native_format,
            msaa,
            primary: Some(primary),
            msaa_texture,
            sampler_state,
            sampler: Weak::new(),
        };
        texture.initialize(data, needs_generation && can_generate.is_ok())?;
        texture.set_sampler_state(sampler_state);
        logwise::info_sync!(
            "created texture {name} ({kind}, {mips} mips, {msaa}x)",
            name = logwise::privacy::LogIt(&texture.settings.debug_name),
            kind = logwise::privacy::LogIt(&texture.settings.kind),
            mips = texture.settings.mip_count,
            msaa = msaa
        );
        Ok(texture)
    }

    /// Uploads what `data` supplies and zeroes every other (slice, mip) pair.
    ///
    /// With `generate`, only level 0 is filled before the rest is derived from it.
    fn initialize(&self, data: Option<&ImageSlices>, generate: bool) -> Result<(), Error> {
        let filled_mips = if generate { 1 } else { self.mip_count() };
        for mip in 0..filled_mips {
            for slice in 0..self.slice_count(mip) {
                match data.and_then(|data| data.get(slice, mip)) {
                    Some(image) => self.upload_image(image, mip, slice)?,
                    None => self.zero_fill(mip, slice)?,
                }
            }
        }
        if generate {
            self.generate_mipmaps()?;
        }
        Ok(())
    }

    fn upload_image(&self, image: &ImageSlice, mip: u32, slice: u32) -> Result<(), Error> {
        let (width, height) = (self.width(mip), self.height(mip));
        if image.format != self.settings.format || image.width != width || image.height != height {
            return Err(Error::InvalidSettings(format!(
                "image for slice {slice} mip {mip} is {}x{} {:?}, expected {width}x{height} {:?}",
                image.width, image.height, image.format, self.settings.format
            )));
        }
        self.upload_bytes(&image.data, mip, slice, Rect::full(width, height))
    }

    /// Zeroes one whole slice of one mip level.
    fn zero_fill(&self, mip: u32, slice: u32) -> Result<(), Error> {
        let primary = self.primary()?;
        if self.settings.format.is_depth_stencil() {
            let (array_layer, z) = transfer::slice_target(self.settings.kind, slice);
            self.context.device().encode(BlitCommand::Clear {
                texture: primary,
                mip,
                array_layer,
                z,
            });
            Ok(())
        } else {
            let rect = Rect::full(self.width(mip), self.height(mip));
            let zeros = vec![0; slice_size(self.settings.format, rect.width, rect.height)];
            self.upload_bytes(&zeros, mip, slice, rect)
        }
    }

    fn primary(&self) -> Result<&D::Texture, Error> {
        self.primary.as_ref().ok_or(Error::Released)
    }

    fn check_region(&self, mip: u32, slice: u32, rect: Rect) {
        assert!(mip < self.mip_count(), "mip {mip} out of {}", self.mip_count());
        assert!(
            slice < self.slice_count(mip),
            "slice {slice} out of {} at mip {mip}",
            self.slice_count(mip)
        );
        assert!(
            rect.fits_within(self.width(mip), self.height(mip)),
            "{rect:?} outside {}x{} mip {mip}",
            self.width(mip),
            self.height(mip)
        );
    }

    /// Stages `data` and appends a copy of it into `rect` of (`mip`, `slice`).
    ///
    /// `data` is tightly packed in the texture's format.  Does not wait.
    pub fn upload_bytes(&self, data: &[u8], mip: u32, slice: u32, rect: Rect) -> Result<(), Error> {
        let primary = self.primary()?;
        let format = self.settings.format;
        if !self.context.capabilities().supports_upload(format) {
            return Err(Error::unsupported(format!("uploads into {format:?}")));
        }
        self.check_region(mip, slice, rect);
        if rect.is_empty() {
            return Ok(());
        }
        let device = self.context.device();
        let layout = StagingLayout::new(
            format,
            rect.width,
            rect.height,
            self.context.capabilities().copy_row_alignment,
            TextureAspect::All,
        );
        assert!(
            data.len() >= layout.tight_size(),
            "{} bytes cannot fill {}x{} {format:?}",
            data.len(),
            rect.width,
            rect.height
        );
        let staged = layout.pack(data);
        let buffer = device.create_upload_buffer(&staged, &self.settings.debug_name);
        device.encode(BlitCommand::CopyBufferToTexture {
            buffer: &buffer,
            layout: layout.buffer_layout(),
            texture: primary,
            target: transfer::copy_target(self.settings.kind, mip, slice, rect, TextureAspect::All),
        });
        logwise::trace_sync!(
            "upload {name}: mip {mip} slice {slice} {w}x{h}, repacked {repacked}",
            name = logwise::privacy::LogIt(&self.settings.debug_name),
            mip = mip,
            slice = slice,
            w = rect.width,
            h = rect.height,
            repacked = logwise::privacy::LogIt(&layout.is_repacked())
        );
        Ok(())
    }

    /// Appends a command deriving every mip level from level 0.
    pub fn generate_mipmaps(&self) -> Result<(), Error> {
        let primary = self.primary()?;
        mipmap_support(&self.settings, self.context.capabilities())?;
        self.context
            .device()
            .encode(BlitCommand::GenerateMipmaps { texture: primary });
        Ok(())
    }

    /// Reads `rect` of (`slice`, `mip`) back to the CPU.
    ///
    /// Depth/stencil formats return the depth aspect only, packed at
    /// [`PixelFormat::depth_aspect_bytes`] per texel.
    pub fn readback(&self, slice: u32, mip: u32, rect: Rect) -> Result<ImageSlice, Error> {
        let format = self.settings.format;
        let aspect = transfer::readback_aspect(format);
        let mut data = vec![0; StagingLayout::new(format, rect.width, rect.height, 1, aspect).tight_size()];
        self.readback_into(&mut data, slice, mip, rect)?;
        Ok(ImageSlice {
            width: rect.width,
            height: rect.height,
            format,
            data,
        })
    }

    /// Like [`Texture::readback`], writing tightly packed rows into `dest`.
    ///
    /// Submits every pending command on the context, not just this
    /// texture's, and blocks until the device is done with them.
    pub fn readback_into(&self, dest: &mut [u8], slice: u32, mip: u32, rect: Rect) -> Result<(), Error> {
        let primary = self.primary()?;
        let format = self.settings.format;
        if !self.context.capabilities().supports_readback(format) {
            return Err(Error::unsupported(format!("readback of {format:?}")));
        }
        self.check_region(mip, slice, rect);
        if rect.is_empty() {
            return Ok(());
        }
        let aspect = transfer::readback_aspect(format);
        let layout = StagingLayout::new(
            format,
            rect.width,
            rect.height,
            self.context.capabilities().copy_row_alignment,
            aspect,
        );
        assert!(
            dest.len() >= layout.tight_size(),
            "destination of {} bytes cannot hold {}x{} {format:?}",
            dest.len(),
            rect.width,
            rect.height
        );
        let device = self.context.device();
        let buffer = device.create_readback_buffer(layout.staged_size() as u64, &self.settings.debug_name);
        device.encode(BlitCommand::CopyTextureToBuffer {
            texture: primary,
            target: transfer::copy_target(self.settings.kind, mip, slice, rect, aspect),
            buffer: &buffer,
            layout: layout.buffer_layout(),
        });
        let wait = logwise::perfwarn_begin!("texture readback waits on the pending batch");
        self.context.finish()?;
        drop(wait);
        let mut staged = vec![0; layout.staged_size()];
        device.read_buffer(&buffer, 0, &mut staged)?;
        layout.unpack(&staged, dest);
        Ok(())
    }

    fn buffer_layout(&self, offset: u64, width: u32, height: u32, aspect: TextureAspect) -> BufferLayout {
        let format = self.settings.format;
        let pitch = transfer::tight_row(format, width, aspect) as u32;
        let alignment = self.context.capabilities().copy_row_alignment.max(1);
        assert!(
            pitch % alignment == 0,
            "row pitch {pitch} of a {width}-wide {format:?} region is not a multiple of {alignment}"
        );
        BufferLayout {
            offset,
            bytes_per_row: pitch,
            rows_per_image: block_rows(format, height),
        }
    }

    /// Appends a copy from tightly packed rows at `offset` in `buffer`.
    ///
    /// The row pitch must satisfy the device's copy row alignment.
    pub fn copy_from_buffer(
        &self,
        buffer: &D::Buffer,
        offset: u64,
        mip: u32,
        slice: u32,
        rect: Rect,
    ) -> Result<(), Error> {
        let primary = self.primary()?;
        let format = self.settings.format;
        if !self.context.capabilities().supports_upload(format) {
            return Err(Error::unsupported(format!("copies into {format:?}")));
        }
        self.check_region(mip, slice, rect);
        let layout = self.buffer_layout(offset, rect.width, rect.height, TextureAspect::All);
        self.context.device().encode(BlitCommand::CopyBufferToTexture {
            buffer,
            layout,
            texture: primary,
            target: transfer::copy_target(self.settings.kind, mip, slice, rect, TextureAspect::All),
        });
        Ok(())
    }

    /// Appends a copy of `rect` into tightly packed rows at `offset` in `buffer`.
    pub fn copy_to_buffer(
        &self,
        buffer: &D::Buffer,
        offset: u64,
        slice: u32,
        mip: u32,
        rect: Rect,
    ) -> Result<(), Error> {
        let primary = self.primary()?;
        let format = self.settings.format;
        if !self.context.capabilities().supports_readback(format) {
            return Err(Error::unsupported(format!("copies out of {format:?}")));
        }
        self.check_region(mip, slice, rect);
        let aspect = transfer::readback_aspect(format);
        let layout = self.buffer_layout(offset, rect.width, rect.height, aspect);
        self.context.device().encode(BlitCommand::CopyTextureToBuffer {
            texture: primary,
            target: transfer::copy_target(self.settings.kind, mip, slice, rect, aspect),
            buffer,
            layout,
        });
        Ok(())
    }

    /// Records `state` and links the context's shared sampler for it.
    pub fn set_sampler_state(&mut self, state: SamplerState) {
        self.sampler_state = state;
        let sampler = self
            .context
            .sampler_cache()
            .resolve(self.context.device(), &state);
        self.sampler = Arc::downgrade(&sampler);
    }

    /// The shared sampler for the current state.
    pub fn sampler(&self) -> Arc<D::Sampler> {
        self.sampler.upgrade().unwrap_or_else(|| {
            self.context
                .sampler_cache()
                .resolve(self.context.device(), &self.sampler_state)
        })
    }

    /// Drops the native textures.  Later operations fail with [`Error::Released`].
    pub fn release(&mut self) {
        if self.primary.take().is_some() {
            logwise::trace_sync!(
                "released texture {name}",
                name = logwise::privacy::LogIt(&self.settings.debug_name)
            );
        }
        self.msaa_texture = None;
        self.sampler = Weak::new();
    }

    pub fn is_released(&self) -> bool {
        self.primary.is_none()
    }

    pub fn context(&self) -> &Arc<GraphicsContext<D>> {
        &self.context
    }

    pub fn settings(&self) -> &TextureSettings {
        &self.settings
    }

    pub fn kind(&self) -> TextureKind {
        self.settings.kind
    }

    pub fn width(&self, mip: u32) -> u32 {
        mip_dimension(self.settings.width, mip)
    }

    pub fn height(&self, mip: u32) -> u32 {
        mip_dimension(self.settings.height, mip)
    }

    /// Depth at `mip`; 1 for everything but volumes.
    pub fn depth(&self, mip: u32) -> u32 {
        mip_dimension(self.settings.volume_depth(), mip)
    }

    pub fn layer_count(&self) -> u32 {
        self.settings.array_layers()
    }

    pub fn slice_count(&self, mip: u32) -> u32 {
        self.settings.slice_count(mip)
    }

    pub fn mip_count(&self) -> u32 {
        self.settings.mip_count
    }

    pub fn format(&self) -> PixelFormat {
        self.settings.format
    }

    pub fn native_format(&self) -> NativeFormat {
        self.native_format
    }

    /// Whether the native texture is sampled as sRGB.
    pub fn is_srgb(&self) -> bool {
        self.native_format.srgb
    }

    pub fn requested_msaa(&self) -> u32 {
        self.settings.requested_msaa()
    }

    /// Sample count the device granted.
    pub fn msaa(&self) -> u32 {
        self.msaa
    }

    pub fn is_readable(&self) -> bool {
        self.settings.readable
    }

    pub fn is_render_target(&self) -> bool {
        self.settings.render_target
    }

    pub fn handle(&self) -> Option<&D::Texture> {
        self.primary.as_ref()
    }

    pub fn msaa_handle(&self) -> Option<&D::Texture> {
        self.msaa_texture.as_ref()
    }

    pub fn sampler_state(&self) -> SamplerState {
        self.sampler_state
    }

    pub fn debug_name(&self) -> &str {
        &self.settings.debug_name
    }
}

impl<D: Device> Drop for Texture<D> {
    fn drop(&mut self) {
        self.release();
    }
}
