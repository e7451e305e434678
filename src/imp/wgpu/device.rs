// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use super::SetupError;
use super::entry_point::EntryPoint;
use super::mipmap::MipmapGenerator;
use super::pixel_format::{capabilities, wanted_features, wgpu_format};
use super::sampler::{WgpuSampler, descriptor as sampler_descriptor};
use crate::bindings::sampler::SamplerState;
use crate::bindings::visible_to::{BufferUsages, TextureUsages};
use crate::error::Error;
use crate::imp::{
    BlitCommand, BufferLayout, Capabilities, CopyTarget, Device, NativeKind, TextureAspect,
    TextureDescriptor,
};
use crate::pixel_formats::NativeFormat;
use std::sync::{Mutex, MutexGuard, PoisonError};
use wgpu::util::DeviceExt;
use wgpu::{Extent3d, Origin3d, PollType, TexelCopyBufferInfo, TexelCopyBufferLayout, TexelCopyTextureInfo};

#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    kind: NativeKind,
}

impl WgpuTexture {
    pub fn wgpu_texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn kind(&self) -> NativeKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
}

impl WgpuBuffer {
    pub fn wgpu_buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[derive(Debug, Clone)]
pub struct WgpuBatch(wgpu::SubmissionIndex);

/// A wgpu device, queue and the encoder currently collecting blits.
#[derive(Debug)]
pub struct WgpuDevice {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    capabilities: Capabilities,
    pending: Mutex<Option<wgpu::CommandEncoder>>,
    mipmaps: MipmapGenerator,
}

fn wgpu_usage(usage: TextureUsages) -> wgpu::TextureUsages {
    let mut out = wgpu::TextureUsages::empty();
    if usage.contains(TextureUsages::SHADER_READ) {
        out |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usage.contains(TextureUsages::RENDER_TARGET) {
        out |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    if usage.contains(TextureUsages::COPY_SRC) {
        out |= wgpu::TextureUsages::COPY_SRC;
    }
    if usage.contains(TextureUsages::COPY_DST) {
        out |= wgpu::TextureUsages::COPY_DST;
    }
    out
}

fn wgpu_buffer_usage(usage: BufferUsages) -> wgpu::BufferUsages {
    let mut out = wgpu::BufferUsages::empty();
    if usage.contains(BufferUsages::COPY_SRC) {
        out |= wgpu::BufferUsages::COPY_SRC;
    }
    if usage.contains(BufferUsages::COPY_DST) {
        out |= wgpu::BufferUsages::COPY_DST;
    }
    if usage.contains(BufferUsages::MAP_READ) {
        out |= wgpu::BufferUsages::MAP_READ;
    }
    out
}

fn aspect(aspect: TextureAspect) -> wgpu::TextureAspect {
    match aspect {
        TextureAspect::All => wgpu::TextureAspect::All,
        TextureAspect::DepthOnly => wgpu::TextureAspect::DepthOnly,
    }
}

fn texture_info<'a>(texture: &'a WgpuTexture, target: &CopyTarget) -> TexelCopyTextureInfo<'a> {
    //2D kinds address slices by layer, volumes by depth
    let z = match texture.kind {
        NativeKind::D3 => target.z,
        _ => target.array_layer,
    };
    TexelCopyTextureInfo {
        texture: &texture.texture,
        mip_level: target.mip,
        origin: Origin3d {
            x: target.x,
            y: target.y,
            z,
        },
        aspect: aspect(target.aspect),
    }
}

/// Copy extent, rounded out to whole blocks for compressed formats.
fn extent(texture: &WgpuTexture, target: &CopyTarget) -> Extent3d {
    let (bw, bh) = texture.texture.format().block_dimensions();
    Extent3d {
        width: target.width.div_ceil(bw) * bw,
        height: target.height.div_ceil(bh) * bh,
        depth_or_array_layers: 1,
    }
}

fn buffer_info<'a>(buffer: &'a WgpuBuffer, layout: &BufferLayout) -> TexelCopyBufferInfo<'a> {
    TexelCopyBufferInfo {
        buffer: &buffer.buffer,
        layout: TexelCopyBufferLayout {
            offset: layout.offset,
            bytes_per_row: Some(layout.bytes_per_row),
            rows_per_image: Some(layout.rows_per_image),
        },
    }
}

impl WgpuDevice {
    /// Wraps an already-created device.  Capabilities come from the device's
    /// enabled features and limits.
    pub fn from_parts(adapter: wgpu::Adapter, device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let capabilities = capabilities(device.features(), &device.limits());
        logwise::info_sync!(
            "wgpu device on {adapter}",
            adapter = logwise::privacy::LogIt(&adapter.get_info().name)
        );
        let mipmaps = MipmapGenerator::new(&device);
        WgpuDevice {
            adapter,
            device,
            queue,
            capabilities,
            pending: Mutex::new(None),
            mipmaps,
        }
    }

    /// Creates a device without a surface, enabling every optional texture
    /// feature the adapter offers.
    pub fn headless(entry_point: &EntryPoint) -> Result<Self, SetupError> {
        let adapter = entry_point.headless_adapter()?;
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("native_texture"),
            required_features: adapter.features() & wanted_features(),
            required_limits: adapter.limits(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        };
        let (device, queue) = test_executors::spin_on(adapter.request_device(&descriptor))?;
        Ok(Self::from_parts(adapter, device, queue))
    }

    pub fn wgpu_device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn wgpu_queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn pending(&self) -> MutexGuard<'_, Option<wgpu::CommandEncoder>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the pending encoder, creating it first if needed.
    fn with_encoder(&self, f: impl FnOnce(&mut wgpu::CommandEncoder)) {
        let mut pending = self.pending();
        let encoder = pending.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("blit") })
        });
        f(encoder);
    }

    fn clear(&self, encoder: &mut wgpu::CommandEncoder, texture: &WgpuTexture, mip: u32, layer: u32, z: u32) {
        let format = texture.texture.format();
        assert!(
            texture.kind != NativeKind::D3 && z == 0,
            "slices of volume textures are not clearable on this device"
        );
        let view = texture.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("clear"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: mip,
            mip_level_count: Some(1),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        });
        if format.is_depth_stencil_format() {
            let stencil_ops = format.has_stencil_aspect().then_some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Store,
            });
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        } else {
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
    }
}

impl Device for WgpuDevice {
    type Texture = WgpuTexture;
    type Buffer = WgpuBuffer;
    type Sampler = WgpuSampler;
    type Batch = WgpuBatch;

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Option<WgpuTexture> {
        let format = wgpu_format(descriptor.format);
        let mut usage = wgpu_usage(descriptor.usage);
        if descriptor.kind == NativeKind::D2Multisample {
            usage -= wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;
        } else {
            //mip blits and depth clears are render passes
            let blit_target = descriptor.mip_count > 1
                && descriptor.format.format.is_color_renderable()
                && descriptor.kind != NativeKind::D3;
            if blit_target || descriptor.format.format.is_depth_stencil() {
                usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
            }
            if blit_target {
                usage |= wgpu::TextureUsages::TEXTURE_BINDING;
            }
        }
        let (dimension, depth_or_array_layers) = match descriptor.kind {
            NativeKind::D3 => (wgpu::TextureDimension::D3, descriptor.depth),
            _ => (wgpu::TextureDimension::D2, descriptor.array_layers),
        };
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(descriptor.label),
            size: Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers,
            },
            mip_level_count: descriptor.mip_count,
            sample_count: descriptor.sample_count,
            dimension,
            format,
            usage,
            view_formats: &[],
        });
        let validation = test_executors::spin_on(self.device.pop_error_scope());
        let out_of_memory = test_executors::spin_on(self.device.pop_error_scope());
        if let Some(error) = validation.or(out_of_memory) {
            logwise::error_sync!(
                "wgpu refused texture {label}: {error}",
                label = logwise::privacy::LogIt(&descriptor.label),
                error = logwise::privacy::LogIt(&error.to_string())
            );
            return None;
        }
        Some(WgpuTexture {
            texture,
            kind: descriptor.kind,
        })
    }

    fn closest_sample_count(&self, format: NativeFormat, requested: u32) -> u32 {
        let format = wgpu_format(format);
        let features = if self
            .device
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
        {
            self.adapter.get_texture_format_features(format)
        } else {
            format.guaranteed_format_features(self.device.features())
        };
        [16, 8, 4, 2]
            .into_iter()
            .find(|count| *count <= requested && features.flags.sample_count_supported(*count))
            .unwrap_or(1)
    }

    fn create_buffer(&self, size: u64, usage: BufferUsages, label: &str) -> Option<WgpuBuffer> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: wgpu_buffer_usage(usage),
            mapped_at_creation: false,
        });
        match test_executors::spin_on(self.device.pop_error_scope()) {
            Some(_) => None,
            None => Some(WgpuBuffer { buffer }),
        }
    }

    fn create_upload_buffer(&self, contents: &[u8], label: &str) -> WgpuBuffer {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::COPY_SRC,
        });
        WgpuBuffer { buffer }
    }

    fn create_readback_buffer(&self, size: u64, label: &str) -> WgpuBuffer {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        WgpuBuffer { buffer }
    }

    fn read_buffer(&self, buffer: &WgpuBuffer, offset: u64, out: &mut [u8]) -> Result<(), Error> {
        let slice = buffer.buffer.slice(offset..offset + out.len() as u64);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(PollType::Wait)
            .map_err(|e| Error::Device(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| Error::Device(e.to_string()))?
            .map_err(|e| Error::Device(e.to_string()))?;
        out.copy_from_slice(&slice.get_mapped_range());
        buffer.buffer.unmap();
        Ok(())
    }

    fn encode(&self, command: BlitCommand<'_, Self>) {
        self.with_encoder(|encoder| match command {
            BlitCommand::CopyBufferToTexture {
                buffer,
                layout,
                texture,
                target,
            } => encoder.copy_buffer_to_texture(
                buffer_info(buffer, &layout),
                texture_info(texture, &target),
                extent(texture, &target),
            ),
            BlitCommand::CopyTextureToBuffer {
                texture,
                target,
                buffer,
                layout,
            } => encoder.copy_texture_to_buffer(
                texture_info(texture, &target),
                buffer_info(buffer, &layout),
                extent(texture, &target),
            ),
            BlitCommand::GenerateMipmaps { texture } => {
                self.mipmaps.generate(&self.device, encoder, &texture.texture)
            }
            BlitCommand::Clear {
                texture,
                mip,
                array_layer,
                z,
            } => self.clear(encoder, texture, mip, array_layer, z),
        });
    }

    fn submit(&self) -> WgpuBatch {
        let encoder = self.pending().take();
        let commands = encoder.map(wgpu::CommandEncoder::finish);
        WgpuBatch(self.queue.submit(commands))
    }

    fn wait(&self, batch: &WgpuBatch) -> Result<(), Error> {
        self.device
            .poll(PollType::WaitForSubmissionIndex(batch.0.clone()))
            .map(|_| ())
            .map_err(|e| Error::Device(e.to_string()))
    }

    fn create_sampler(&self, state: &SamplerState) -> WgpuSampler {
        WgpuSampler {
            sampler: self.device.create_sampler(&sampler_descriptor(state)),
        }
    }
}
