// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! A software reference device.

Textures live in system memory and blit commands are recorded into a pending
batch exactly like a GPU backend would record them; nothing touches texture
memory until [`Device::submit`].  The device is configurable (MSAA support,
memory budget, copy alignment) and instrumented (statistics, a copy log, live
handle counts), which makes it the device of choice for headless tests.

```
use native_texture::imp::soft::SoftDevice;
use native_texture::images::GraphicsContext;
use native_texture::bindings::{Rect, TextureSettings};
use native_texture::images::texture::Texture;
use native_texture::pixel_formats::PixelFormat;
use std::sync::Arc;

let context = Arc::new(GraphicsContext::new(SoftDevice::new()));
let settings = TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm);
let texture = Texture::new(&context, settings, None).unwrap();
let image = texture.readback(0, 0, Rect::full(4, 4)).unwrap();
assert_eq!(image.data, vec![0; 64]);
```
*/

mod mipmaps;
mod storage;

use crate::bindings::sampler::SamplerState;
use crate::bindings::visible_to::{BufferUsages, TextureUsages};
use crate::error::Error;
use crate::imp::{
    BlitCommand, BufferLayout, Capabilities, CopyTarget, Device, NativeKind, TextureDescriptor,
};
use crate::pixel_formats::NativeFormat;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use storage::TextureStorage;

/// Configuration of a [`SoftDevice`].
#[derive(Debug, Clone)]
pub struct SoftDeviceConfig {
    pub capabilities: Capabilities,
    /// MSAA sample counts the device supports, in any order.  1 is implied.
    pub sample_counts: Vec<u32>,
    /// Total texture bytes the device may hold; `None` is unlimited.
    pub memory_budget: Option<u64>,
}

impl Default for SoftDeviceConfig {
    fn default() -> Self {
        SoftDeviceConfig {
            capabilities: Capabilities::full(),
            sample_counts: vec![1, 2, 4, 8],
            memory_budget: None,
        }
    }
}

/// Counters describing what the device has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftStats {
    pub submissions: u64,
    pub waits: u64,
    pub buffer_to_texture_copies: u64,
    pub texture_to_buffer_copies: u64,
    pub mipmap_generations: u64,
    pub clears: u64,
    pub samplers_created: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDirection {
    BufferToTexture,
    TextureToBuffer,
}

/// One executed copy, as addressed on the texture side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyRecord {
    pub direction: CopyDirection,
    pub texture_id: u64,
    pub target: CopyTarget,
    pub layout: BufferLayout,
}

#[derive(Debug, Default)]
struct Allocations {
    live_textures: AtomicUsize,
    bytes: AtomicU64,
}

/// A texture allocated by a [`SoftDevice`].
#[derive(Debug)]
pub struct SoftTexture {
    id: u64,
    kind: NativeKind,
    format: NativeFormat,
    usage: TextureUsages,
    sample_count: u32,
    size: u64,
    storage: Arc<Mutex<TextureStorage>>,
    allocations: Arc<Allocations>,
}

impl SoftTexture {
    pub fn id(&self) -> u64 {
        self.id
    }
    pub fn kind(&self) -> NativeKind {
        self.kind
    }
    pub fn format(&self) -> NativeFormat {
        self.format
    }
    pub fn usage(&self) -> TextureUsages {
        self.usage
    }
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
    pub fn mip_count(&self) -> u32 {
        lock(&self.storage).mip_count()
    }
}

impl Drop for SoftTexture {
    fn drop(&mut self) {
        self.allocations.live_textures.fetch_sub(1, Ordering::Relaxed);
        self.allocations.bytes.fetch_sub(self.size, Ordering::Relaxed);
    }
}

/// A linear buffer in system memory.
#[derive(Debug, Clone)]
pub struct SoftBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
    usage: BufferUsages,
}

impl SoftBuffer {
    pub fn len(&self) -> usize {
        lock(&self.bytes).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn usage(&self) -> BufferUsages {
        self.usage
    }

    /// Writes from the CPU immediately; not ordered with pending commands.
    pub fn write(&self, offset: usize, data: &[u8]) {
        lock(&self.bytes)[offset..offset + data.len()].copy_from_slice(data);
    }

    /// A snapshot of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.bytes).clone()
    }
}

#[derive(Debug)]
pub struct SoftSampler {
    pub state: SamplerState,
    pub id: u64,
}

/// Token for a submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftBatch(u64);

#[derive(Debug)]
enum SoftCommand {
    BufferToTexture {
        buffer: Arc<Mutex<Vec<u8>>>,
        layout: BufferLayout,
        texture: Arc<Mutex<TextureStorage>>,
        texture_id: u64,
        target: CopyTarget,
    },
    TextureToBuffer {
        texture: Arc<Mutex<TextureStorage>>,
        texture_id: u64,
        target: CopyTarget,
        buffer: Arc<Mutex<Vec<u8>>>,
        layout: BufferLayout,
    },
    GenerateMipmaps {
        texture: Arc<Mutex<TextureStorage>>,
    },
    Clear {
        texture: Arc<Mutex<TextureStorage>>,
        mip: u32,
        array_layer: u32,
        z: u32,
    },
}

#[derive(Debug, Default)]
struct SoftState {
    pending: Vec<SoftCommand>,
    submitted: u64,
    stats: SoftStats,
    copy_log: Vec<CopyRecord>,
}

/// The software device.  See the [module documentation](self).
#[derive(Debug)]
pub struct SoftDevice {
    config: SoftDeviceConfig,
    state: Mutex<SoftState>,
    allocations: Arc<Allocations>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for SoftDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftDevice {
    pub fn new() -> Self {
        Self::with_config(SoftDeviceConfig::default())
    }

    pub fn with_config(config: SoftDeviceConfig) -> Self {
        logwise::info_sync!(
            "soft device: sample counts {counts}, budget {budget}",
            counts = logwise::privacy::LogIt(&config.sample_counts),
            budget = logwise::privacy::LogIt(&config.memory_budget)
        );
        SoftDevice {
            config,
            state: Mutex::new(SoftState::default()),
            allocations: Arc::new(Allocations::default()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn stats(&self) -> SoftStats {
        lock(&self.state).stats
    }

    /// Commands encoded but not yet submitted.
    pub fn pending_commands(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Every copy executed so far, in execution order.
    pub fn copy_log(&self) -> Vec<CopyRecord> {
        lock(&self.state).copy_log.clone()
    }

    pub fn live_textures(&self) -> usize {
        self.allocations.live_textures.load(Ordering::Relaxed)
    }

    pub fn allocated_bytes(&self) -> u64 {
        self.allocations.bytes.load(Ordering::Relaxed)
    }

    /// Raw bytes of one slice of one mip level, bypassing the command stream.
    pub fn inspect_slice(&self, texture: &SoftTexture, mip: u32, array_layer: u32, z: u32) -> Vec<u8> {
        let storage = lock(&texture.storage);
        let start = storage.slice_offset(mip, array_layer, z);
        let (w, h, _) = storage.extent(mip);
        let len = crate::pixel_formats::slice_size(storage.format, w, h);
        storage.levels[mip as usize][start..start + len].to_vec()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn reserve(&self, size: u64) -> bool {
        let Some(budget) = self.config.memory_budget else {
            self.allocations.bytes.fetch_add(size, Ordering::Relaxed);
            return true;
        };
        self.allocations
            .bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                used.checked_add(size).filter(|total| *total <= budget)
            })
            .is_ok()
    }

    fn execute(state: &mut SoftState, command: SoftCommand) {
        match command {
            SoftCommand::BufferToTexture {
                buffer,
                layout,
                texture,
                texture_id,
                target,
            } => {
                let source = lock(&buffer);
                lock(&texture).write(&target, &layout, &source);
                state.stats.buffer_to_texture_copies += 1;
                state.copy_log.push(CopyRecord {
                    direction: CopyDirection::BufferToTexture,
                    texture_id,
                    target,
                    layout,
                });
            }
            SoftCommand::TextureToBuffer {
                texture,
                texture_id,
                target,
                buffer,
                layout,
            } => {
                let mut destination = lock(&buffer);
                lock(&texture).read(&target, &layout, &mut destination);
                state.stats.texture_to_buffer_copies += 1;
                state.copy_log.push(CopyRecord {
                    direction: CopyDirection::TextureToBuffer,
                    texture_id,
                    target,
                    layout,
                });
            }
            SoftCommand::GenerateMipmaps { texture } => {
                mipmaps::generate(&mut lock(&texture));
                state.stats.mipmap_generations += 1;
            }
            SoftCommand::Clear {
                texture,
                mip,
                array_layer,
                z,
            } => {
                lock(&texture).clear(mip, array_layer, z);
                state.stats.clears += 1;
            }
        }
    }
}

impl Device for SoftDevice {
    type Texture = SoftTexture;
    type Buffer = SoftBuffer;
    type Sampler = SoftSampler;
    type Batch = SoftBatch;

    fn capabilities(&self) -> &Capabilities {
        &self.config.capabilities
    }

    fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Option<SoftTexture> {
        let size = TextureStorage::byte_size(descriptor);
        if !self.reserve(size) {
            logwise::warn_sync!(
                "soft device: {size} bytes for {label} exceeds the memory budget",
                size = size,
                label = logwise::privacy::LogIt(&descriptor.label)
            );
            return None;
        }
        self.allocations.live_textures.fetch_add(1, Ordering::Relaxed);
        Some(SoftTexture {
            id: self.next_id(),
            kind: descriptor.kind,
            format: descriptor.format,
            usage: descriptor.usage,
            sample_count: descriptor.sample_count,
            size,
            storage: Arc::new(Mutex::new(TextureStorage::new(descriptor))),
            allocations: self.allocations.clone(),
        })
    }

    fn closest_sample_count(&self, format: NativeFormat, requested: u32) -> u32 {
        if format.format.is_compressed() {
            return 1;
        }
        self.config
            .sample_counts
            .iter()
            .copied()
            .filter(|count| *count >= 1 && *count <= requested)
            .max()
            .unwrap_or(1)
    }

    fn create_buffer(&self, size: u64, usage: BufferUsages, _label: &str) -> Option<SoftBuffer> {
        Some(SoftBuffer {
            bytes: Arc::new(Mutex::new(vec![0; usize::try_from(size).ok()?])),
            usage,
        })
    }

    fn create_upload_buffer(&self, contents: &[u8], _label: &str) -> SoftBuffer {
        SoftBuffer {
            bytes: Arc::new(Mutex::new(contents.to_vec())),
            usage: BufferUsages::COPY_SRC,
        }
    }

    fn create_readback_buffer(&self, size: u64, _label: &str) -> SoftBuffer {
        SoftBuffer {
            bytes: Arc::new(Mutex::new(vec![0; size as usize])),
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
        }
    }

    fn read_buffer(&self, buffer: &SoftBuffer, offset: u64, out: &mut [u8]) -> Result<(), Error> {
        let bytes = lock(&buffer.bytes);
        let start = offset as usize;
        let end = start + out.len();
        if end > bytes.len() {
            return Err(Error::Device(format!(
                "read of {}..{end} past buffer of {} bytes",
                start,
                bytes.len()
            )));
        }
        out.copy_from_slice(&bytes[start..end]);
        Ok(())
    }

    fn encode(&self, command: BlitCommand<'_, Self>) {
        let command = match command {
            BlitCommand::CopyBufferToTexture {
                buffer,
                layout,
                texture,
                target,
            } => SoftCommand::BufferToTexture {
                buffer: buffer.bytes.clone(),
                layout,
                texture: texture.storage.clone(),
                texture_id: texture.id,
                target,
            },
            BlitCommand::CopyTextureToBuffer {
                texture,
                target,
                buffer,
                layout,
            } => SoftCommand::TextureToBuffer {
                texture: texture.storage.clone(),
                texture_id: texture.id,
                target,
                buffer: buffer.bytes.clone(),
                layout,
            },
            BlitCommand::GenerateMipmaps { texture } => SoftCommand::GenerateMipmaps {
                texture: texture.storage.clone(),
            },
            BlitCommand::Clear {
                texture,
                mip,
                array_layer,
                z,
            } => SoftCommand::Clear {
                texture: texture.storage.clone(),
                mip,
                array_layer,
                z,
            },
        };
        lock(&self.state).pending.push(command);
    }

    fn submit(&self) -> SoftBatch {
        let mut state = lock(&self.state);
        let pending = std::mem::take(&mut state.pending);
        logwise::trace_sync!("soft device: executing {count} commands", count = pending.len());
        for command in pending {
            Self::execute(&mut state, command);
        }
        state.submitted += 1;
        state.stats.submissions += 1;
        SoftBatch(state.submitted)
    }

    fn wait(&self, batch: &SoftBatch) -> Result<(), Error> {
        let mut state = lock(&self.state);
        state.stats.waits += 1;
        if batch.0 > state.submitted {
            return Err(Error::Device(format!("batch {} was never submitted", batch.0)));
        }
        Ok(())
    }

    fn create_sampler(&self, state: &SamplerState) -> SoftSampler {
        lock(&self.state).stats.samplers_created += 1;
        SoftSampler {
            state: *state,
            id: self.next_id(),
        }
    }
}
