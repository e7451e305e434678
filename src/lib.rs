// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! native_texture turns an engine-neutral texture description into a native
GPU texture and moves data in and out of it.

A texture is described once, with [`TextureSettings`](bindings::TextureSettings):
kind (2D, array, volume, cube), dimensions, [`PixelFormat`](pixel_formats::PixelFormat),
sRGB, mip count, MSAA and usage.  [`Texture::new`](images::Texture::new) allocates
the native texture (plus a multisampled companion when the device grants MSAA),
fills it from optional initial data or with zeros, and derives missing mip
levels.  After that the texture supports:

| Operation            | Blocks? | Notes                                                  |
|----------------------|---------|--------------------------------------------------------|
| `upload_bytes`       | no      | staged through a transfer buffer, repacked if needed   |
| `copy_from_buffer`   | no      | from a caller-owned device buffer                      |
| `copy_to_buffer`     | no      | into a caller-owned device buffer                      |
| `generate_mipmaps`   | no      | box/linear filtered from level 0                       |
| `readback`           | yes     | submits the whole pending batch and waits              |
| `set_sampler_state`  | no      | resolved through a shared, value-keyed sampler cache   |

# Backends

Every native call goes through the [`Device`](imp::Device) trait.

* [`imp::soft::SoftDevice`] keeps textures in system memory and executes
  batches on the CPU.  It is always available and is configurable enough
  (MSAA support, memory budget, copy row alignment) to exercise every path.
* `imp::wgpu::WgpuDevice` (feature `backend_wgpu`, on by default) records into
  a wgpu command encoder.

```
use native_texture::bindings::{Rect, TextureSettings};
use native_texture::images::{GraphicsContext, Texture};
use native_texture::imp::soft::SoftDevice;
use native_texture::pixel_formats::PixelFormat;
use std::sync::Arc;

let context = Arc::new(GraphicsContext::new(SoftDevice::new()));
let texture = Texture::new(&context, TextureSettings::new_2d(4, 4, PixelFormat::Rgba8Unorm), None)?;
assert_eq!(texture.readback(0, 0, Rect::full(4, 4))?.data, vec![0; 64]);
# Ok::<(), native_texture::Error>(())
```
*/

pub mod bindings;
mod error;
pub mod images;
pub mod imp;
pub mod pixel_formats;

pub use error::Error;
