// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Usage declarations for native texture allocations.
//!
//! The engine describes a texture with two switches, "readable by shaders" and
//! "usable as a render target".  Backends receive the OR of the corresponding
//! [`TextureUsages`] flags plus the copy usages every texture in this crate needs.
//!
//! ```
//! use native_texture::bindings::visible_to::TextureUsages;
//!
//! let usage = TextureUsages::from_settings(true, false);
//! assert!(usage.contains(TextureUsages::SHADER_READ));
//! assert!(!usage.contains(TextureUsages::RENDER_TARGET));
//! ```

bitflags::bitflags! {
    /// How a native texture will be accessed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsages: u32 {
        /// Sampled or read in shaders.
        const SHADER_READ = 1 << 0;
        /// Bound as a colour or depth attachment.
        const RENDER_TARGET = 1 << 1;
        /// Source of blit copies.
        const COPY_SRC = 1 << 2;
        /// Destination of blit copies.
        const COPY_DST = 1 << 3;
    }
}

impl TextureUsages {
    /// Usage for a texture described by the engine's readable/render-target switches.
    pub fn from_settings(readable: bool, render_target: bool) -> Self {
        let mut usage = TextureUsages::COPY_SRC | TextureUsages::COPY_DST;
        if readable {
            usage |= TextureUsages::SHADER_READ;
        }
        if render_target {
            usage |= TextureUsages::RENDER_TARGET;
        }
        usage
    }

    /// Usage of an MSAA companion: a render target that shaders never read.
    pub fn multisampled(self) -> Self {
        (self | TextureUsages::RENDER_TARGET) - TextureUsages::SHADER_READ
    }
}

bitflags::bitflags! {
    /// How a linear buffer will be accessed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsages: u32 {
        const COPY_SRC = 1 << 0;
        const COPY_DST = 1 << 1;
        /// CPU can map the buffer for reading after GPU work completes.
        const MAP_READ = 1 << 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn msaa_usage_drops_shader_read() {
        let usage = TextureUsages::from_settings(true, false).multisampled();
        assert!(!usage.contains(TextureUsages::SHADER_READ));
        assert!(usage.contains(TextureUsages::RENDER_TARGET));
    }
}
