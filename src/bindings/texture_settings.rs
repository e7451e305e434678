// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Engine-neutral texture descriptions.

use crate::bindings::coordinates::{full_mip_count, mip_dimension};
use crate::bindings::sampler::SamplerState;
use crate::error::Error;
use crate::imp::Capabilities;
use crate::pixel_formats::PixelFormat;

/// Shape of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Tex2D,
    Tex2DArray,
    /// A 3D texture; slices address depth layers.
    Volume,
    /// Six square faces.
    Cube,
}

/// Complete description of a texture resource.
///
/// `depth` only applies to [`TextureKind::Volume`] and `layers` only to
/// [`TextureKind::Tex2DArray`]; both are treated as 1 elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSettings {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub layers: u32,
    pub mip_count: u32,
    pub format: PixelFormat,
    pub srgb: bool,
    pub readable: bool,
    pub render_target: bool,
    /// Requested MSAA sample count.  The device may grant fewer.
    pub msaa: u32,
    pub sampler: SamplerState,
    pub debug_name: String,
}

impl TextureSettings {
    /// A readable single-level 2D texture.
    pub fn new_2d(width: u32, height: u32, format: PixelFormat) -> Self {
        TextureSettings {
            kind: TextureKind::Tex2D,
            width,
            height,
            depth: 1,
            layers: 1,
            mip_count: 1,
            format,
            srgb: false,
            readable: true,
            render_target: false,
            msaa: 1,
            sampler: SamplerState::default(),
            debug_name: String::new(),
        }
    }

    pub fn builder(kind: TextureKind, width: u32, height: u32, format: PixelFormat) -> TextureSettingsBuilder {
        TextureSettingsBuilder {
            settings: TextureSettings {
                kind,
                ..TextureSettings::new_2d(width, height, format)
            },
        }
    }

    /// Depth of a volume texture (1 for other kinds).
    pub fn volume_depth(&self) -> u32 {
        match self.kind {
            TextureKind::Volume => self.depth,
            _ => 1,
        }
    }

    /// Native array length: layers for arrays, 6 for cubes, 1 otherwise.
    pub fn array_layers(&self) -> u32 {
        match self.kind {
            TextureKind::Tex2DArray => self.layers,
            TextureKind::Cube => 6,
            TextureKind::Tex2D | TextureKind::Volume => 1,
        }
    }

    /// Addressable slices at `mip`: depth layers for volumes, array layers,
    /// cube faces, or 1 for plain 2D textures.
    pub fn slice_count(&self, mip: u32) -> u32 {
        match self.kind {
            TextureKind::Volume => mip_dimension(self.depth, mip),
            _ => self.array_layers(),
        }
    }

    /// Requested sample count with 0 treated as 1.
    pub fn requested_msaa(&self) -> u32 {
        self.msaa.max(1)
    }

    /// Checks the settings against themselves and against device limits.
    pub fn validate(&self, capabilities: &Capabilities) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::InvalidSettings(msg));
        if self.width == 0 || self.height == 0 {
            return invalid(format!("{}x{} has a zero dimension", self.width, self.height));
        }
        if self.kind == TextureKind::Volume && self.depth == 0 {
            return invalid("volume texture with zero depth".to_string());
        }
        if self.kind == TextureKind::Tex2DArray && self.layers == 0 {
            return invalid("array texture with zero layers".to_string());
        }
        if self.kind == TextureKind::Cube && self.width != self.height {
            return invalid(format!("cube faces must be square, got {}x{}", self.width, self.height));
        }
        let full = full_mip_count(self.width, self.height, self.volume_depth());
        if self.mip_count == 0 || self.mip_count > full {
            return invalid(format!("mip count {} outside 1..={full}", self.mip_count));
        }
        if !self.readable && self.mip_count > 1 {
            return invalid("non-readable textures cannot have mipmaps".to_string());
        }
        if self.format.is_compressed() && self.render_target {
            return invalid(format!("{:?} cannot be a render target", self.format));
        }
        if self.format.is_depth_stencil() && self.kind == TextureKind::Volume {
            return invalid(format!("{:?} cannot be a volume texture", self.format));
        }
        if self.requested_msaa() > 1 {
            if self.kind != TextureKind::Tex2D {
                return invalid(format!("MSAA requires a 2D texture, got {:?}", self.kind));
            }
            if !self.render_target {
                return invalid("MSAA requires a render target".to_string());
            }
            if self.mip_count > 1 {
                return invalid("MSAA textures cannot have mipmaps".to_string());
            }
        }
        let max_extent = match self.kind {
            TextureKind::Volume => capabilities.max_texture_dimension_3d,
            _ => capabilities.max_texture_dimension_2d,
        };
        if self.width.max(self.height).max(self.volume_depth()) > max_extent {
            return invalid(format!(
                "{}x{}x{} exceeds device limit {max_extent}",
                self.width,
                self.height,
                self.volume_depth()
            ));
        }
        if self.array_layers() > capabilities.max_array_layers {
            return invalid(format!(
                "{} layers exceeds device limit {}",
                self.array_layers(),
                capabilities.max_array_layers
            ));
        }
        Ok(())
    }
}

/// Fluent construction of [`TextureSettings`].
#[derive(Debug, Clone)]
pub struct TextureSettingsBuilder {
    settings: TextureSettings,
}

impl TextureSettingsBuilder {
    pub fn depth(mut self, depth: u32) -> Self {
        self.settings.depth = depth;
        self
    }

    pub fn layers(mut self, layers: u32) -> Self {
        self.settings.layers = layers;
        self
    }

    pub fn mip_count(mut self, mip_count: u32) -> Self {
        self.settings.mip_count = mip_count;
        self
    }

    /// Request every level down to 1x1.
    pub fn full_mip_chain(mut self) -> Self {
        let s = &self.settings;
        self.settings.mip_count = full_mip_count(s.width, s.height, s.volume_depth());
        self
    }

    pub fn srgb(mut self, srgb: bool) -> Self {
        self.settings.srgb = srgb;
        self
    }

    pub fn readable(mut self, readable: bool) -> Self {
        self.settings.readable = readable;
        self
    }

    pub fn render_target(mut self, render_target: bool) -> Self {
        self.settings.render_target = render_target;
        self
    }

    pub fn msaa(mut self, msaa: u32) -> Self {
        self.settings.msaa = msaa;
        self
    }

    pub fn sampler(mut self, sampler: SamplerState) -> Self {
        self.settings.sampler = sampler;
        self
    }

    pub fn debug_name(mut self, debug_name: &str) -> Self {
        self.settings.debug_name = debug_name.to_string();
        self
    }

    pub fn build(self) -> TextureSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> Capabilities {
        Capabilities::full()
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn slice_counts_by_kind() {
        let volume = TextureSettings::builder(TextureKind::Volume, 8, 8, PixelFormat::R8Unorm)
            .depth(4)
            .build();
        assert_eq!(volume.slice_count(0), 4);
        assert_eq!(volume.slice_count(1), 2);
        assert_eq!(volume.array_layers(), 1);

        let array = TextureSettings::builder(TextureKind::Tex2DArray, 8, 8, PixelFormat::R8Unorm)
            .layers(3)
            .build();
        assert_eq!(array.slice_count(2), 3);

        let cube = TextureSettings::builder(TextureKind::Cube, 8, 8, PixelFormat::R8Unorm).build();
        assert_eq!(cube.slice_count(0), 6);

        let plain = TextureSettings::new_2d(8, 8, PixelFormat::R8Unorm);
        assert_eq!(plain.slice_count(0), 1);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn rejects_mipmapped_unreadable() {
        let settings = TextureSettings::builder(TextureKind::Tex2D, 8, 8, PixelFormat::Rgba8Unorm)
            .readable(false)
            .render_target(true)
            .mip_count(2)
            .build();
        assert!(matches!(settings.validate(&caps()), Err(Error::InvalidSettings(_))));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn rejects_too_many_mips() {
        let settings = TextureSettings::builder(TextureKind::Tex2D, 4, 4, PixelFormat::Rgba8Unorm)
            .mip_count(4)
            .build();
        assert!(settings.validate(&caps()).is_err());
        let settings = TextureSettings::builder(TextureKind::Tex2D, 4, 4, PixelFormat::Rgba8Unorm)
            .full_mip_chain()
            .build();
        assert_eq!(settings.mip_count, 3);
        assert!(settings.validate(&caps()).is_ok());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn rejects_non_square_cube_and_msaa_arrays() {
        let cube = TextureSettings::builder(TextureKind::Cube, 8, 4, PixelFormat::Rgba8Unorm).build();
        assert!(cube.validate(&caps()).is_err());
        let array = TextureSettings::builder(TextureKind::Tex2DArray, 8, 8, PixelFormat::Rgba8Unorm)
            .layers(2)
            .render_target(true)
            .msaa(4)
            .build();
        assert!(array.validate(&caps()).is_err());
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn rejects_dimensions_over_the_limit() {
        let mut limited = caps();
        limited.max_texture_dimension_2d = 16;
        let settings = TextureSettings::new_2d(32, 8, PixelFormat::R8Unorm);
        assert!(settings.validate(&limited).is_err());
        assert!(settings.validate(&caps()).is_ok());
    }
}
