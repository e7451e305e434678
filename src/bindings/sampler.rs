// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Sampler-state descriptors.
//!
//! A [`SamplerState`] is a plain value.  Textures never own a native sampler;
//! they resolve their state through the context's
//! [`SamplerCache`](crate::images::sampler_cache::SamplerCache), so equal
//! states share one native object.

use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Clamp,
    Repeat,
    MirroredRepeat,
}

/// Depth comparison used by shadow samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareMode {
    Never,
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
    NotEqual,
    Always,
}

/// Everything that determines a native sampler.
#[derive(Debug, Clone, Copy)]
pub struct SamplerState {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// `None` disables filtering between mip levels.
    pub mipmap_filter: Option<FilterMode>,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub wrap_w: WrapMode,
    pub lod_min_clamp: f32,
    pub lod_max_clamp: f32,
    pub max_anisotropy: u16,
    pub compare: Option<CompareMode>,
}

impl Default for SamplerState {
    fn default() -> Self {
        SamplerState {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mipmap_filter: None,
            wrap_u: WrapMode::Clamp,
            wrap_v: WrapMode::Clamp,
            wrap_w: WrapMode::Clamp,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            max_anisotropy: 1,
            compare: None,
        }
    }
}

impl SamplerState {
    /// Nearest filtering everywhere, for pixel art and data textures.
    pub fn nearest() -> Self {
        SamplerState {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            ..Default::default()
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_u = wrap;
        self.wrap_v = wrap;
        self.wrap_w = wrap;
        self
    }

    pub fn with_mipmap_filter(mut self, filter: FilterMode) -> Self {
        self.mipmap_filter = Some(filter);
        self
    }

    pub fn with_compare(mut self, compare: CompareMode) -> Self {
        self.compare = Some(compare);
        self
    }

    //floats compare by bit pattern so the cache key is total
    fn key(&self) -> impl Eq + Hash + '_ {
        (
            self.min_filter,
            self.mag_filter,
            self.mipmap_filter,
            (self.wrap_u, self.wrap_v, self.wrap_w),
            self.lod_min_clamp.to_bits(),
            self.lod_max_clamp.to_bits(),
            self.max_anisotropy,
            self.compare,
        )
    }
}

impl PartialEq for SamplerState {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SamplerState {}

impl Hash for SamplerState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
