// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::bindings::sampler::{CompareMode, FilterMode, SamplerState, WrapMode};
use wgpu::{AddressMode, CompareFunction, SamplerDescriptor};

#[derive(Debug)]
pub struct WgpuSampler {
    pub(crate) sampler: wgpu::Sampler,
}

impl WgpuSampler {
    pub fn wgpu_sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

fn filter(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

fn address(mode: WrapMode) -> AddressMode {
    match mode {
        WrapMode::Clamp => AddressMode::ClampToEdge,
        WrapMode::Repeat => AddressMode::Repeat,
        WrapMode::MirroredRepeat => AddressMode::MirrorRepeat,
    }
}

fn compare(mode: CompareMode) -> CompareFunction {
    match mode {
        CompareMode::Never => CompareFunction::Never,
        CompareMode::Less => CompareFunction::Less,
        CompareMode::LessEqual => CompareFunction::LessEqual,
        CompareMode::Equal => CompareFunction::Equal,
        CompareMode::GreaterEqual => CompareFunction::GreaterEqual,
        CompareMode::Greater => CompareFunction::Greater,
        CompareMode::NotEqual => CompareFunction::NotEqual,
        CompareMode::Always => CompareFunction::Always,
    }
}

pub(super) fn descriptor(state: &SamplerState) -> SamplerDescriptor<'static> {
    let mipmap_filter = state.mipmap_filter.map_or(wgpu::FilterMode::Nearest, filter);
    //no mip filtering means sampling the base level only
    let lod_max_clamp = match state.mipmap_filter {
        Some(_) => state.lod_max_clamp,
        None => state.lod_min_clamp,
    };
    let all_linear = state.min_filter == FilterMode::Linear
        && state.mag_filter == FilterMode::Linear
        && state.mipmap_filter == Some(FilterMode::Linear);
    SamplerDescriptor {
        label: None,
        address_mode_u: address(state.wrap_u),
        address_mode_v: address(state.wrap_v),
        address_mode_w: address(state.wrap_w),
        mag_filter: filter(state.mag_filter),
        min_filter: filter(state.min_filter),
        mipmap_filter,
        lod_min_clamp: state.lod_min_clamp,
        lod_max_clamp,
        compare: state.compare.map(compare),
        anisotropy_clamp: if all_linear { state.max_anisotropy.max(1) } else { 1 },
        border_color: None,
    }
}
