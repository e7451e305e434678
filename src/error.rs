// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Errors surfaced by texture construction and data transfer.

use crate::pixel_formats::PixelFormat;

/// Platform-independent error type.
///
/// Construction errors ([`Error::UnsupportedPlatform`], [`Error::OutOfMemory`],
/// [`Error::InvalidSettings`]) are fatal for the texture being built; nothing
/// allocated during the failed attempt survives the error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The device cannot express the requested texture at all.
    #[error("unsupported on this platform: {what}")]
    UnsupportedPlatform { what: String },
    /// A native allocation returned nothing.
    #[error("out of GPU memory allocating {what}")]
    OutOfMemory { what: String },
    /// The settings describe a texture that cannot exist.
    #[error("invalid texture settings: {0}")]
    InvalidSettings(String),
    /// The device cannot derive mip levels for this texture.
    #[error("cannot generate mipmaps for {format:?}: {reason}")]
    MipmapsUnsupported {
        format: PixelFormat,
        reason: &'static str,
    },
    /// The texture's native handles were already released.
    #[error("texture used after release")]
    Released,
    /// The backend failed while completing submitted work.
    #[error("device error: {0}")]
    Device(String),
}

impl Error {
    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        Error::UnsupportedPlatform { what: what.into() }
    }
    pub(crate) fn out_of_memory(what: impl Into<String>) -> Self {
        Error::OutOfMemory { what: what.into() }
    }
}
