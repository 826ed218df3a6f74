use alloc::borrow::Cow;
use core::fmt;

use crate::MetaId;

/// Errors returned when adding entries to one of the registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A converter for this pair of types is already registered.
    DuplicateConverter {
        /// Source type
        from: MetaId,
        /// Destination type
        to: MetaId,
    },

    /// A mutable view for this pair of types is already registered.
    DuplicateMutableView {
        /// Source type
        from: MetaId,
        /// View type
        to: MetaId,
    },

    /// The id does not name a registered type.
    UnknownType(MetaId),

    /// The alias already resolves to a different type.
    AliasConflict {
        /// The alias that was requested
        alias: Cow<'static, str>,
        /// The id the alias already resolves to
        existing: MetaId,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::DuplicateConverter { from, to } => {
                write!(f, "a converter from {from} to {to} is already registered")
            }
            RegistrationError::DuplicateMutableView { from, to } => {
                write!(f, "a mutable view from {from} to {to} is already registered")
            }
            RegistrationError::UnknownType(id) => write!(f, "no type is registered under id {id}"),
            RegistrationError::AliasConflict { alias, existing } => {
                write!(f, "alias `{alias}` already names type {existing}")
            }
        }
    }
}

impl core::error::Error for RegistrationError {}

/// Errors returned when writing a value to a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The type has no save/load hooks.
    NotStreamable {
        /// Name of the offending type
        type_name: Cow<'static, str>,
    },
    /// The writer failed while writing the value, see
    /// [`StreamStatus::WriteFailed`](crate::StreamStatus::WriteFailed).
    WriteFailed {
        /// Name of the type being written
        type_name: Cow<'static, str>,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::NotStreamable { type_name } => {
                write!(f, "type `{type_name}` cannot be written to a stream")
            }
            StreamError::WriteFailed { type_name } => {
                write!(f, "writing a `{type_name}` failed")
            }
        }
    }
}

impl core::error::Error for StreamError {}
