//! Error types for the rcl-handle crate.

use thiserror::Error;

use crate::types::ResourceCategory;

/// Result type alias for rcl-handle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rcl-handle operations.
///
/// None of these escape `destroy` or `dismiss`. They are returned by the
/// factory's argument checks and by host property/method dispatch, and
/// carried inside diagnostics for failed native finalize calls.
#[derive(Error, Debug)]
pub enum Error {
    /// A live category was given a null pointer.
    #[error("null pointer for {0} handle")]
    NullPointer(ResourceCategory),

    /// Category tag is out of range or not assignable to a handle.
    #[error("invalid resource category tag {0}")]
    InvalidCategory(u32),

    /// A non-null pointer was given without a category.
    #[error("pointer {pointer} has no resource category")]
    UntypedPointer {
        /// Formatted address.
        pointer: String,
    },

    /// A native rcl call reported a non-success status.
    #[error("native call failed: {status} ({code})")]
    Native {
        /// Raw `rcl_ret_t` value.
        code: i32,
        /// Symbolic status name.
        status: &'static str,
    },

    /// Host asked for a property the class does not expose.
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// Host invoked a method the class does not expose.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Host tried to assign a read-only property.
    #[error("property is read-only: {0}")]
    ReadOnlyProperty(String),
}

impl Error {
    /// Check if this is a native status error.
    pub fn is_native(&self) -> bool {
        matches!(self, Error::Native { .. })
    }

    /// Check if this error came from invalid factory arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::NullPointer(_) | Error::InvalidCategory(_) | Error::UntypedPointer { .. }
        )
    }

    /// Check if this error came from host property or method dispatch.
    pub fn is_host_dispatch(&self) -> bool {
        matches!(
            self,
            Error::UnknownProperty(_) | Error::UnknownMethod(_) | Error::ReadOnlyProperty(_)
        )
    }

    /// The raw rcl status code, if this is a native error.
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Error::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}
