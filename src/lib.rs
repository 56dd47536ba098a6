//! Lifecycle-managed handles for native ROS 2 client library resources.
//!
//! Native rcl objects (nodes, publishers, subscriptions, services, clients,
//! timers, string buffers and raw allocations) each need their own
//! teardown call, some of them against the node that owns them. This crate
//! wraps such an object in a handle that knows its category, finalizes it
//! exactly once, and lets host code hand ownership elsewhere without
//! finalizing.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "rcl")]
//! # fn main() -> rcl_handle::Result<()> {
//! use std::os::raw::c_void;
//! use rcl_handle::{Binding, Rcl, ResourceCategory};
//!
//! let binding = Binding::new(Rcl);
//!
//! # let node: *mut c_void = std::ptr::null_mut();
//! # let publisher: *mut c_void = std::ptr::null_mut();
//! // `publisher` was just created on `node` by the allocator
//! let handle = unsafe { binding.new_instance(publisher, ResourceCategory::Publisher, node)? };
//! println!("{} at {}", handle.category(), handle.pointer());
//!
//! // Finalize now, or drop the last reference and let it happen then
//! handle.destroy();
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rcl"))]
//! # fn main() {}
//! ```
//!
//! # Threading
//!
//! Handles are neither `Send` nor `Sync`. The native finalize routines are
//! not reentrant, and every handle operation runs on the thread that owns
//! the host object.

pub mod binding;
pub mod diagnostics;
pub mod error;
mod ffi;
pub mod handle;
pub mod library;
pub mod resource;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types at the crate root
pub use binding::{Binding, HostObject, RclHandle};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use error::{Error, Result};
pub use ffi::{
    RclClient, RclNode, RclPublisher, RclRet, RclService, RclSubscription, RclTimer, RosidlString,
};
pub use handle::ResourceHandle;
#[cfg(feature = "rcl")]
pub use library::Rcl;
pub use library::NativeLibrary;
pub use resource::Resource;
pub use types::{BindingOptions, ResourceCategory};

/// rcl status codes.
pub mod status {
    pub use crate::ffi::{
        RCL_RET_ALREADY_INIT, RCL_RET_BAD_ALLOC, RCL_RET_CLIENT_INVALID, RCL_RET_ERROR,
        RCL_RET_INVALID_ARGUMENT, RCL_RET_NODE_INVALID, RCL_RET_NOT_INIT, RCL_RET_OK,
        RCL_RET_PUBLISHER_INVALID, RCL_RET_SERVICE_INVALID, RCL_RET_SUBSCRIPTION_INVALID,
        RCL_RET_TIMEOUT, RCL_RET_TIMER_INVALID, RCL_RET_UNSUPPORTED,
    };

    /// Symbolic name of a status code.
    pub fn name(code: super::RclRet) -> &'static str {
        crate::ffi::ret_name(code)
    }
}
