//! Raw C function bindings for librcl.
//!
//! Only the finalize routines are declared here; allocation of each
//! resource happens elsewhere. The declarations are compiled with the
//! `rcl` feature only.

#[cfg(feature = "rcl")]
use std::os::raw::c_void;

#[cfg(feature = "rcl")]
use super::handles::*;

/// Status code returned by rcl functions (`rcl_ret_t`).
pub type RclRet = i32;

// Status codes
pub const RCL_RET_OK: RclRet = 0;
pub const RCL_RET_ERROR: RclRet = 1;
pub const RCL_RET_TIMEOUT: RclRet = 2;
pub const RCL_RET_UNSUPPORTED: RclRet = 3;
pub const RCL_RET_BAD_ALLOC: RclRet = 10;
pub const RCL_RET_INVALID_ARGUMENT: RclRet = 11;
pub const RCL_RET_ALREADY_INIT: RclRet = 100;
pub const RCL_RET_NOT_INIT: RclRet = 101;
pub const RCL_RET_NODE_INVALID: RclRet = 200;
pub const RCL_RET_PUBLISHER_INVALID: RclRet = 300;
pub const RCL_RET_SUBSCRIPTION_INVALID: RclRet = 400;
pub const RCL_RET_CLIENT_INVALID: RclRet = 500;
pub const RCL_RET_SERVICE_INVALID: RclRet = 600;
pub const RCL_RET_TIMER_INVALID: RclRet = 800;

// External C functions
#[cfg(feature = "rcl")]
extern "C" {
    // Finalize routines
    pub fn rcl_node_fini(node: *mut RclNode) -> RclRet;
    pub fn rcl_publisher_fini(publisher: *mut RclPublisher, node: *mut RclNode) -> RclRet;
    pub fn rcl_subscription_fini(
        subscription: *mut RclSubscription,
        node: *mut RclNode,
    ) -> RclRet;
    pub fn rcl_service_fini(service: *mut RclService, node: *mut RclNode) -> RclRet;
    pub fn rcl_client_fini(client: *mut RclClient, node: *mut RclNode) -> RclRet;
    pub fn rcl_timer_fini(timer: *mut RclTimer) -> RclRet;

    // Memory management (libc)
    pub fn free(ptr: *mut c_void);
}
