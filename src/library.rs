//! The native library seam.
//!
//! [`NativeLibrary`] is the set of routines a handle needs to tear a
//! resource down. [`Rcl`] forwards to librcl; tests supply recording
//! doubles.

use std::os::raw::c_void;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::ffi::{
    RclClient, RclNode, RclPublisher, RclRet, RclService, RclSubscription, RclTimer,
};

/// Finalize routines and memory release of the native library.
///
/// # Safety
///
/// Every method hands a raw pointer to native code. Callers must pass
/// pointers to live, initialized structures of the named type that they
/// own, and must not use them afterwards.
pub trait NativeLibrary {
    /// `rcl_node_fini`.
    unsafe fn node_fini(&self, node: NonNull<RclNode>) -> RclRet;

    /// `rcl_publisher_fini`.
    unsafe fn publisher_fini(&self, publisher: NonNull<RclPublisher>, node: NonNull<RclNode>)
        -> RclRet;

    /// `rcl_subscription_fini`.
    unsafe fn subscription_fini(
        &self,
        subscription: NonNull<RclSubscription>,
        node: NonNull<RclNode>,
    ) -> RclRet;

    /// `rcl_service_fini`.
    unsafe fn service_fini(&self, service: NonNull<RclService>, node: NonNull<RclNode>) -> RclRet;

    /// `rcl_client_fini`.
    unsafe fn client_fini(&self, client: NonNull<RclClient>, node: NonNull<RclNode>) -> RclRet;

    /// `rcl_timer_fini`.
    unsafe fn timer_fini(&self, timer: NonNull<RclTimer>) -> RclRet;

    /// Free the allocation backing a resource.
    unsafe fn release(&self, pointer: NonNull<c_void>);
}

/// Implements `NativeLibrary` for pointer types by forwarding to the pointee.
macro_rules! forward_native_library {
    ($($ptr:ty),+ $(,)?) => {$(
        impl<T: NativeLibrary + ?Sized> NativeLibrary for $ptr {
            unsafe fn node_fini(&self, node: NonNull<RclNode>) -> RclRet {
                (**self).node_fini(node)
            }

            unsafe fn publisher_fini(
                &self,
                publisher: NonNull<RclPublisher>,
                node: NonNull<RclNode>,
            ) -> RclRet {
                (**self).publisher_fini(publisher, node)
            }

            unsafe fn subscription_fini(
                &self,
                subscription: NonNull<RclSubscription>,
                node: NonNull<RclNode>,
            ) -> RclRet {
                (**self).subscription_fini(subscription, node)
            }

            unsafe fn service_fini(
                &self,
                service: NonNull<RclService>,
                node: NonNull<RclNode>,
            ) -> RclRet {
                (**self).service_fini(service, node)
            }

            unsafe fn client_fini(
                &self,
                client: NonNull<RclClient>,
                node: NonNull<RclNode>,
            ) -> RclRet {
                (**self).client_fini(client, node)
            }

            unsafe fn timer_fini(&self, timer: NonNull<RclTimer>) -> RclRet {
                (**self).timer_fini(timer)
            }

            unsafe fn release(&self, pointer: NonNull<c_void>) {
                (**self).release(pointer)
            }
        }
    )+};
}

forward_native_library!(&T, Rc<T>);

/// The real librcl, linked with the `rcl` feature.
#[cfg(feature = "rcl")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Rcl;

#[cfg(feature = "rcl")]
impl NativeLibrary for Rcl {
    unsafe fn node_fini(&self, node: NonNull<RclNode>) -> RclRet {
        crate::ffi::rcl_node_fini(node.as_ptr())
    }

    unsafe fn publisher_fini(
        &self,
        publisher: NonNull<RclPublisher>,
        node: NonNull<RclNode>,
    ) -> RclRet {
        crate::ffi::rcl_publisher_fini(publisher.as_ptr(), node.as_ptr())
    }

    unsafe fn subscription_fini(
        &self,
        subscription: NonNull<RclSubscription>,
        node: NonNull<RclNode>,
    ) -> RclRet {
        crate::ffi::rcl_subscription_fini(subscription.as_ptr(), node.as_ptr())
    }

    unsafe fn service_fini(&self, service: NonNull<RclService>, node: NonNull<RclNode>) -> RclRet {
        crate::ffi::rcl_service_fini(service.as_ptr(), node.as_ptr())
    }

    unsafe fn client_fini(&self, client: NonNull<RclClient>, node: NonNull<RclNode>) -> RclRet {
        crate::ffi::rcl_client_fini(client.as_ptr(), node.as_ptr())
    }

    unsafe fn timer_fini(&self, timer: NonNull<RclTimer>) -> RclRet {
        crate::ffi::rcl_timer_fini(timer.as_ptr())
    }

    unsafe fn release(&self, pointer: NonNull<c_void>) {
        crate::ffi::free(pointer.as_ptr())
    }
}
