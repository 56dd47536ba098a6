//! Typed native resources and their finalize dispatch.

use std::fmt;
use std::os::raw::c_void;
use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::ffi::{
    self, RclClient, RclNode, RclPublisher, RclRet, RclService, RclSubscription, RclTimer,
    RosidlString,
};
use crate::library::NativeLibrary;
use crate::types::ResourceCategory;

/// An owned native resource of one of the eight live categories.
///
/// Owner-requiring categories carry the node they were created on, if the
/// allocator supplied one. A `Resource` has no destructor of its own; it is
/// finalized by the handle that holds it, or handed back by `dismiss`.
#[derive(Debug, PartialEq, Eq)]
pub struct Resource(Bound);

#[derive(Debug, PartialEq, Eq)]
enum Bound {
    Node(NonNull<RclNode>),
    Publisher {
        publisher: NonNull<RclPublisher>,
        node: Option<NonNull<RclNode>>,
    },
    Subscription {
        subscription: NonNull<RclSubscription>,
        node: Option<NonNull<RclNode>>,
    },
    Service {
        service: NonNull<RclService>,
        node: Option<NonNull<RclNode>>,
    },
    Client {
        client: NonNull<RclClient>,
        node: Option<NonNull<RclNode>>,
    },
    Timer(NonNull<RclTimer>),
    StringBuffer(NonNull<RosidlString>),
    RawAllocation(NonNull<c_void>),
}

/// What happened when a resource was torn down.
#[derive(Debug)]
pub(crate) enum Finalization {
    /// The finalize routine succeeded.
    Finalized,
    /// The category has no finalize routine.
    MemoryOnly,
    /// The category needs an owner and none was recorded.
    OwnerMissing,
    /// The finalize routine reported a failure status.
    Failed(Error),
}

impl Resource {
    /// Take ownership of a raw native resource.
    ///
    /// Returns `Ok(None)` for a null pointer tagged `None`, which is the
    /// empty handle. `owner` is kept only for categories that finalize
    /// against their node.
    ///
    /// # Safety
    ///
    /// A non-null `pointer` must point to a live, initialized structure of
    /// the type `category` names, allocated with `malloc`, and the caller
    /// must give up every other claim to it. A non-null `owner` must point
    /// to the node the resource was created on and outlive this resource.
    pub unsafe fn from_raw(
        pointer: *mut c_void,
        category: ResourceCategory,
        owner: *mut c_void,
    ) -> Result<Option<Self>> {
        let Some(ptr) = NonNull::new(pointer) else {
            return match category {
                ResourceCategory::None => Ok(None),
                ResourceCategory::Count => Err(Error::InvalidCategory(category.into())),
                live => Err(Error::NullPointer(live)),
            };
        };

        let node = NonNull::new(owner).map(NonNull::cast::<RclNode>);

        let bound = match category {
            ResourceCategory::None => {
                return Err(Error::UntypedPointer {
                    pointer: format_address(ptr.as_ptr() as usize),
                })
            }
            ResourceCategory::Count => return Err(Error::InvalidCategory(category.into())),
            ResourceCategory::Node => Bound::Node(ptr.cast()),
            ResourceCategory::Publisher => Bound::Publisher {
                publisher: ptr.cast(),
                node,
            },
            ResourceCategory::Subscription => Bound::Subscription {
                subscription: ptr.cast(),
                node,
            },
            ResourceCategory::Service => Bound::Service {
                service: ptr.cast(),
                node,
            },
            ResourceCategory::Client => Bound::Client {
                client: ptr.cast(),
                node,
            },
            ResourceCategory::Timer => Bound::Timer(ptr.cast()),
            ResourceCategory::StringBuffer => Bound::StringBuffer(ptr.cast()),
            ResourceCategory::RawAllocation => Bound::RawAllocation(ptr),
        };

        Ok(Some(Self(bound)))
    }

    /// The resource category.
    pub fn category(&self) -> ResourceCategory {
        match self.0 {
            Bound::Node(_) => ResourceCategory::Node,
            Bound::Publisher { .. } => ResourceCategory::Publisher,
            Bound::Subscription { .. } => ResourceCategory::Subscription,
            Bound::Service { .. } => ResourceCategory::Service,
            Bound::Client { .. } => ResourceCategory::Client,
            Bound::Timer(_) => ResourceCategory::Timer,
            Bound::StringBuffer(_) => ResourceCategory::StringBuffer,
            Bound::RawAllocation(_) => ResourceCategory::RawAllocation,
        }
    }

    /// The native address.
    pub fn address(&self) -> usize {
        self.raw().as_ptr() as usize
    }

    /// The owning node's address, for categories that record one.
    pub fn owner(&self) -> Option<usize> {
        match self.0 {
            Bound::Publisher { node, .. }
            | Bound::Subscription { node, .. }
            | Bound::Service { node, .. }
            | Bound::Client { node, .. } => node.map(|n| n.as_ptr() as usize),
            _ => None,
        }
    }

    /// The native pointer, still owned by this resource.
    pub fn as_ptr(&self) -> *mut c_void {
        self.raw().as_ptr()
    }

    /// Give up the pointer. The caller becomes responsible for it.
    pub fn into_raw(self) -> *mut c_void {
        self.as_ptr()
    }

    fn raw(&self) -> NonNull<c_void> {
        match self.0 {
            Bound::Node(p) => p.cast(),
            Bound::Publisher { publisher, .. } => publisher.cast(),
            Bound::Subscription { subscription, .. } => subscription.cast(),
            Bound::Service { service, .. } => service.cast(),
            Bound::Client { client, .. } => client.cast(),
            Bound::Timer(p) => p.cast(),
            Bound::StringBuffer(p) => p.cast(),
            Bound::RawAllocation(p) => p,
        }
    }

    /// Run the category's finalize routine, then free the allocation.
    ///
    /// The allocation is freed whatever the finalize outcome, including a
    /// skipped finalize for a missing owner.
    pub(crate) fn finalize<L: NativeLibrary + ?Sized>(self, library: &L) -> Finalization {
        let pointer = self.raw();

        // SAFETY: `from_raw` is the only constructor, and its contract makes
        // every pointer here a live structure of its category owned by us.
        // `self` is consumed, so nothing can reach the pointer afterwards.
        let outcome = unsafe {
            match self.0 {
                Bound::Node(node) => finalized(library.node_fini(node)),
                Bound::Publisher {
                    publisher,
                    node: Some(node),
                } => finalized(library.publisher_fini(publisher, node)),
                Bound::Subscription {
                    subscription,
                    node: Some(node),
                } => finalized(library.subscription_fini(subscription, node)),
                Bound::Service {
                    service,
                    node: Some(node),
                } => finalized(library.service_fini(service, node)),
                Bound::Client {
                    client,
                    node: Some(node),
                } => finalized(library.client_fini(client, node)),
                Bound::Publisher { node: None, .. }
                | Bound::Subscription { node: None, .. }
                | Bound::Service { node: None, .. }
                | Bound::Client { node: None, .. } => Finalization::OwnerMissing,
                Bound::Timer(timer) => finalized(library.timer_fini(timer)),
                Bound::StringBuffer(_) | Bound::RawAllocation(_) => Finalization::MemoryOnly,
            }
        };

        // SAFETY: see above; the pointer is released exactly once, here.
        unsafe { library.release(pointer) };

        outcome
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.category(), format_address(self.address()))
    }
}

fn finalized(code: RclRet) -> Finalization {
    match ffi::check_ret(code) {
        Ok(()) => Finalization::Finalized,
        Err(e) => Finalization::Failed(e),
    }
}

/// Render a native address the way host code sees it.
pub(crate) fn format_address(address: usize) -> String {
    format!("{:#x}", address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{addr, Call, Recorder};

    #[test]
    fn test_null_untyped_is_empty() {
        let res = unsafe {
            Resource::from_raw(std::ptr::null_mut(), ResourceCategory::None, addr(0x10))
        };
        assert!(matches!(res, Ok(None)));
    }

    #[test]
    fn test_null_live_rejected() {
        let res = unsafe {
            Resource::from_raw(std::ptr::null_mut(), ResourceCategory::Timer, std::ptr::null_mut())
        };
        assert!(matches!(res, Err(Error::NullPointer(ResourceCategory::Timer))));
    }

    #[test]
    fn test_untyped_pointer_rejected() {
        let res = unsafe {
            Resource::from_raw(addr(0x1000), ResourceCategory::None, std::ptr::null_mut())
        };
        match res {
            Err(Error::UntypedPointer { pointer }) => assert_eq!(pointer, "0x1000"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_count_sentinel_rejected() {
        for pointer in [std::ptr::null_mut(), addr(0x1000)] {
            let res = unsafe {
                Resource::from_raw(pointer, ResourceCategory::Count, std::ptr::null_mut())
            };
            assert!(matches!(res, Err(Error::InvalidCategory(9))));
        }
    }

    #[test]
    fn test_owner_kept_only_where_needed() {
        let timer = unsafe {
            Resource::from_raw(addr(0x1000), ResourceCategory::Timer, addr(0x2000))
        }
        .unwrap()
        .unwrap();
        assert_eq!(timer.owner(), None);

        let client = unsafe {
            Resource::from_raw(addr(0x1000), ResourceCategory::Client, addr(0x2000))
        }
        .unwrap()
        .unwrap();
        assert_eq!(client.owner(), Some(0x2000));
        assert_eq!(client.to_string(), "ROS Client @ 0x1000");
    }

    #[test]
    fn test_finalize_failure_still_releases() {
        let lib = Recorder::failing(ffi::RCL_RET_NODE_INVALID);
        let node = unsafe {
            Resource::from_raw(addr(0x1000), ResourceCategory::Node, std::ptr::null_mut())
        }
        .unwrap()
        .unwrap();

        match node.finalize(&lib) {
            Finalization::Failed(e) => assert_eq!(e.native_code(), Some(ffi::RCL_RET_NODE_INVALID)),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(lib.calls(), [Call::NodeFini(0x1000), Call::Release(0x1000)]);
    }

    #[test]
    fn test_into_raw_skips_native_calls() {
        let lib = Recorder::default();
        let buf = unsafe {
            Resource::from_raw(addr(0x3000), ResourceCategory::RawAllocation, std::ptr::null_mut())
        }
        .unwrap()
        .unwrap();

        assert_eq!(buf.into_raw() as usize, 0x3000);
        assert!(lib.calls().is_empty());
    }
}
