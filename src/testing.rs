//! Recording native library for tests.
//!
//! [`Recorder`] stands in for librcl: it logs every call by address and
//! never touches the memory behind the pointers it receives.

use std::cell::{Cell, RefCell};
use std::os::raw::c_void;
use std::ptr::NonNull;

use crate::ffi::{
    RclClient, RclNode, RclPublisher, RclRet, RclService, RclSubscription, RclTimer, RCL_RET_OK,
};
use crate::library::NativeLibrary;

/// One native call, by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    NodeFini(usize),
    PublisherFini(usize, usize),
    SubscriptionFini(usize, usize),
    ServiceFini(usize, usize),
    ClientFini(usize, usize),
    TimerFini(usize),
    Release(usize),
}

impl Call {
    pub fn is_release(&self) -> bool {
        matches!(self, Call::Release(_))
    }
}

/// Records every call and answers finalize routines with a fixed status.
#[derive(Debug)]
pub struct Recorder {
    calls: RefCell<Vec<Call>>,
    status: Cell<RclRet>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::failing(RCL_RET_OK)
    }
}

impl Recorder {
    /// A recorder whose finalize routines all return `status`.
    pub fn failing(status: RclRet) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            status: Cell::new(status),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn fini_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !c.is_release()).collect()
    }

    /// Number of finalize routines called.
    pub fn finalize_count(&self) -> usize {
        self.calls().iter().filter(|c| !c.is_release()).count()
    }

    /// Number of times `address` was released.
    pub fn release_count(&self, address: usize) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::Release(address))
            .count()
    }

    fn push(&self, call: Call) -> RclRet {
        self.calls.borrow_mut().push(call);
        self.status.get()
    }
}

fn a<T>(p: NonNull<T>) -> usize {
    p.as_ptr() as usize
}

/// Synthetic address for tests. Never dereferenced.
pub fn addr<T>(address: usize) -> *mut T {
    address as *mut T
}

impl NativeLibrary for Recorder {
    unsafe fn node_fini(&self, node: NonNull<RclNode>) -> RclRet {
        self.push(Call::NodeFini(a(node)))
    }

    unsafe fn publisher_fini(
        &self,
        publisher: NonNull<RclPublisher>,
        node: NonNull<RclNode>,
    ) -> RclRet {
        self.push(Call::PublisherFini(a(publisher), a(node)))
    }

    unsafe fn subscription_fini(
        &self,
        subscription: NonNull<RclSubscription>,
        node: NonNull<RclNode>,
    ) -> RclRet {
        self.push(Call::SubscriptionFini(a(subscription), a(node)))
    }

    unsafe fn service_fini(&self, service: NonNull<RclService>, node: NonNull<RclNode>) -> RclRet {
        self.push(Call::ServiceFini(a(service), a(node)))
    }

    unsafe fn client_fini(&self, client: NonNull<RclClient>, node: NonNull<RclNode>) -> RclRet {
        self.push(Call::ClientFini(a(client), a(node)))
    }

    unsafe fn timer_fini(&self, timer: NonNull<RclTimer>) -> RclRet {
        self.push(Call::TimerFini(a(timer)))
    }

    unsafe fn release(&self, pointer: NonNull<c_void>) {
        self.push(Call::Release(a(pointer)));
    }
}

#[cfg(test)]
pub(crate) use capture::capture_logs;
