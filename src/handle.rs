//! The resource handle state machine.

use std::fmt;
use std::rc::Rc;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::library::NativeLibrary;
use crate::resource::{format_address, Finalization, Resource};
use crate::types::ResourceCategory;

/// Owns at most one native resource and finalizes it exactly once.
///
/// A handle is either empty or bound to a [`Resource`]. `destroy` runs the
/// category's finalize routine and frees the allocation; `dismiss` gives the
/// resource up without touching it. Both leave the handle empty and are
/// no-ops on an empty handle. Dropping a bound handle destroys it.
///
/// Handles are single-threaded: the native finalize routines are not
/// reentrant.
pub struct ResourceHandle<L: NativeLibrary> {
    resource: Option<Resource>,
    library: L,
    sink: Rc<dyn DiagnosticSink>,
    log_lifecycle: bool,
}

impl<L: NativeLibrary> ResourceHandle<L> {
    /// Create a handle, bound to `resource` if one is given.
    pub fn new(
        resource: Option<Resource>,
        library: L,
        sink: Rc<dyn DiagnosticSink>,
        log_lifecycle: bool,
    ) -> Self {
        if log_lifecycle {
            if let Some(res) = &resource {
                tracing::debug!(
                    pointer = %format_address(res.address()),
                    category = %res.category(),
                    owner = ?res.owner().map(format_address),
                    "handle created"
                );
            }
        }

        Self {
            resource,
            library,
            sink,
            log_lifecycle,
        }
    }

    /// Finalize and release the bound resource, leaving the handle empty.
    ///
    /// Never fails. Finalize failures and skipped finalizes go to the
    /// diagnostics sink; the allocation is freed in every case.
    pub fn destroy(&mut self) {
        let Some(resource) = self.take_resource() else {
            return;
        };
        if let Some(diagnostic) = self.teardown(resource) {
            self.sink.record(diagnostic);
        }
    }

    /// Unbind the resource without finalizing it or logging anything.
    pub(crate) fn take_resource(&mut self) -> Option<Resource> {
        self.resource.take()
    }

    /// Finalize and release a resource taken from this handle.
    ///
    /// Returns the diagnostic the sink should receive, if any. Only needs a
    /// shared borrow, so readers of the handle may run while the native
    /// routines do.
    pub(crate) fn teardown(&self, resource: Resource) -> Option<Diagnostic> {
        let category = resource.category();
        let pointer = resource.address();
        let owner = resource.owner();

        let kind = match resource.finalize(&self.library) {
            Finalization::Finalized | Finalization::MemoryOnly => None,
            Finalization::OwnerMissing => Some(DiagnosticKind::OwnerMissing),
            Finalization::Failed(e) => Some(DiagnosticKind::FinalizeFailed(e)),
        };

        if self.log_lifecycle {
            tracing::debug!(
                pointer = %format_address(pointer),
                category = %category,
                clean = kind.is_none(),
                "handle destroyed"
            );
        }

        kind.map(|kind| Diagnostic {
            kind,
            category,
            pointer,
            owner,
        })
    }

    /// The sink this handle reports to.
    pub(crate) fn sink(&self) -> Rc<dyn DiagnosticSink> {
        Rc::clone(&self.sink)
    }

    /// Give up the bound resource without finalizing or freeing it.
    ///
    /// Returns the resource so the new owner can take it over.
    pub fn dismiss(&mut self) -> Option<Resource> {
        let resource = self.resource.take();

        if self.log_lifecycle {
            if let Some(res) = &resource {
                tracing::debug!(
                    pointer = %format_address(res.address()),
                    category = %res.category(),
                    "handle dismissed"
                );
            }
        }

        resource
    }

    /// The bound address as `0x…`, or an empty string when empty.
    pub fn pointer(&self) -> String {
        self.address().map(format_address).unwrap_or_default()
    }

    /// The bound address.
    pub fn address(&self) -> Option<usize> {
        self.resource.as_ref().map(Resource::address)
    }

    /// The owning node's address, for categories that record one.
    pub fn owner(&self) -> Option<usize> {
        self.resource.as_ref().and_then(Resource::owner)
    }

    /// The bound category, `None` when empty.
    pub fn category(&self) -> ResourceCategory {
        self.resource
            .as_ref()
            .map(Resource::category)
            .unwrap_or(ResourceCategory::None)
    }

    /// Label of the bound category, "Unknown" when empty.
    pub fn category_label(&self) -> &'static str {
        self.category().label()
    }

    /// Whether no resource is bound.
    pub fn is_empty(&self) -> bool {
        self.resource.is_none()
    }
}

impl<L: NativeLibrary> Drop for ResourceHandle<L> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<L: NativeLibrary> fmt::Debug for ResourceHandle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("pointer", &self.pointer())
            .field("category", &self.category())
            .field("owner", &self.owner().map(format_address))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, MockDiagnosticSink};
    use crate::ffi;
    use crate::testing::{addr, capture_logs, Call, Recorder};
    use rstest::rstest;
    use std::os::raw::c_void;

    const PTR: usize = 0x1000;
    const NODE: usize = 0x2000;

    fn handle<'a>(
        lib: &'a Recorder,
        sink: Rc<dyn DiagnosticSink>,
        category: ResourceCategory,
        owner: *mut c_void,
    ) -> ResourceHandle<&'a Recorder> {
        let resource = unsafe { Resource::from_raw(addr(PTR), category, owner) }.unwrap();
        ResourceHandle::new(resource, lib, sink, true)
    }

    fn quiet() -> Rc<dyn DiagnosticSink> {
        Rc::new(CollectingSink::new())
    }

    #[rstest]
    #[case(ResourceCategory::Node, Some(Call::NodeFini(PTR)))]
    #[case(ResourceCategory::Publisher, Some(Call::PublisherFini(PTR, NODE)))]
    #[case(ResourceCategory::Subscription, Some(Call::SubscriptionFini(PTR, NODE)))]
    #[case(ResourceCategory::Service, Some(Call::ServiceFini(PTR, NODE)))]
    #[case(ResourceCategory::Client, Some(Call::ClientFini(PTR, NODE)))]
    #[case(ResourceCategory::Timer, Some(Call::TimerFini(PTR)))]
    #[case(ResourceCategory::StringBuffer, None)]
    #[case(ResourceCategory::RawAllocation, None)]
    fn test_destroy_dispatch(#[case] category: ResourceCategory, #[case] fini: Option<Call>) {
        let lib = Recorder::default();
        let mut h = handle(&lib, quiet(), category, addr(NODE));
        assert_eq!(h.category(), category);

        h.destroy();

        let mut expected: Vec<Call> = fini.into_iter().collect();
        expected.push(Call::Release(PTR));
        assert_eq!(lib.calls(), expected);
        assert!(h.is_empty());
        assert_eq!(h.category(), ResourceCategory::None);
        assert_eq!(h.owner(), None);
    }

    #[rstest]
    fn test_destroy_idempotent(
        #[values(
            ResourceCategory::Node,
            ResourceCategory::Publisher,
            ResourceCategory::Timer,
            ResourceCategory::RawAllocation
        )]
        category: ResourceCategory,
    ) {
        let lib = Recorder::default();
        let mut h = handle(&lib, quiet(), category, addr(NODE));
        h.destroy();
        let after_first = lib.calls();
        h.destroy();
        drop(h);
        assert_eq!(lib.calls(), after_first);
    }

    #[test]
    fn test_dismiss_then_destroy_is_silent() {
        let lib = Recorder::default();
        let mut h = handle(&lib, quiet(), ResourceCategory::Node, std::ptr::null_mut());

        let yielded = h.dismiss().expect("bound handle yields its resource");
        assert_eq!(yielded.address(), PTR);
        assert!(h.is_empty());

        h.destroy();
        drop(h);
        assert!(lib.calls().is_empty());
    }

    #[test]
    fn test_dismiss_empty_is_noop() {
        let lib = Recorder::default();
        let mut h = ResourceHandle::new(None, &lib, quiet(), false);
        assert!(h.dismiss().is_none());
        assert!(h.dismiss().is_none());
    }

    #[rstest]
    #[case(ResourceCategory::Publisher)]
    #[case(ResourceCategory::Subscription)]
    #[case(ResourceCategory::Service)]
    #[case(ResourceCategory::Client)]
    fn test_missing_owner_skips_finalize(#[case] category: ResourceCategory) {
        let lib = Recorder::default();
        let sink = Rc::new(CollectingSink::new());
        let mut h = handle(&lib, sink.clone(), category, std::ptr::null_mut());

        h.destroy();

        assert!(lib.fini_calls().is_empty());
        assert_eq!(lib.calls(), [Call::Release(PTR)]);
        assert!(h.is_empty());

        let recorded = sink.take();
        assert_eq!(recorded.len(), 1);
        assert!(matches!(recorded[0].kind, DiagnosticKind::OwnerMissing));
        assert_eq!(recorded[0].category, category);
        assert_eq!(recorded[0].pointer, PTR);
    }

    #[test]
    fn test_finalize_failure_reported_once() {
        let lib = Recorder::failing(ffi::RCL_RET_TIMER_INVALID);
        let mut sink = MockDiagnosticSink::new();
        sink.expect_record()
            .withf(|d: &Diagnostic| {
                d.code() == Some(ffi::RCL_RET_TIMER_INVALID)
                    && d.category == ResourceCategory::Timer
                    && d.pointer == PTR
                    && d.owner.is_none()
            })
            .times(1)
            .return_const(());

        let mut h = handle(&lib, Rc::new(sink), ResourceCategory::Timer, std::ptr::null_mut());
        h.destroy();
        h.destroy();

        assert_eq!(lib.calls(), [Call::TimerFini(PTR), Call::Release(PTR)]);
        assert!(h.is_empty());
    }

    #[test]
    fn test_clean_destroy_records_nothing() {
        let lib = Recorder::default();
        let mut sink = MockDiagnosticSink::new();
        sink.expect_record().never();

        let mut h = handle(&lib, Rc::new(sink), ResourceCategory::Client, addr(NODE));
        h.destroy();
    }

    #[test]
    fn test_accessors() {
        let lib = Recorder::default();
        let mut h = handle(&lib, quiet(), ResourceCategory::Service, addr(NODE));
        assert_eq!(h.pointer(), "0x1000");
        assert_eq!(h.address(), Some(PTR));
        assert_eq!(h.owner(), Some(NODE));
        assert_eq!(h.category_label(), "ROS Service");

        h.dismiss();
        assert_eq!(h.pointer(), "");
        assert_eq!(h.address(), None);
        assert_eq!(h.category_label(), "Unknown");
    }

    #[test]
    fn test_drop_destroys() {
        let lib = Recorder::default();
        {
            let _h = handle(&lib, quiet(), ResourceCategory::Timer, std::ptr::null_mut());
        }
        assert_eq!(lib.calls(), [Call::TimerFini(PTR), Call::Release(PTR)]);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_lifecycle_events_follow_option(#[case] log_lifecycle: bool) {
        let lib = Recorder::default();
        let logs = capture_logs(|| {
            let resource =
                unsafe { Resource::from_raw(addr(PTR), ResourceCategory::Node, addr(NODE)) }
                    .unwrap();
            let mut h = ResourceHandle::new(resource, &lib, quiet(), log_lifecycle);
            h.destroy();

            let resource =
                unsafe { Resource::from_raw(addr(PTR), ResourceCategory::Timer, addr(NODE)) }
                    .unwrap();
            let mut h = ResourceHandle::new(resource, &lib, quiet(), log_lifecycle);
            let _ = h.dismiss();
        });

        for event in ["handle created", "handle destroyed", "handle dismissed"] {
            assert_eq!(logs.contains(event), log_lifecycle, "{event} in {logs:?}");
        }
        if log_lifecycle {
            assert!(logs.contains("DEBUG"));
            assert!(logs.contains("pointer=0x1000"));
            assert!(logs.contains("clean=true"));
        }
    }

    #[test]
    fn test_debug_format() {
        let lib = Recorder::default();
        let h = handle(&lib, quiet(), ResourceCategory::Node, std::ptr::null_mut());
        let dbg = format!("{:?}", h);
        assert!(dbg.contains("0x1000"));
        assert!(dbg.contains("Node"));
    }
}
