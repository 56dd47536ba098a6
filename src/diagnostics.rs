//! Diagnostics for handle teardown.
//!
//! `destroy` never fails, so anything worth knowing about a teardown is
//! recorded here instead: failed native finalize calls and finalizes
//! skipped because the owning node was never recorded. A skipped finalize
//! leaks whatever the native object held beyond its own allocation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::resource::format_address;
use crate::types::ResourceCategory;

/// What went wrong during a teardown.
#[derive(Debug)]
pub enum DiagnosticKind {
    /// The finalize routine reported a failure. Memory was still released.
    FinalizeFailed(Error),
    /// No owner was recorded, so the finalize routine was skipped.
    /// Memory was still released.
    OwnerMissing,
}

/// A teardown event worth reporting.
#[derive(Debug)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// Category of the resource torn down.
    pub category: ResourceCategory,
    /// Address of the resource torn down.
    pub pointer: usize,
    /// Address of the owning node, if one was recorded.
    pub owner: Option<usize>,
}

impl Diagnostic {
    /// The native status code, for failed finalize calls.
    pub fn code(&self) -> Option<i32> {
        match &self.kind {
            DiagnosticKind::FinalizeFailed(e) => e.native_code(),
            DiagnosticKind::OwnerMissing => None,
        }
    }

    /// Whether the native finalize routine ran and failed.
    pub fn is_finalize_failure(&self) -> bool {
        matches!(self.kind, DiagnosticKind::FinalizeFailed(_))
    }

    fn owner_display(&self) -> String {
        self.owner
            .map(format_address)
            .unwrap_or_else(|| "none".to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = format_address(self.pointer);
        match &self.kind {
            DiagnosticKind::FinalizeFailed(e) => write!(
                f,
                "{} {} (owner {}): {}",
                self.category,
                pointer,
                self.owner_display(),
                e
            ),
            DiagnosticKind::OwnerMissing => write!(
                f,
                "{} {}: no owner recorded, finalize skipped",
                self.category, pointer
            ),
        }
    }
}

/// Receives teardown diagnostics.
///
/// Called from `destroy`, which may run from a collector-driven drop.
/// Implementations must not panic.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink {
    /// Record one diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic)
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Rc<T> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic)
    }
}

/// Logs diagnostics through `tracing`. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        let pointer = format_address(diagnostic.pointer);
        let owner = diagnostic.owner_display();
        match &diagnostic.kind {
            DiagnosticKind::FinalizeFailed(e) => {
                tracing::error!(
                    pointer = %pointer,
                    category = %diagnostic.category,
                    owner = %owner,
                    code = e.native_code(),
                    error = %e,
                    "native finalize failed; memory released"
                );
            }
            DiagnosticKind::OwnerMissing => {
                tracing::warn!(
                    pointer = %pointer,
                    category = %diagnostic.category,
                    "no owner recorded; finalize skipped, memory released"
                );
            }
        }
    }
}

/// Keeps diagnostics in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: RefCell<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics held.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no diagnostics are held.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, diagnostic: Diagnostic) {
        self.entries.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi;
    use crate::testing::capture_logs;

    fn failed() -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::FinalizeFailed(ffi::check_ret(ffi::RCL_RET_ERROR).unwrap_err()),
            category: ResourceCategory::Service,
            pointer: 0x1000,
            owner: Some(0x2000),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            failed().to_string(),
            "ROS Service 0x1000 (owner 0x2000): native call failed: RCL_RET_ERROR (1)"
        );

        let missing = Diagnostic {
            kind: DiagnosticKind::OwnerMissing,
            category: ResourceCategory::Publisher,
            pointer: 0x1000,
            owner: None,
        };
        assert_eq!(
            missing.to_string(),
            "ROS Publisher 0x1000: no owner recorded, finalize skipped"
        );
        assert_eq!(missing.code(), None);
    }

    #[test]
    fn test_collecting_sink_take() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.record(failed());
        (&sink).record(failed());
        assert_eq!(sink.len(), 2);

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(taken.iter().all(Diagnostic::is_finalize_failure));
        assert_eq!(taken[0].code(), Some(ffi::RCL_RET_ERROR));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_sink_finalize_failure_is_error() {
        let logs = capture_logs(|| TracingSink.record(failed()));

        let line = logs
            .lines()
            .find(|l| l.contains("native finalize failed"))
            .expect("finalize failure logged");
        assert!(line.contains("ERROR"));
        assert!(line.contains("pointer=0x1000"));
        assert!(line.contains("category=ROS Service"));
        assert!(line.contains("owner=0x2000"));
        assert!(line.contains("code=1"));
        assert!(line.contains("RCL_RET_ERROR"));
    }

    #[test]
    fn test_tracing_sink_owner_missing_is_warning() {
        let missing = Diagnostic {
            kind: DiagnosticKind::OwnerMissing,
            category: ResourceCategory::Subscription,
            pointer: 0x3000,
            owner: None,
        };
        let logs = capture_logs(|| TracingSink.record(missing));

        let line = logs
            .lines()
            .find(|l| l.contains("no owner recorded"))
            .expect("skipped finalize logged");
        assert!(line.contains("WARN"));
        assert!(!line.contains("ERROR"));
        assert!(line.contains("pointer=0x3000"));
        assert!(line.contains("category=ROS Subscription"));
    }
}
