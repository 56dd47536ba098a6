//! Host binding for resource handles.
//!
//! A [`Binding`] is the registered host class: it holds the native library
//! and the diagnostics sink, and is the factory for [`RclHandle`] values.
//! An `RclHandle` is the managed value host code holds. Cloning it adds a
//! host reference; when the last reference goes away the bound resource is
//! destroyed, the same way an explicit `destroy` would.

use std::cell::RefCell;
use std::fmt;
use std::os::raw::c_void;
use std::rc::Rc;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{Error, Result};
use crate::handle::ResourceHandle;
use crate::library::NativeLibrary;
use crate::resource::Resource;
use crate::types::{BindingOptions, ResourceCategory};

/// The object model host code sees.
///
/// Properties are strings; methods take no arguments and return nothing.
pub trait HostObject {
    /// Name of the host class.
    fn class_name(&self) -> &str;

    /// Read a property.
    fn get(&self, property: &str) -> Result<String>;

    /// Assign a property.
    fn set(&self, property: &str, value: &str) -> Result<()>;

    /// Invoke a method.
    fn call(&self, method: &str) -> Result<()>;
}

/// A registered handle class and the factory for its instances.
///
/// # Example
///
/// ```
/// # use std::os::raw::c_void;
/// # use std::ptr::NonNull;
/// # use rcl_handle::{RclClient, RclNode, RclPublisher, RclService, RclSubscription, RclTimer};
/// use rcl_handle::{Binding, NativeLibrary, ResourceCategory};
///
/// # #[derive(Clone)]
/// # struct Lib;
/// # impl NativeLibrary for Lib {
/// #     unsafe fn node_fini(&self, _: NonNull<RclNode>) -> i32 { 0 }
/// #     unsafe fn publisher_fini(&self, _: NonNull<RclPublisher>, _: NonNull<RclNode>) -> i32 { 0 }
/// #     unsafe fn subscription_fini(&self, _: NonNull<RclSubscription>, _: NonNull<RclNode>) -> i32 { 0 }
/// #     unsafe fn service_fini(&self, _: NonNull<RclService>, _: NonNull<RclNode>) -> i32 { 0 }
/// #     unsafe fn client_fini(&self, _: NonNull<RclClient>, _: NonNull<RclNode>) -> i32 { 0 }
/// #     unsafe fn timer_fini(&self, _: NonNull<RclTimer>) -> i32 { 0 }
/// #     unsafe fn release(&self, _: NonNull<c_void>) {}
/// # }
/// let binding = Binding::new(Lib);
/// let timer = unsafe {
///     binding.new_instance(0x1000 as *mut c_void, ResourceCategory::Timer, std::ptr::null_mut())
/// }?;
///
/// assert_eq!(timer.category(), "ROS Timer");
/// assert_eq!(timer.pointer(), "0x1000");
///
/// timer.destroy();
/// assert_eq!(timer.category(), "Unknown");
/// # Ok::<(), rcl_handle::Error>(())
/// ```
pub struct Binding<L: NativeLibrary + Clone> {
    library: L,
    sink: Rc<dyn DiagnosticSink>,
    options: BindingOptions,
    class_name: Rc<str>,
}

impl<L: NativeLibrary + Clone> Binding<L> {
    /// Register a class with default options and a [`TracingSink`].
    pub fn new(library: L) -> Self {
        Self::with_options(library, BindingOptions::default())
    }

    /// Register a class with the given options and a [`TracingSink`].
    pub fn with_options(library: L, options: BindingOptions) -> Self {
        let class_name: Rc<str> = Rc::from(options.class_name.as_str());
        Self {
            library,
            sink: Rc::new(TracingSink),
            options,
            class_name,
        }
    }

    /// Send diagnostics of this class's handles to `sink`.
    pub fn with_sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The options this class was registered with.
    pub fn options(&self) -> &BindingOptions {
        &self.options
    }

    /// Construct an empty instance, as host code calling the constructor.
    pub fn construct(&self) -> RclHandle<L> {
        self.instance(None)
    }

    /// Wrap an owned resource in a new instance.
    pub fn wrap(&self, resource: Resource) -> RclHandle<L> {
        self.instance(Some(resource))
    }

    /// Wrap a freshly allocated native resource in a new instance.
    ///
    /// A null pointer tagged `None` gives an empty instance.
    ///
    /// # Safety
    ///
    /// Same contract as [`Resource::from_raw`].
    pub unsafe fn new_instance(
        &self,
        pointer: *mut c_void,
        category: ResourceCategory,
        owner: *mut c_void,
    ) -> Result<RclHandle<L>> {
        let resource = Resource::from_raw(pointer, category, owner)?;
        Ok(self.instance(resource))
    }

    /// Like [`Binding::new_instance`], with the category as a host integer tag.
    ///
    /// # Safety
    ///
    /// Same contract as [`Resource::from_raw`].
    pub unsafe fn new_instance_tagged(
        &self,
        pointer: *mut c_void,
        tag: u32,
        owner: *mut c_void,
    ) -> Result<RclHandle<L>> {
        let category = ResourceCategory::try_from(tag)?;
        self.new_instance(pointer, category, owner)
    }

    fn instance(&self, resource: Option<Resource>) -> RclHandle<L> {
        let handle = ResourceHandle::new(
            resource,
            self.library.clone(),
            Rc::clone(&self.sink),
            self.options.log_lifecycle,
        );
        RclHandle {
            inner: Rc::new(RefCell::new(handle)),
            class_name: Rc::clone(&self.class_name),
        }
    }
}

impl<L: NativeLibrary + Clone> fmt::Debug for Binding<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A host-managed resource handle.
///
/// Clones share one [`ResourceHandle`]. Dropping the last clone destroys
/// it; explicit `destroy` and `dismiss` act on all clones at once.
pub struct RclHandle<L: NativeLibrary> {
    inner: Rc<RefCell<ResourceHandle<L>>>,
    class_name: Rc<str>,
}

impl<L: NativeLibrary> RclHandle<L> {
    /// Read-only properties exposed to host code.
    pub const PROPERTIES: &'static [&'static str] = &["pointer", "category"];

    /// Methods exposed to host code.
    pub const METHODS: &'static [&'static str] = &["destroy", "dismiss"];

    /// Finalize and release the bound resource.
    ///
    /// The handle is only mutably borrowed while the resource is unbound, so
    /// the native routines and the sink may read this instance. A nested
    /// `destroy` issued from either finds the handle empty.
    pub fn destroy(&self) {
        let resource = match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.take_resource(),
            Err(_) => None,
        };
        let Some(resource) = resource else {
            return;
        };

        let (diagnostic, sink) = {
            let inner = self.inner.borrow();
            (inner.teardown(resource), inner.sink())
        };
        if let Some(diagnostic) = diagnostic {
            sink.record(diagnostic);
        }
    }

    /// Give up the bound resource without finalizing it.
    ///
    /// Yields nothing while a teardown of this instance is in progress.
    pub fn dismiss(&self) -> Option<Resource> {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.dismiss(),
            Err(_) => None,
        }
    }

    /// The bound address as `0x…`, or an empty string.
    pub fn pointer(&self) -> String {
        self.inner.borrow().pointer()
    }

    /// The category label.
    pub fn category(&self) -> &'static str {
        self.inner.borrow().category_label()
    }

    /// The category tag.
    pub fn kind(&self) -> ResourceCategory {
        self.inner.borrow().category()
    }

    /// The owning node's address, if recorded.
    pub fn owner(&self) -> Option<usize> {
        self.inner.borrow().owner()
    }

    /// Whether no resource is bound.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Number of live host references to this instance.
    pub fn references(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Whether two values are references to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<L: NativeLibrary> Clone for RclHandle<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            class_name: Rc::clone(&self.class_name),
        }
    }
}

impl<L: NativeLibrary> HostObject for RclHandle<L> {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn get(&self, property: &str) -> Result<String> {
        match property {
            "pointer" | "handle" => Ok(self.pointer()),
            "category" | "type" => Ok(self.category().to_string()),
            _ => Err(Error::UnknownProperty(property.to_string())),
        }
    }

    fn set(&self, property: &str, _value: &str) -> Result<()> {
        match property {
            "pointer" | "handle" | "category" | "type" => {
                Err(Error::ReadOnlyProperty(property.to_string()))
            }
            _ => Err(Error::UnknownProperty(property.to_string())),
        }
    }

    fn call(&self, method: &str) -> Result<()> {
        match method {
            "destroy" => {
                self.destroy();
                Ok(())
            }
            "dismiss" => {
                self.dismiss();
                Ok(())
            }
            _ => Err(Error::UnknownMethod(method.to_string())),
        }
    }
}

impl<L: NativeLibrary> fmt::Display for RclHandle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        if inner.is_empty() {
            write!(f, "{}(empty)", self.class_name)
        } else {
            write!(
                f,
                "{}({} @ {})",
                self.class_name,
                inner.category_label(),
                inner.pointer()
            )
        }
    }
}

impl<L: NativeLibrary> fmt::Debug for RclHandle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RclHandle")
            .field("class_name", &self.class_name)
            .field("handle", &*self.inner.borrow())
            .field("references", &self.references())
            .finish()
    }
}
