//! Opaque types for native rcl structures.
//!
//! Each type is a zero-sized `#[repr(C)]` marker so pointers to different
//! rcl structures cannot be mixed up. None of them are `Send`, `Sync` or
//! `Unpin`.

/// Macro to define an opaque native type.
macro_rules! define_opaque {
    ($name:ident, $c_name:literal) => {
        #[doc = concat!("Opaque `", $c_name, "` owned by librcl.")]
        #[repr(C)]
        pub struct $name {
            _data: [u8; 0],
            _marker: core::marker::PhantomData<(*mut u8, core::marker::PhantomPinned)>,
        }
    };
}

define_opaque!(RclNode, "rcl_node_t");
define_opaque!(RclPublisher, "rcl_publisher_t");
define_opaque!(RclSubscription, "rcl_subscription_t");
define_opaque!(RclService, "rcl_service_t");
define_opaque!(RclClient, "rcl_client_t");
define_opaque!(RclTimer, "rcl_timer_t");
define_opaque!(RosidlString, "rosidl_runtime_c__String");
