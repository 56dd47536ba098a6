//! Basic example of handle lifecycles against a stand-in native library.
//!
//! Run with: RUST_LOG=debug cargo run --example basic

use std::os::raw::c_void;
use std::ptr::NonNull;

use rcl_handle::{
    status, Binding, HostObject, NativeLibrary, RclClient, RclNode, RclPublisher, RclRet,
    RclService, RclSubscription, RclTimer, ResourceCategory,
};
use tracing_subscriber::EnvFilter;

/// Prints each call; every "resource" is a boxed `u64`.
#[derive(Debug, Clone, Copy)]
struct PrintingLibrary;

impl NativeLibrary for PrintingLibrary {
    unsafe fn node_fini(&self, node: NonNull<RclNode>) -> RclRet {
        println!("  rcl_node_fini({:p})", node);
        status::RCL_RET_OK
    }

    unsafe fn publisher_fini(
        &self,
        publisher: NonNull<RclPublisher>,
        node: NonNull<RclNode>,
    ) -> RclRet {
        println!("  rcl_publisher_fini({:p}, {:p})", publisher, node);
        status::RCL_RET_OK
    }

    unsafe fn subscription_fini(
        &self,
        subscription: NonNull<RclSubscription>,
        node: NonNull<RclNode>,
    ) -> RclRet {
        println!("  rcl_subscription_fini({:p}, {:p})", subscription, node);
        status::RCL_RET_OK
    }

    unsafe fn service_fini(&self, service: NonNull<RclService>, node: NonNull<RclNode>) -> RclRet {
        println!("  rcl_service_fini({:p}, {:p})", service, node);
        status::RCL_RET_OK
    }

    unsafe fn client_fini(&self, client: NonNull<RclClient>, node: NonNull<RclNode>) -> RclRet {
        println!("  rcl_client_fini({:p}, {:p})", client, node);
        status::RCL_RET_OK
    }

    unsafe fn timer_fini(&self, timer: NonNull<RclTimer>) -> RclRet {
        println!("  rcl_timer_fini({:p})", timer);
        status::RCL_RET_TIMER_INVALID
    }

    unsafe fn release(&self, pointer: NonNull<c_void>) {
        println!("  free({:p})", pointer);
        drop(Box::from_raw(pointer.cast::<u64>().as_ptr()));
    }
}

fn allocate() -> *mut c_void {
    Box::into_raw(Box::new(0u64)).cast()
}

fn main() -> rcl_handle::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let binding = Binding::new(PrintingLibrary);

    println!("--- Node and publisher ---");
    let node_ptr = allocate();
    let node =
        unsafe { binding.new_instance(node_ptr, ResourceCategory::Node, std::ptr::null_mut())? };

    let publisher =
        unsafe { binding.new_instance(allocate(), ResourceCategory::Publisher, node_ptr)? };
    println!(
        "{}: handle={} type={}",
        publisher,
        publisher.get("handle")?,
        publisher.get("type")?
    );
    publisher.call("destroy")?;

    println!("\n--- Publisher without owner (finalize skipped) ---");
    let orphan = unsafe {
        binding.new_instance(allocate(), ResourceCategory::Publisher, std::ptr::null_mut())?
    };
    orphan.destroy();

    println!("\n--- Timer whose finalize fails ---");
    let timer =
        unsafe { binding.new_instance(allocate(), ResourceCategory::Timer, std::ptr::null_mut())? };
    timer.destroy();

    println!("\n--- Collected when the last reference drops ---");
    let alias = node.clone();
    drop(node);
    println!("  one reference left: {}", alias);
    drop(alias);

    Ok(())
}
