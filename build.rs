//! Build script for rcl-handle.
//!
//! With the `rcl` feature enabled, links against librcl from a ROS 2
//! installation. Without it nothing is linked and the crate only carries
//! the handle machinery.

use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-env-changed=RCL_LIB_DIR");
    println!("cargo:rerun-if-env-changed=AMENT_PREFIX_PATH");

    if env::var_os("CARGO_FEATURE_RCL").is_none() {
        return;
    }

    let lib_dirs = find_lib_dirs();
    if lib_dirs.is_empty() {
        panic!(
            "Could not find librcl. \
             Source a ROS 2 setup script or set RCL_LIB_DIR."
        );
    }

    for dir in &lib_dirs {
        println!("cargo:rustc-link-search=native={}", dir.display());
    }
    println!("cargo:rustc-link-lib=dylib=rcl");
}

/// Collect directories that contain librcl.
///
/// `RCL_LIB_DIR` wins if set; otherwise every `<prefix>/lib` from
/// `AMENT_PREFIX_PATH` holding the library is used.
fn find_lib_dirs() -> Vec<PathBuf> {
    if let Some(dir) = env::var_os("RCL_LIB_DIR") {
        return vec![PathBuf::from(dir)];
    }

    let Some(prefixes) = env::var_os("AMENT_PREFIX_PATH") else {
        return Vec::new();
    };

    env::split_paths(&prefixes)
        .map(|prefix| prefix.join("lib"))
        .filter(|dir| contains_rcl(dir))
        .collect()
}

/// Check whether a directory holds a librcl shared library.
fn contains_rcl(dir: &Path) -> bool {
    ["librcl.so", "librcl.dylib", "rcl.lib"]
        .iter()
        .any(|name| dir.join(name).exists())
}
