//! Status code conversion utilities for FFI.

use super::raw::{
    RclRet, RCL_RET_ALREADY_INIT, RCL_RET_BAD_ALLOC, RCL_RET_CLIENT_INVALID, RCL_RET_ERROR,
    RCL_RET_INVALID_ARGUMENT, RCL_RET_NODE_INVALID, RCL_RET_NOT_INIT, RCL_RET_OK,
    RCL_RET_PUBLISHER_INVALID, RCL_RET_SERVICE_INVALID, RCL_RET_SUBSCRIPTION_INVALID,
    RCL_RET_TIMEOUT, RCL_RET_TIMER_INVALID, RCL_RET_UNSUPPORTED,
};
use crate::error::Error;

/// Symbolic name of an rcl status code.
pub fn ret_name(code: RclRet) -> &'static str {
    match code {
        RCL_RET_OK => "RCL_RET_OK",
        RCL_RET_ERROR => "RCL_RET_ERROR",
        RCL_RET_TIMEOUT => "RCL_RET_TIMEOUT",
        RCL_RET_UNSUPPORTED => "RCL_RET_UNSUPPORTED",
        RCL_RET_BAD_ALLOC => "RCL_RET_BAD_ALLOC",
        RCL_RET_INVALID_ARGUMENT => "RCL_RET_INVALID_ARGUMENT",
        RCL_RET_ALREADY_INIT => "RCL_RET_ALREADY_INIT",
        RCL_RET_NOT_INIT => "RCL_RET_NOT_INIT",
        RCL_RET_NODE_INVALID => "RCL_RET_NODE_INVALID",
        RCL_RET_PUBLISHER_INVALID => "RCL_RET_PUBLISHER_INVALID",
        RCL_RET_SUBSCRIPTION_INVALID => "RCL_RET_SUBSCRIPTION_INVALID",
        RCL_RET_CLIENT_INVALID => "RCL_RET_CLIENT_INVALID",
        RCL_RET_SERVICE_INVALID => "RCL_RET_SERVICE_INVALID",
        RCL_RET_TIMER_INVALID => "RCL_RET_TIMER_INVALID",
        _ => "RCL_RET_UNKNOWN",
    }
}

/// Check a status code and convert to Result.
pub fn check_ret(code: RclRet) -> crate::Result<()> {
    if code == RCL_RET_OK {
        Ok(())
    } else {
        Err(Error::Native {
            code,
            status: ret_name(code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ret_ok() {
        assert!(check_ret(RCL_RET_OK).is_ok());
    }

    #[test]
    fn test_check_ret_failure_keeps_code() {
        let err = check_ret(RCL_RET_NODE_INVALID).unwrap_err();
        assert_eq!(err.native_code(), Some(RCL_RET_NODE_INVALID));
        assert_eq!(err.to_string(), "native call failed: RCL_RET_NODE_INVALID (200)");
    }

    #[test]
    fn test_unknown_code_name() {
        assert_eq!(ret_name(4242), "RCL_RET_UNKNOWN");
        assert_eq!(ret_name(RCL_RET_TIMER_INVALID), "RCL_RET_TIMER_INVALID");
    }
}
