//! Panic guard macros for FFI boundary safety.
//!
//! Every `extern "C"` function must catch panics to prevent undefined
//! behaviour when unwinding crosses the FFI boundary.

/// Wrap an FFI function body that returns [`QuellError`](crate::types::QuellError).
///
/// On panic the macro returns `QuellError::Internal`.
macro_rules! ffi_guard {
    ($($body:tt)*) => {{
        use std::panic;
        use std::panic::AssertUnwindSafe;

        match panic::catch_unwind(AssertUnwindSafe(move || { $($body)* })) {
            Ok(result) => result,
            Err(_) => $crate::types::QuellError::Internal,
        }
    }};
}

/// Wrap an FFI function body that returns a pointer.
///
/// On panic the macro returns [`std::ptr::null_mut()`].
macro_rules! ffi_guard_ptr {
    ($($body:tt)*) => {{
        use std::panic;
        use std::panic::AssertUnwindSafe;
        use std::ptr;

        match panic::catch_unwind(AssertUnwindSafe(move || { $($body)* })) {
            Ok(result) => result,
            Err(_) => ptr::null_mut(),
        }
    }};
}

/// Wrap an FFI function body that returns a plain value.
///
/// On panic the macro returns the given fallback.
macro_rules! ffi_guard_or {
    ($fallback:expr, $($body:tt)*) => {{
        use std::panic;
        use std::panic::AssertUnwindSafe;

        match panic::catch_unwind(AssertUnwindSafe(move || { $($body)* })) {
            Ok(result) => result,
            Err(_) => $fallback,
        }
    }};
}

pub(crate) use ffi_guard;
pub(crate) use ffi_guard_or;
pub(crate) use ffi_guard_ptr;

#[cfg(test)]
mod tests {
    use crate::types::QuellError;

    #[test]
    fn ffi_guard_returns_value_on_success() {
        let result: QuellError = ffi_guard! { QuellError::None };
        assert_eq!(result, QuellError::None);
    }

    #[test]
    fn ffi_guard_returns_internal_on_panic() {
        let result: QuellError = ffi_guard! {
            panic!("test panic");
        };
        assert_eq!(result, QuellError::Internal);
    }

    #[test]
    fn ffi_guard_ptr_returns_null_on_panic() {
        let ptr: *mut i32 = ffi_guard_ptr! {
            panic!("test panic");
        };
        assert!(ptr.is_null());
    }

    #[test]
    fn ffi_guard_or_returns_fallback_on_panic() {
        let value: f64 = ffi_guard_or! { -1.0,
            panic!("test panic");
        };
        assert_eq!(value, -1.0);
        let value: f64 = ffi_guard_or! { -1.0, 2.5 };
        assert_eq!(value, 2.5);
    }
}
