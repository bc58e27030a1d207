//! Owned wrappers around librdkafka handles.
//!
//! Each handle lives in a [`NativePtr`] that destroys it on drop, so every
//! exit path releases what was acquired. Declare guards in acquisition order
//! and they are released in reverse.

use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;
use std::ptr::NonNull;
use std::time::Duration;

use rdkafka_sys as rdsys;
use tracing::trace;

/// # Safety
///
/// `DROP` must release a pointer of type `Self` obtained from librdkafka.
pub(crate) unsafe trait NativeDrop {
    const TYPE: &'static str;
    const DROP: unsafe extern "C" fn(*mut Self);
}

unsafe impl NativeDrop for rdsys::rd_kafka_queue_t {
    const TYPE: &'static str = "queue";
    const DROP: unsafe extern "C" fn(*mut Self) = rdsys::rd_kafka_queue_destroy;
}

unsafe impl NativeDrop for rdsys::rd_kafka_AdminOptions_t {
    const TYPE: &'static str = "admin options";
    const DROP: unsafe extern "C" fn(*mut Self) = rdsys::rd_kafka_AdminOptions_destroy;
}

unsafe impl NativeDrop for rdsys::rd_kafka_ConfigResource_t {
    const TYPE: &'static str = "config resource";
    const DROP: unsafe extern "C" fn(*mut Self) = rdsys::rd_kafka_ConfigResource_destroy;
}

unsafe impl NativeDrop for rdsys::rd_kafka_event_t {
    const TYPE: &'static str = "event";
    const DROP: unsafe extern "C" fn(*mut Self) = rdsys::rd_kafka_event_destroy;
}

pub(crate) struct NativePtr<T: NativeDrop> {
    ptr: NonNull<T>,
}

impl<T: NativeDrop> NativePtr<T> {
    /// Takes ownership of `ptr`. Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live handle that nothing else will destroy.
    pub(crate) unsafe fn from_ptr(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T: NativeDrop> Drop for NativePtr<T> {
    fn drop(&mut self) {
        trace!("Destroying {}: {:?}", T::TYPE, self.ptr);
        unsafe { T::DROP(self.ptr.as_ptr()) }
        trace!("Destroyed {}: {:?}", T::TYPE, self.ptr);
    }
}

impl<T: NativeDrop> fmt::Debug for NativePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativePtr<{}>({:?})", T::TYPE, self.ptr)
    }
}

pub(crate) type NativeQueue = NativePtr<rdsys::rd_kafka_queue_t>;
pub(crate) type NativeAdminOptions = NativePtr<rdsys::rd_kafka_AdminOptions_t>;
pub(crate) type NativeConfigResource = NativePtr<rdsys::rd_kafka_ConfigResource_t>;
pub(crate) type NativeEvent = NativePtr<rdsys::rd_kafka_event_t>;

const ERR_BUF_LEN: usize = 512;

/// Buffer librdkafka writes a NUL-terminated diagnostic into.
pub(crate) struct ErrBuf {
    buf: [c_char; ERR_BUF_LEN],
}

impl ErrBuf {
    pub(crate) fn new() -> ErrBuf {
        ErrBuf {
            buf: [0; ERR_BUF_LEN],
        }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut c_char {
        self.buf.as_mut_ptr()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl fmt::Display for ErrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Always NUL-terminated: zero-initialised and librdkafka truncates.
        let msg = unsafe { CStr::from_ptr(self.buf.as_ptr()) };
        f.write_str(&msg.to_string_lossy())
    }
}

/// Copies a C string owned by librdkafka.
///
/// # Safety
///
/// `ptr` must be null or point at a NUL-terminated string.
pub(crate) unsafe fn cstr_to_owned(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Milliseconds as librdkafka's `int` timeout, saturating.
pub(crate) fn timeout_ms(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX)
}
