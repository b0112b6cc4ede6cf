//! Poll-the-error-queue debugging.
//!
//! GL doesn't tell you a call failed, it sets a flag and waits for you to ask. The discipline is:
//! drain whatever was already queued, make the call, then drain again and report everything that
//! showed up. [`device_call!`] does exactly that around one device method.
//!
//! None of this is error *handling*. The failures get logged and life goes on.

use log::error;

use crate::device::{Device, ErrorCode};

/// Throws away every error flag currently queued on `device`.
pub fn clear_errors<D: Device + ?Sized>(device: &D) {
    while device.get_error().is_some() {}
}

/// Drains the error queue, logging each flag against `call` and its source location.
///
/// Returns `true` if the queue was already empty.
pub fn log_errors<D: Device + ?Sized>(device: &D, call: &str, file: &str, line: u32) -> bool {
    let mut clean = true;
    for code in drain_errors(device) {
        error!("[{}] {} at {}:{}", code, call, file, line);
        clean = false;
    }
    clean
}

/// Drains the error queue into a list, oldest first.
pub fn drain_errors<D: Device + ?Sized>(device: &D) -> Vec<ErrorCode> {
    let mut codes = Vec::new();
    while let Some(code) = device.get_error() {
        codes.push(code);
    }
    codes
}

/// Calls one device method with the error queue cleared before and reported after.
///
/// ```ignore
/// device_call!(self.device, bind_buffer(BufferTarget::Array, Some(self.id)));
/// ```
#[macro_export]
macro_rules! device_call {
    ($device:expr, $method:ident ( $($arg:expr),* $(,)? )) => {{
        let device = $device;
        $crate::debug::clear_errors(device);
        let result = $crate::device::Device::$method(device, $($arg),*);
        $crate::debug::log_errors(device, stringify!($method($($arg),*)), file!(), line!());
        result
    }};
}
