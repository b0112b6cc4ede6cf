use std::ffi::CStr;
use std::os::raw::c_char;

use gl;
use gl::types::*;

/// Reads an info log of `len` bytes (as reported by `INFO_LOG_LENGTH`) through `fill`, which gets
/// the buffer size, a place to write the written length, and the buffer itself.
pub fn read_info_log<F>(len: GLint, fill: F) -> String
where
    F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
    if len <= 0 {
        return String::new();
    }

    let mut buf: Vec<u8> = vec![0; len as usize];
    let mut written: GLsizei = 0;
    fill(len, &mut written, buf.as_mut_ptr() as *mut GLchar);

    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).trim_end().to_owned()
}

/// One of the `glGetString` strings, like the version or the renderer name.
pub fn gl_string(name: GLenum) -> String {
    let ptr = unsafe { gl::GetString(name) };
    if ptr.is_null() {
        return String::from("unknown");
    }

    unsafe { CStr::from_ptr(ptr as *const c_char) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn info_log_stops_at_the_written_length() {
        let log = read_info_log(16, |size, written, buf| {
            assert_eq!(size, 16);
            let message = b"0:1: error\n\0";
            unsafe {
                std::ptr::copy_nonoverlapping(message.as_ptr() as *const GLchar, buf, message.len());
                *written = (message.len() - 1) as GLsizei;
            }
        });

        assert_eq!(log, "0:1: error");
    }

    #[test]
    fn empty_info_log_skips_the_query() {
        let log = read_info_log(0, |_, _, _| panic!("nothing to read"));
        assert!(log.is_empty());
    }
}
