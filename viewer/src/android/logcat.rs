use std::ffi::{c_char, c_int, CStr, CString};
use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

#[link(name = "log")]
extern "C" {
    fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
}

// android_LogPriority
const ANDROID_LOG_VERBOSE: c_int = 2;
const ANDROID_LOG_DEBUG: c_int = 3;
const ANDROID_LOG_INFO: c_int = 4;
const ANDROID_LOG_WARN: c_int = 5;
const ANDROID_LOG_ERROR: c_int = 6;

fn priority(level: &Level) -> c_int {
    match *level {
        Level::TRACE => ANDROID_LOG_VERBOSE,
        Level::DEBUG => ANDROID_LOG_DEBUG,
        Level::INFO => ANDROID_LOG_INFO,
        Level::WARN => ANDROID_LOG_WARN,
        Level::ERROR => ANDROID_LOG_ERROR,
    }
}

/// `MakeWriter` that sends each formatted event to logcat as one line.
pub(crate) struct LogcatMakeWriter {
    tag: CString,
}

impl LogcatMakeWriter {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: CString::new(tag).unwrap_or_default(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogcatMakeWriter {
    type Writer = LogcatWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogcatWriter {
            tag: &self.tag,
            priority: ANDROID_LOG_INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LogcatWriter {
            tag: &self.tag,
            priority: priority(meta.level()),
            buffer: Vec::new(),
        }
    }
}

/// Buffers one event and writes it to logcat when dropped.
pub(crate) struct LogcatWriter<'a> {
    tag: &'a CStr,
    priority: c_int,
    buffer: Vec<u8>,
}

impl io::Write for LogcatWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogcatWriter<'_> {
    fn drop(&mut self) {
        while self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
        }
        if self.buffer.is_empty() {
            return;
        }
        self.buffer.retain(|&b| b != 0);
        let Ok(text) = CString::new(std::mem::take(&mut self.buffer)) else {
            return;
        };
        // SAFETY: both pointers are valid NUL-terminated strings for the call.
        unsafe {
            __android_log_write(self.priority, self.tag.as_ptr(), text.as_ptr());
        }
    }
}
