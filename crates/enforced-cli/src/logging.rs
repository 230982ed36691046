//! Log output: stderr, or the system log with `--syslog`

use std::ffi::CString;
use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::Result;

/// Install the global subscriber.
pub fn init(level: Level, syslog: bool) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    if syslog {
        let subscriber = builder
            .with_ansi(false)
            .without_time()
            .with_writer(Syslog::open())
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_writer(io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Hands each formatted event to `syslog(3)` under facility `LOG_DAEMON`.
pub struct Syslog(());

impl Syslog {
    pub fn open() -> Self {
        sys::open(c"enforced");
        Self(())
    }
}

impl<'a> MakeWriter<'a> for Syslog {
    type Writer = SyslogLine;

    fn make_writer(&'a self) -> Self::Writer {
        SyslogLine::new(libc::LOG_INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SyslogLine::new(priority(meta.level()))
    }
}

fn priority(level: &Level) -> libc::c_int {
    match *level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        _ => libc::LOG_DEBUG,
    }
}

/// Buffers one event and submits it as a single record when dropped.
pub struct SyslogLine {
    priority: libc::c_int,
    buffer: Vec<u8>,
}

impl SyslogLine {
    fn new(priority: libc::c_int) -> Self {
        Self {
            priority,
            buffer: Vec::new(),
        }
    }

    fn message(&self) -> Option<CString> {
        let text: Vec<u8> = self
            .buffer
            .strip_suffix(b"\n")
            .unwrap_or(&self.buffer)
            .iter()
            .copied()
            .filter(|&b| b != 0)
            .collect();
        if text.is_empty() {
            return None;
        }
        CString::new(text).ok()
    }
}

impl io::Write for SyslogLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogLine {
    fn drop(&mut self) {
        if let Some(message) = self.message() {
            sys::send(self.priority, &message);
        }
    }
}

/// The only calls into libc.
mod sys {
    use std::ffi::CStr;

    // SAFETY (both functions): every pointer passed is NUL-terminated and
    // valid for the call. openlog keeps `ident`, which is 'static. syslog
    // gets the fixed "%s" format with exactly one string argument.

    pub(super) fn open(ident: &'static CStr) {
        unsafe { libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_DAEMON) };
    }

    pub(super) fn send(priority: libc::c_int, message: &CStr) {
        unsafe { libc::syslog(priority, c"%s".as_ptr(), message.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn levels_map_to_priorities() {
        assert_eq!(priority(&Level::ERROR), libc::LOG_ERR);
        assert_eq!(priority(&Level::WARN), libc::LOG_WARNING);
        assert_eq!(priority(&Level::INFO), libc::LOG_INFO);
        assert_eq!(priority(&Level::DEBUG), libc::LOG_DEBUG);
        assert_eq!(priority(&Level::TRACE), libc::LOG_DEBUG);
    }

    #[test]
    fn message_drops_trailing_newline_and_nul_bytes() {
        let mut line = SyslogLine::new(libc::LOG_INFO);
        line.write_all(b"Going to\0 chmod\n").unwrap();
        assert_eq!(line.message().unwrap().as_bytes(), b"Going to chmod");
        line.buffer.clear();
    }

    #[test]
    fn empty_line_sends_nothing() {
        let line = SyslogLine::new(libc::LOG_INFO);
        assert!(line.message().is_none());
    }
}
