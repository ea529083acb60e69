//! The FFmpeg backend boundary.
//!
//! Everything that touches the raw FFmpeg C API lives here: library
//! initialisation, log-level control, and [`open_guarded`], which opens a
//! demux context with a [`Deadline`] interrupt callback installed *before*
//! any I/O happens, so that even the open and probe calls are bounded by the
//! session budget. The safe `ffmpeg-next` API offers no surface for the
//! interrupt callback, which is why this module reaches for
//! `ffmpeg-sys-next` directly.

use std::{
    ffi::CString,
    os::raw::{c_int, c_void},
    path::Path,
    sync::Once,
};

use ffmpeg_next::{format::context::Input, util::log::Level};
use ffmpeg_sys_next::{
    AVIOInterruptCB, avformat_alloc_context, avformat_close_input, avformat_find_stream_info,
    avformat_open_input,
};

use crate::{deadline::Deadline, error::LoadError};

static INIT: Once = Once::new();

/// Initialise the FFmpeg libraries (idempotent).
///
/// Called by [`DecodeSession::open`](crate::DecodeSession::open); the first
/// invocation also quiets FFmpeg's stderr output down to
/// [`BackendLogLevel::Error`], the level the engine defaults to. Callers may
/// raise it afterwards via [`set_backend_log_level`].
pub(crate) fn init() -> Result<(), LoadError> {
    ffmpeg_next::init().map_err(|error| LoadError::Backend(error.to_string()))?;
    INIT.call_once(|| {
        ffmpeg_next::util::log::set_level(Level::Error);
    });
    Ok(())
}

/// FFmpeg internal log verbosity level.
///
/// FFmpeg has its own logging system, separate from the Rust
/// [`log`](https://crates.io/crates/log) crate; by default it prints
/// warnings and errors to stderr, which is noisy when decoding large batches
/// of partially-corrupt training data. The engine initialises it to `Error`.
///
/// Ordering (most verbose to most quiet):
/// `Trace` > `Debug` > `Verbose` > `Info` > `Warning` > `Error` > `Fatal` > `Panic` > `Quiet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only log just before aborting the process.
    Panic,
    /// Only log unrecoverable errors.
    Fatal,
    /// Log recoverable errors (the engine default).
    Error,
    /// Log warnings (FFmpeg's own default).
    Warning,
    /// Log informational messages.
    Info,
    /// Log verbose informational messages.
    Verbose,
    /// Log debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl BackendLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            BackendLogLevel::Quiet => Level::Quiet,
            BackendLogLevel::Panic => Level::Panic,
            BackendLogLevel::Fatal => Level::Fatal,
            BackendLogLevel::Error => Level::Error,
            BackendLogLevel::Warning => Level::Warning,
            BackendLogLevel::Info => Level::Info,
            BackendLogLevel::Verbose => Level::Verbose,
            BackendLogLevel::Debug => Level::Debug,
            BackendLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// This controls what FFmpeg prints to stderr. It does **not** affect
/// Rust-side `log` crate output; configure those with a standard `log`
/// subscriber.
pub fn set_backend_log_level(level: BackendLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Interrupt callback trampoline handed to FFmpeg.
///
/// FFmpeg invokes this from inside blocking read and seek calls; a non-zero
/// return aborts the call. `opaque` is the session's [`Deadline`], whose
/// boxed address outlives the format context it is installed on.
unsafe extern "C" fn deadline_interrupt(opaque: *mut c_void) -> c_int {
    // SAFETY: `opaque` was set in `open_guarded` from a `&Deadline` that the
    // owning session keeps alive for longer than the format context. The
    // callback only runs on the session thread, so the Cell state inside
    // Deadline is never accessed concurrently.
    let deadline = unsafe { &*(opaque as *const Deadline) };
    if deadline.check() { 0 } else { 1 }
}

/// Open a container with the deadline's interrupt callback installed.
///
/// Allocates the format context by hand so the callback can be registered
/// before `avformat_open_input` performs any I/O, then probes stream
/// information and wraps the result into the safe [`Input`] type, whose
/// `Drop` closes the container.
///
/// # Errors
///
/// - [`LoadError::ContainerOpen`] if the open call fails (or
///   [`LoadError::Timeout`] when the deadline aborted it).
/// - [`LoadError::StreamProbe`] if stream information cannot be probed.
pub(crate) fn open_guarded(path: &Path, deadline: &Deadline) -> Result<Input, LoadError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| LoadError::InvalidRequest(format!("non-UTF-8 path: {}", path.display())))?;
    let path_c = CString::new(path_str)
        .map_err(|_| LoadError::InvalidRequest(format!("path contains NUL: {path_str}")))?;

    // SAFETY: standard avformat open sequence. The context is either handed
    // to `Input::wrap` (which closes it on drop) or closed on every error
    // path below. `avformat_open_input` frees the context itself on failure.
    unsafe {
        let mut context = avformat_alloc_context();
        if context.is_null() {
            return Err(LoadError::Backend(
                "failed to allocate format context".to_string(),
            ));
        }

        (*context).interrupt_callback = AVIOInterruptCB {
            callback: Some(deadline_interrupt),
            opaque: deadline as *const Deadline as *mut c_void,
        };

        let status = avformat_open_input(
            &mut context,
            path_c.as_ptr(),
            std::ptr::null(),
            std::ptr::null_mut(),
        );
        if status != 0 {
            if deadline.is_expired() {
                return Err(LoadError::Timeout {
                    budget: deadline.budget(),
                });
            }
            return Err(LoadError::ContainerOpen {
                path: path.to_path_buf(),
                reason: ffmpeg_next::Error::from(status).to_string(),
            });
        }

        let status = avformat_find_stream_info(context, std::ptr::null_mut());
        if status < 0 {
            let reason = if deadline.is_expired() {
                None
            } else {
                Some(ffmpeg_next::Error::from(status).to_string())
            };
            avformat_close_input(&mut context);
            return match reason {
                None => Err(LoadError::Timeout {
                    budget: deadline.budget(),
                }),
                Some(reason) => Err(LoadError::StreamProbe(reason)),
            };
        }

        Ok(Input::wrap(context))
    }
}
