//! Scoped suppression of engine diagnostics
//!
//! While a [`QuietGuard`] is alive the logging layer drops events and the
//! process's standard output descriptor points at the null device, so an
//! in-process engine that prints cannot reach the real stdout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{warn, Metadata};
use tracing_subscriber::filter::{filter_fn, FilterFn};

/// Mirrors `QuietState::depth` for the lock-free log filter
static SUPPRESSION_DEPTH: AtomicUsize = AtomicUsize::new(0);

static STATE: Mutex<QuietState> = Mutex::new(QuietState {
    depth: 0,
    saved_stdout: None,
});

struct QuietState {
    depth: usize,
    /// Original stdout, held while the outermost guard is alive
    saved_stdout: Option<redirect::SavedStdout>,
}

fn state() -> MutexGuard<'static, QuietState> {
    STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Suppresses diagnostics until dropped
///
/// Guards nest; output resumes once every guard is gone.
#[must_use = "suppression ends when the guard is dropped"]
#[derive(Debug)]
pub struct QuietGuard {
    _private: (),
}

impl QuietGuard {
    pub fn acquire() -> Self {
        let mut state = state();
        if state.depth == 0 {
            match redirect::silence() {
                Ok(saved) => state.saved_stdout = Some(saved),
                Err(e) => warn!("Could not redirect stdout during engine call: {}", e),
            }
        }
        state.depth += 1;
        SUPPRESSION_DEPTH.store(state.depth, Ordering::SeqCst);
        Self { _private: () }
    }
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        let mut state = state();
        state.depth = state.depth.saturating_sub(1);
        SUPPRESSION_DEPTH.store(state.depth, Ordering::SeqCst);

        if state.depth == 0 {
            if let Some(saved) = state.saved_stdout.take() {
                if let Err(e) = redirect::restore(saved) {
                    warn!("Could not restore stdout: {}", e);
                }
            }
        }
    }
}

/// Check if any guard is alive
pub fn is_suppressed() -> bool {
    SUPPRESSION_DEPTH.load(Ordering::SeqCst) > 0
}

/// Decide whether an event passes while suppression may be active
pub fn allows(_metadata: &Metadata<'_>) -> bool {
    !is_suppressed()
}

/// Per-layer filter that drops events while a [`QuietGuard`] is held
pub fn suppression_filter() -> FilterFn<fn(&Metadata<'_>) -> bool> {
    filter_fn(allows as fn(&Metadata<'_>) -> bool)
}

#[cfg(unix)]
pub(crate) mod redirect {
    use std::fs::{File, OpenOptions};
    use std::io::{self, Write};
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    pub(crate) type SavedStdout = OwnedFd;

    /// Point the stdout descriptor at the null device
    pub(crate) fn silence() -> io::Result<SavedStdout> {
        let null = OpenOptions::new().write(true).open("/dev/null")?;
        to(&null)
    }

    /// Point the stdout descriptor at `target`, returning a duplicate of
    /// the original
    pub(crate) fn to(target: &File) -> io::Result<SavedStdout> {
        // Anything already buffered belongs to the original stream.
        let _ = io::stdout().flush();

        // SAFETY: dup has no memory preconditions; a non-negative result is
        // a fresh descriptor owned by nobody else.
        let saved = unsafe { libc::dup(libc::STDOUT_FILENO) };
        if saved < 0 {
            return Err(io::Error::last_os_error());
        }
        let saved = unsafe { OwnedFd::from_raw_fd(saved) };

        if unsafe { libc::dup2(target.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(saved)
    }

    /// Put the original stdout descriptor back
    pub(crate) fn restore(saved: SavedStdout) -> io::Result<()> {
        // Leftovers in the buffer were written while redirected and are
        // discarded with it.
        let _ = io::stdout().flush();

        if unsafe { libc::dup2(saved.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
pub(crate) mod redirect {
    use std::io;

    pub(crate) type SavedStdout = ();

    pub(crate) fn silence() -> io::Result<SavedStdout> {
        Ok(())
    }

    pub(crate) fn restore(_saved: SavedStdout) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with the process stdout descriptor captured into a file
#[cfg(all(test, unix))]
pub(crate) fn capture_process_stdout<R>(f: impl FnOnce() -> R) -> (R, String) {
    use std::io::{Read, Seek, SeekFrom};

    let mut file = tempfile::tempfile().unwrap();
    let saved = redirect::to(&file).unwrap();
    let result = f();
    redirect::restore(saved).unwrap();

    let mut captured = String::new();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_to_string(&mut captured).unwrap();
    (result, captured)
}
