use std::ffi;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing required argument --{0}")]
    MissingRequiredArgument(&'static str),

    #[error("No {vocabulary} selector matched {input:?}")]
    MissingSelector {
        vocabulary: &'static str,
        input: Option<String>,
    },

    #[error("Can't open {} err {code} ({})", .path.display(), describe(*.code))]
    CannotOpen { path: PathBuf, code: ffi::c_long },
}

/// A step after open that failed without aborting the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Degraded {
    #[error("seek failed with status {0} ({})", describe(*.0))]
    Seek(ffi::c_long),

    #[error("read failed with status {0} ({})", describe(*.0))]
    Read(ffi::c_long),

    #[error("close failed with status {0} ({})", describe(*.0))]
    Close(ffi::c_long),
}

/// Render a negative-errno status.
fn describe(status: ffi::c_long) -> io::Error {
    io::Error::from_raw_os_error(status.checked_neg().unwrap_or(0) as i32)
}
