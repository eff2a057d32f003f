//! Open, seek, read and close issued by syscall number.

use std::ffi;
use std::ffi::CString;
use std::io;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStrExt as _;
use std::path::Path;

use crate::vocab::Whence;
use crate::SeekOffset;

/// Raw status of a syscall plus the value it produced, if any.
///
/// Failures carry a negative errno in `status`, the way the kernel reports
/// them, regardless of how the underlying call surfaced the error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome<T> {
    pub status: ffi::c_long,
    pub value: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(status: ffi::c_long, value: T) -> Self {
        Outcome {
            status,
            value: Some(value),
        }
    }

    pub fn failed(status: ffi::c_long) -> Self {
        Outcome {
            status,
            value: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status >= 0
    }
}

pub trait SyscallGateway {
    /// `mode` is passed as a third argument only when present.
    fn open(&mut self, path: &Path, flags: u32, mode: Option<u32>) -> Outcome<RawFd>;

    /// The value is the resulting file position.
    fn llseek(&mut self, fd: RawFd, offset: SeekOffset, whence: Whence) -> Outcome<i64>;

    fn read(&mut self, fd: RawFd, buffer: &mut [u8]) -> Outcome<usize>;

    fn close(&mut self, fd: RawFd) -> Outcome<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenAbi {
    /// `open(path, flags[, mode])`
    Open(ffi::c_long),
    /// `openat(AT_FDCWD, path, flags[, mode])`
    OpenAt(ffi::c_long),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeekAbi {
    /// `_llseek(fd, offset_high, offset_low, &result, whence)`
    Llseek(ffi::c_long),
    /// `lseek(fd, offset, whence)`, returning the position.
    Lseek(ffi::c_long),
}

/// Syscall numbers and calling conventions for the running architecture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SyscallTable {
    pub open: OpenAbi,
    pub seek: SeekAbi,
    pub read: ffi::c_long,
    pub close: ffi::c_long,
}

impl SyscallTable {
    /// i386 numbers, used by older tools when the headers lack them.
    pub const I386_FALLBACK: SyscallTable = SyscallTable {
        open: OpenAbi::Open(5),
        seek: SeekAbi::Llseek(140),
        read: 3,
        close: 6,
    };

    #[cfg(target_arch = "x86")]
    pub fn native() -> Self {
        SyscallTable::I386_FALLBACK
    }

    #[cfg(not(target_arch = "x86"))]
    pub fn native() -> Self {
        SyscallTable {
            open: native_open(),
            seek: native_seek(),
            read: libc::SYS_read,
            close: libc::SYS_close,
        }
    }

    pub fn is_i386_fallback(&self) -> bool {
        *self == SyscallTable::I386_FALLBACK
    }
}

#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
fn native_open() -> OpenAbi {
    OpenAbi::Open(libc::SYS_open)
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "arm")))]
fn native_open() -> OpenAbi {
    OpenAbi::OpenAt(libc::SYS_openat)
}

// 64-bit kernels have no _llseek: lseek takes the whole offset there.
#[cfg(target_arch = "arm")]
fn native_seek() -> SeekAbi {
    SeekAbi::Llseek(libc::SYS__llseek)
}

#[cfg(not(any(target_arch = "x86", target_arch = "arm")))]
fn native_seek() -> SeekAbi {
    SeekAbi::Lseek(libc::SYS_lseek)
}

/// Gateway backed by `libc::syscall`.
pub struct RawGateway {
    table: SyscallTable,
}

impl RawGateway {
    pub fn new(table: SyscallTable) -> Self {
        log::debug!(
            "syscall table: {:?} (i386 fallback numbers: {})",
            table,
            table.is_i386_fallback()
        );
        RawGateway { table }
    }
}

/// `libc::syscall` returns -1 and sets errno; turn that into -errno.
fn normalize(ret: ffi::c_long) -> ffi::c_long {
    match ret {
        -1 => {
            let errno = io::Error::last_os_error()
                .raw_os_error()
                .unwrap_or(libc::EIO);
            -ffi::c_long::from(errno)
        }
        ret => ret,
    }
}

impl SyscallGateway for RawGateway {
    fn open(&mut self, path: &Path, flags: u32, mode: Option<u32>) -> Outcome<RawFd> {
        let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
            log::debug!("open({}): path contains NUL", path.display());
            return Outcome::failed(-ffi::c_long::from(libc::EINVAL));
        };

        let flags = flags as ffi::c_int;
        let ret = normalize(unsafe {
            match (self.table.open, mode) {
                (OpenAbi::Open(nr), None) => libc::syscall(nr, cpath.as_ptr(), flags),
                (OpenAbi::Open(nr), Some(mode)) => {
                    libc::syscall(nr, cpath.as_ptr(), flags, mode as ffi::c_uint)
                }
                (OpenAbi::OpenAt(nr), None) => {
                    libc::syscall(nr, libc::AT_FDCWD, cpath.as_ptr(), flags)
                }
                (OpenAbi::OpenAt(nr), Some(mode)) => libc::syscall(
                    nr,
                    libc::AT_FDCWD,
                    cpath.as_ptr(),
                    flags,
                    mode as ffi::c_uint,
                ),
            }
        });

        log::debug!(
            "open({}, {:#o}, {:?}) = {}",
            path.display(),
            flags,
            mode.map(|mode| format!("{:#o}", mode)),
            ret
        );

        match ret {
            fd if fd >= 0 => Outcome::ok(fd, fd as RawFd),
            error => Outcome::failed(error),
        }
    }

    fn llseek(&mut self, fd: RawFd, offset: SeekOffset, whence: Whence) -> Outcome<i64> {
        let (ret, position) = match self.table.seek {
            SeekAbi::Llseek(nr) => {
                let mut result: i64 = 0;
                let ret = normalize(unsafe {
                    libc::syscall(
                        nr,
                        fd as ffi::c_uint,
                        offset.high as ffi::c_ulong,
                        offset.low as ffi::c_ulong,
                        &mut result as *mut i64,
                        whence.raw() as ffi::c_uint,
                    )
                });
                (ret, result)
            }
            SeekAbi::Lseek(nr) => {
                let ret = normalize(unsafe {
                    libc::syscall(nr, fd, offset.as_i64() as libc::off_t, whence.raw())
                });
                (ret, ret as i64)
            }
        };

        log::debug!(
            "llseek({}, {:#x}, {:#x}, {:?}) = {}",
            fd,
            offset.high,
            offset.low,
            whence,
            ret
        );

        match ret {
            ret if ret >= 0 => Outcome::ok(ret, position),
            error => Outcome::failed(error),
        }
    }

    fn read(&mut self, fd: RawFd, buffer: &mut [u8]) -> Outcome<usize> {
        let ret = normalize(unsafe {
            libc::syscall(
                self.table.read,
                fd as ffi::c_uint,
                buffer.as_mut_ptr(),
                buffer.len(),
            )
        });

        log::debug!("read({}, {}) = {}", fd, buffer.len(), ret);

        match ret {
            count if count >= 0 => Outcome::ok(count, count as usize),
            error => Outcome::failed(error),
        }
    }

    fn close(&mut self, fd: RawFd) -> Outcome<()> {
        let ret = normalize(unsafe { libc::syscall(self.table.close, fd as ffi::c_uint) });

        log::debug!("close({}) = {}", fd, ret);

        match ret {
            0 => Outcome::ok(0, ()),
            error => Outcome::failed(error),
        }
    }
}
