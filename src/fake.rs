//! In-memory gateway that records every syscall.

use std::collections::HashMap;
use std::ffi;
use std::os::fd::RawFd;
use std::path::Path;
use std::path::PathBuf;

use crate::gateway::Outcome;
use crate::gateway::SyscallGateway;
use crate::vocab::Whence;
use crate::SeekOffset;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Calls {
    pub open: usize,
    pub seek: usize,
    pub read: usize,
    pub close: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.open + self.seek + self.read + self.close
    }
}

struct OpenFile {
    path: PathBuf,
    position: i64,
}

#[derive(Default)]
pub struct FakeGateway {
    files: HashMap<PathBuf, Vec<u8>>,
    descriptors: HashMap<RawFd, OpenFile>,
    next_fd: RawFd,
    pub calls: Calls,
    pub open_modes: Vec<Option<u32>>,
    pub closed: Vec<RawFd>,
    pub fail_seek: Option<ffi::c_long>,
    pub fail_read: Option<ffi::c_long>,
    pub fail_close: Option<ffi::c_long>,
}

impl FakeGateway {
    pub fn new() -> Self {
        FakeGateway {
            next_fd: 3,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, path: &str, contents: &[u8]) -> Self {
        self.files.insert(PathBuf::from(path), contents.to_vec());
        self
    }

    pub fn contents(&self, path: &str) -> Option<&[u8]> {
        self.files.get(Path::new(path)).map(Vec::as_slice)
    }

    pub fn open_descriptors(&self) -> usize {
        self.descriptors.len()
    }
}

fn errno(code: ffi::c_int) -> ffi::c_long {
    -ffi::c_long::from(code)
}

impl SyscallGateway for FakeGateway {
    fn open(&mut self, path: &Path, flags: u32, mode: Option<u32>) -> Outcome<RawFd> {
        self.calls.open += 1;
        self.open_modes.push(mode);

        match self.files.get_mut(path) {
            Some(contents) if flags & libc::O_TRUNC as u32 != 0 => contents.clear(),
            Some(_) => (),
            None if flags & libc::O_CREAT as u32 != 0 => {
                self.files.insert(path.to_path_buf(), Vec::new());
            }
            None => return Outcome::failed(errno(libc::ENOENT)),
        }

        let fd = self.next_fd;
        self.next_fd += 1;
        self.descriptors.insert(
            fd,
            OpenFile {
                path: path.to_path_buf(),
                position: 0,
            },
        );

        Outcome::ok(fd as ffi::c_long, fd)
    }

    fn llseek(&mut self, fd: RawFd, offset: SeekOffset, whence: Whence) -> Outcome<i64> {
        self.calls.seek += 1;

        if let Some(status) = self.fail_seek {
            return Outcome::failed(status);
        }

        let Some(file) = self.descriptors.get_mut(&fd) else {
            return Outcome::failed(errno(libc::EBADF));
        };

        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => file.position,
            Whence::End => self.files[&file.path].len() as i64,
        };

        match base.checked_add(offset.as_i64()) {
            Some(position) if position >= 0 => {
                file.position = position;
                Outcome::ok(0, position)
            }
            _ => Outcome::failed(errno(libc::EINVAL)),
        }
    }

    fn read(&mut self, fd: RawFd, buffer: &mut [u8]) -> Outcome<usize> {
        self.calls.read += 1;

        if let Some(status) = self.fail_read {
            return Outcome::failed(status);
        }

        let Some(file) = self.descriptors.get_mut(&fd) else {
            return Outcome::failed(errno(libc::EBADF));
        };

        let contents = &self.files[&file.path];
        let start = (file.position as usize).min(contents.len());
        let count = (contents.len() - start).min(buffer.len());
        buffer[..count].copy_from_slice(&contents[start..start + count]);
        file.position += count as i64;

        Outcome::ok(count as ffi::c_long, count)
    }

    fn close(&mut self, fd: RawFd) -> Outcome<()> {
        self.calls.close += 1;

        if self.descriptors.remove(&fd).is_none() {
            return Outcome::failed(errno(libc::EBADF));
        }
        self.closed.push(fd);

        match self.fail_close {
            Some(status) => Outcome::failed(status),
            None => Outcome::ok(0, ()),
        }
    }
}
