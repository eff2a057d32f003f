//! One open → seek → read → close session.

use std::os::fd::RawFd;
use std::path::PathBuf;

use crate::gateway::Outcome;
use crate::gateway::SyscallGateway;
use crate::vocab::Whence;
use crate::Degraded;
use crate::Error;
use crate::SeekOffset;

/// Resolved arguments of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub path: PathBuf,
    pub flags: u32,
    /// `None` opens without a mode argument, `Some(0)` passes an explicit zero.
    pub mode: Option<u32>,
    pub whence: Whence,
    pub offset: SeekOffset,
    pub probe_len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadResult {
    /// The probe buffer, zero past whatever read filled in.
    pub bytes: Vec<u8>,
    pub count: Option<usize>,
    /// Position reported by the seek, only when it succeeded.
    pub position: Option<i64>,
    pub degraded: Vec<Degraded>,
}

impl ReadResult {
    /// Probe bytes up to the first NUL, non-printable bytes shown as `.`.
    pub fn printable(&self) -> String {
        self.bytes
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| match byte {
                byte if byte.is_ascii_graphic() || *byte == b' ' => *byte as char,
                _ => '.',
            })
            .collect()
    }
}

/// An open descriptor; closed exactly once, by `close` or on drop.
struct Session<'g, G: SyscallGateway> {
    gateway: &'g mut G,
    fd: RawFd,
    open: bool,
}

impl<'g, G: SyscallGateway> Session<'g, G> {
    fn open(gateway: &'g mut G, request: &Request) -> Result<Self, Error> {
        let outcome = gateway.open(&request.path, request.flags, request.mode);
        let fd = match outcome.value {
            Some(fd) if outcome.is_ok() => fd,
            _ => {
                return Err(Error::CannotOpen {
                    path: request.path.clone(),
                    code: outcome.status,
                })
            }
        };

        log::info!("opened {} as fd {}", request.path.display(), fd);

        Ok(Session {
            gateway,
            fd,
            open: true,
        })
    }

    fn llseek(&mut self, offset: SeekOffset, whence: Whence) -> Outcome<i64> {
        self.gateway.llseek(self.fd, offset, whence)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Outcome<usize> {
        self.gateway.read(self.fd, buffer)
    }

    fn close(mut self) -> Outcome<()> {
        self.open = false;
        self.gateway.close(self.fd)
    }
}

impl<G: SyscallGateway> Drop for Session<'_, G> {
    fn drop(&mut self) {
        if self.open {
            let outcome = self.gateway.close(self.fd);
            if !outcome.is_ok() {
                log::warn!("close({}) failed with status {}", self.fd, outcome.status);
            }
        }
    }
}

/// Run one probe session. Only a failed open is an error: later steps that
/// fail are listed in [`ReadResult::degraded`].
pub fn run<G: SyscallGateway>(gateway: &mut G, request: &Request) -> Result<ReadResult, Error> {
    let mut session = Session::open(gateway, request)?;
    let mut degraded = Vec::new();

    let seek = session.llseek(request.offset, request.whence);
    if !seek.is_ok() {
        degraded.push(Degraded::Seek(seek.status));
    }

    let mut bytes = vec![0u8; request.probe_len];
    let read = session.read(&mut bytes);
    if !read.is_ok() {
        degraded.push(Degraded::Read(read.status));
    }

    let close = session.close();
    if !close.is_ok() {
        degraded.push(Degraded::Close(close.status));
    }

    for step in &degraded {
        log::warn!("{}: {}", request.path.display(), step);
    }

    Ok(ReadResult {
        bytes,
        count: read.value,
        position: seek.value,
        degraded,
    })
}
