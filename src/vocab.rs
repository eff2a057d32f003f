//! Symbolic flag names → numeric values.
//!
//! A token counts as present when it occurs anywhere in the input string,
//! not only as a whole comma-separated item. Tokens that contain other
//! tokens therefore set several bits: `O_DIRECTORY` also selects
//! `O_DIRECT`.

use std::ffi;

use crate::Error;

/// An ordered table of `(token, value)` pairs for one flag domain.
pub struct Vocabulary<T: 'static> {
    name: &'static str,
    entries: &'static [(&'static str, T)],
}

impl<T: Copy> Vocabulary<T> {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, T)]) -> Self {
        Vocabulary { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(token, _)| *token)
    }

    /// Entries whose token occurs in `input`, in declaration order.
    pub fn matches<'a>(&'a self, input: &'a str) -> impl Iterator<Item = T> + 'a {
        self.entries
            .iter()
            .filter(move |(token, _)| input.contains(token))
            .map(|(_, value)| *value)
    }
}

impl Vocabulary<u32> {
    /// OR of every matching entry. Absent input resolves to no flags.
    pub fn resolve_mask(&self, input: Option<&str>) -> u32 {
        input.map_or(0, |input| self.matches(input).fold(0, |mask, bit| mask | bit))
    }
}

impl<T: Copy> Vocabulary<T> {
    /// Exclusive selection: the last matching entry wins.
    pub fn resolve_selector(&self, input: Option<&str>) -> Result<T, Error> {
        input
            .and_then(|input| self.matches(input).last())
            .ok_or_else(|| Error::MissingSelector {
                vocabulary: self.name,
                input: input.map(str::to_owned),
            })
    }
}

/// Origin of a seek.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

impl Whence {
    pub fn raw(self) -> ffi::c_int {
        match self {
            Whence::Set => libc::SEEK_SET,
            Whence::Cur => libc::SEEK_CUR,
            Whence::End => libc::SEEK_END,
        }
    }
}

pub static OPEN_FLAGS: Vocabulary<u32> = Vocabulary::new(
    "open flags",
    &[
        ("O_ACCMODE", libc::O_ACCMODE as u32),
        ("O_RDONLY", libc::O_RDONLY as u32),
        ("O_WRONLY", libc::O_WRONLY as u32),
        ("O_RDWR", libc::O_RDWR as u32),
        ("O_CLOEXEC", libc::O_CLOEXEC as u32),
        ("O_DIRECTORY", libc::O_DIRECTORY as u32),
        ("O_NOFOLLOW", libc::O_NOFOLLOW as u32),
        ("O_CREAT", libc::O_CREAT as u32),
        ("O_EXCL", libc::O_EXCL as u32),
        ("O_NOCTTY", libc::O_NOCTTY as u32),
        ("O_TMPFILE", libc::O_TMPFILE as u32),
        ("O_TRUNC", libc::O_TRUNC as u32),
        ("O_APPEND", libc::O_APPEND as u32),
        ("O_ASYNC", libc::O_ASYNC as u32),
        ("O_DIRECT", libc::O_DIRECT as u32),
        ("O_DSYNC", libc::O_DSYNC as u32),
        ("O_LARGEFILE", libc::O_LARGEFILE as u32),
        ("O_NOATIME", libc::O_NOATIME as u32),
        // misspelling of O_NOATIME, accepted for compatibility
        ("O_NATIME", libc::O_NOATIME as u32),
        ("O_NONBLOCK", libc::O_NONBLOCK as u32),
        ("O_SYNC", libc::O_SYNC as u32),
        ("O_PATH", libc::O_PATH as u32),
    ],
);

pub static MODE_BITS: Vocabulary<u32> = Vocabulary::new(
    "mode bits",
    &[
        ("S_IRUSR", libc::S_IRUSR as u32),
        ("S_IWUSR", libc::S_IWUSR as u32),
        ("S_IXUSR", libc::S_IXUSR as u32),
        ("S_IRWXU", libc::S_IRWXU as u32),
        ("S_IRGRP", libc::S_IRGRP as u32),
        ("S_IWGRP", libc::S_IWGRP as u32),
        ("S_IXGRP", libc::S_IXGRP as u32),
        ("S_IRWXG", libc::S_IRWXG as u32),
        ("S_IROTH", libc::S_IROTH as u32),
        ("S_IWOTH", libc::S_IWOTH as u32),
        ("S_IXOTH", libc::S_IXOTH as u32),
        ("S_IRWXO", libc::S_IRWXO as u32),
    ],
);

pub static WHENCE: Vocabulary<Whence> = Vocabulary::new(
    "whence",
    &[
        ("SEEK_SET", Whence::Set),
        ("SEEK_CUR", Whence::Cur),
        ("SEEK_END", Whence::End),
    ],
);
