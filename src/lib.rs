pub mod cli;
mod error;
pub mod gateway;
pub mod session;
pub mod vocab;

#[cfg(test)]
mod fake;

pub use error::Degraded;
pub use error::Error;
pub use gateway::Outcome;
pub use gateway::RawGateway;
pub use gateway::SyscallGateway;
pub use gateway::SyscallTable;
pub use session::ReadResult;
pub use session::Request;
pub use vocab::Whence;

/// Number of bytes read after seeking.
pub const PROBE_LEN: usize = 8;

/// One 32-bit half of a seek offset, as given on the command line.
///
/// Negative values down to `i32::MIN` are stored as their two's complement,
/// so `-1` is all ones.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetHalf(pub u32);

impl std::str::FromStr for OffsetHalf {
    type Err = anyhow::Error;
    fn from_str(string: &str) -> anyhow::Result<Self> {
        let (negative, digits) = match string.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, string),
        };

        let magnitude = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            u32::from_str_radix(hex, 16)?
        } else {
            digits.parse::<u32>()?
        };

        if !negative {
            return Ok(OffsetHalf(magnitude));
        }

        anyhow::ensure!(
            magnitude <= 1 << 31,
            "{} does not fit in 32 bits",
            string
        );
        Ok(OffsetHalf((-i64::from(magnitude)) as u32))
    }
}

/// A 64-bit file offset, split into the two halves taken by `_llseek`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SeekOffset {
    pub high: u32,
    pub low: u32,
}

impl SeekOffset {
    pub fn new(high: OffsetHalf, low: OffsetHalf) -> Self {
        SeekOffset {
            high: high.0,
            low: low.0,
        }
    }

    pub fn from_i64(offset: i64) -> Self {
        let offset = offset as u64;
        SeekOffset {
            high: (offset >> 32) as u32,
            low: offset as u32,
        }
    }

    pub fn as_i64(self) -> i64 {
        ((u64::from(self.high) << 32) | u64::from(self.low)) as i64
    }
}
