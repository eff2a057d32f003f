use std::fmt::Write as _;
use std::path::PathBuf;

use clap::CommandFactory as _;
use clap::Parser;

use crate::gateway::SyscallGateway;
use crate::session;
use crate::session::ReadResult;
use crate::session::Request;
use crate::vocab;
use crate::vocab::Vocabulary;
use crate::Error;
use crate::OffsetHalf;
use crate::SeekOffset;
use crate::PROBE_LEN;

/// Open a file, seek with _llseek and read a few bytes, all by raw syscall
#[derive(Parser, Debug)]
#[command(name = "llseek", disable_help_flag = true)]
pub struct Command {
    /// Print usage and exit
    #[arg(short, long)]
    pub help: bool,

    /// The full path for opening
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// The flags for opening, e.g. O_RDWR,O_CREAT
    #[arg(short, long)]
    pub flags: Option<String>,

    /// The mode for opening, e.g. S_IRUSR,S_IWUSR
    #[arg(short, long)]
    pub mode: Option<String>,

    /// The offset high for seeking; decimal or 0x hex, negative values wrap to 32 bits
    #[arg(short = 'H', long = "offset_high", default_value = "0", allow_hyphen_values = true)]
    pub offset_high: OffsetHalf,

    /// The offset low for seeking; decimal or 0x hex, negative values wrap to 32 bits
    #[arg(short = 'L', long = "offset_low", default_value = "0", allow_hyphen_values = true)]
    pub offset_low: OffsetHalf,

    /// Where to begin: SEEK_SET, SEEK_CUR or SEEK_END
    #[arg(short, long)]
    pub whence: Option<String>,
}

pub enum Report {
    Usage(String),
    Data(ReadResult),
}

impl Command {
    /// Resolve the symbolic arguments without touching the file system.
    pub fn request(&self) -> Result<Request, Error> {
        let path = self
            .path
            .clone()
            .ok_or(Error::MissingRequiredArgument("path"))?;
        let flags = self
            .flags
            .as_deref()
            .ok_or(Error::MissingRequiredArgument("flags"))?;
        let mode = self
            .mode
            .as_deref()
            .ok_or(Error::MissingRequiredArgument("mode"))?;

        Ok(Request {
            path,
            flags: vocab::OPEN_FLAGS.resolve_mask(Some(flags)),
            mode: Some(vocab::MODE_BITS.resolve_mask(Some(mode))),
            whence: vocab::WHENCE.resolve_selector(self.whence.as_deref())?,
            offset: SeekOffset::new(self.offset_high, self.offset_low),
            probe_len: PROBE_LEN,
        })
    }
}

/// Run the command against `gateway`. Help and missing required arguments
/// produce the usage text without any syscall.
pub fn execute<G: SyscallGateway>(command: &Command, gateway: &mut G) -> Result<Report, Error> {
    if command.help {
        return Ok(Report::Usage(usage()));
    }

    let request = match command.request() {
        Ok(request) => request,
        Err(Error::MissingRequiredArgument(name)) => {
            log::debug!("missing --{}, showing usage", name);
            return Ok(Report::Usage(usage()));
        }
        Err(error) => return Err(error),
    };

    log::debug!("{:?}", request);

    session::run(gateway, &request).map(Report::Data)
}

pub fn usage() -> String {
    let mut usage = Command::command().render_help().to_string();

    for vocabulary in [&vocab::OPEN_FLAGS, &vocab::MODE_BITS] {
        list_tokens(&mut usage, vocabulary);
    }
    list_tokens(&mut usage, &vocab::WHENCE);

    let _ = writeln!(
        usage,
        "\ne.g:\nllseek -p BiscuitOS_file -f O_RDWR,O_CREAT -m S_IRUSR,S_IRGRP -H 0x0 -L 0x1 -w SEEK_SET"
    );

    usage
}

fn list_tokens<T: Copy>(usage: &mut String, vocabulary: &Vocabulary<T>) {
    let _ = writeln!(usage, "\n{}:", vocabulary.name());
    for token in vocabulary.tokens() {
        let _ = writeln!(usage, "  {}", token);
    }
}
