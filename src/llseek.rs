use anyhow::anyhow;
use anyhow::Context as _;
use clap::Parser;
use sysprobe::cli::Command;
use sysprobe::cli::Report;
use sysprobe::RawGateway;
use sysprobe::SyscallTable;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let command = Command::parse();
    let mut gateway = RawGateway::new(SyscallTable::native());

    let report = sysprobe::cli::execute(&command, &mut gateway).with_context(|| {
        match &command.path {
            Some(path) => anyhow!("Failed to read {}", path.display()),
            None => anyhow!("Failed to read"),
        }
    })?;

    match report {
        Report::Usage(usage) => print!("{}", usage),
        Report::Data(result) => {
            println!("Data: {}", result.printable());
            // seek, read and close failures do not change the exit status
            for step in &result.degraded {
                eprintln!("Warning: {}", step);
            }
        }
    }

    Ok(())
}
