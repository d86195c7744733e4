//! Reads the thermocouple once and prints it in Celsius.

use std::{io, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use linux_max31855::{report, Max31855, SpiConfig, DEFAULT_DEVICE, DEFAULT_SPEED_HZ};
use tracing::{debug, level_filters::LevelFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// spidev node the MAX31855 is wired to
    #[arg(default_value = DEFAULT_DEVICE)]
    device: PathBuf,

    /// SPI clock rate in Hz
    #[arg(long, default_value_t = DEFAULT_SPEED_HZ)]
    speed_hz: u32,

    /// SPI mode (0-3)
    #[arg(long, default_value_t = 0)]
    mode: u8,

    /// Also print the cold-junction temperature on a second line
    #[arg(long)]
    internal: bool,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = SpiConfig::new(&args.device)
        .speed_hz(args.speed_hz)
        .mode(args.mode);
    debug!(?config, "reading MAX31855");

    let reading = Max31855::new(config)
        .read_reading()
        .context("Couldn't read the MAX31855")?;

    report(&reading, args.internal, &mut io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn device_defaults_to_spidev0() {
        let args = Args::parse_from(["max31855"]);

        assert_eq!(args.device, PathBuf::from("/dev/spidev0.0"));
        assert_eq!(args.speed_hz, 500_000);
        assert_eq!(args.mode, 0);
        assert!(!args.internal);
    }

    #[test]
    fn positional_device_and_flags() {
        let args = Args::parse_from(["max31855", "/dev/spidev1.0", "--speed-hz", "1000000", "-vv"]);

        assert_eq!(args.device, PathBuf::from("/dev/spidev1.0"));
        assert_eq!(args.speed_hz, 1_000_000);
        assert_eq!(args.verbose, 2);
    }
}
