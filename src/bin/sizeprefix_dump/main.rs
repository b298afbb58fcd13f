#![allow(clippy::upper_case_acronyms)]

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use sizeprefix::err::DeserializationError;
use sizeprefix::{Frame, FrameReader, ReaderSettings, dump_hex};

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

mod pack;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    JSON,
    JSONL,
}

struct SizePrefixDump {
    reader_settings: ReaderSettings,
    input: PathBuf,
    output_format: OutputFormat,
    output: Box<dyn Write>,
    hexdump: bool,
    verbosity_level: Option<LevelFilter>,
}

impl SizePrefixDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = PathBuf::from(
            matches
                .get_one::<String>("INPUT")
                .context("an input file is required")?,
        );

        let output_format = match matches
            .get_one::<String>("output-format")
            .map(String::as_str)
            .unwrap_or("text")
        {
            "json" => OutputFormat::JSON,
            "jsonl" => OutputFormat::JSONL,
            _ => OutputFormat::Text,
        };

        let max_frame_size = match matches.get_one::<usize>("max-frame-size").copied() {
            // 0 means unlimited
            Some(0) => None,
            Some(limit) => Some(limit),
            None => Some(sizeprefix::DEFAULT_MAX_FRAME_SIZE),
        };

        let reader_settings = ReaderSettings::new()
            .start_offset(matches.get_one::<usize>("offset").copied().unwrap_or(0))
            .max_frame_size(max_frame_size)
            .max_frames(matches.get_one::<usize>("max-frames").copied());

        let verbosity_level = verbosity_level(matches);

        let output: Box<dyn Write> = match matches.get_one::<String>("output-target") {
            Some(path) => {
                let file = create_output_file(path, !matches.get_flag("no-confirm-overwrite"))
                    .with_context(|| {
                        format!("An error occurred while creating output file at `{}`", path)
                    })?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };

        Ok(SizePrefixDump {
            reader_settings,
            input,
            output_format,
            output,
            hexdump: matches.get_flag("hexdump"),
            verbosity_level,
        })
    }

    /// Main entry point for `SizePrefixDump`
    pub fn run(&mut self) -> Result<()> {
        try_to_initialize_logging(self.verbosity_level);

        let file = File::open(&self.input)
            .with_context(|| format!("Failed to open file {}", self.input.display()))?;

        let reader = FrameReader::new(BufReader::new(file), self.reader_settings.clone());
        let mut frame_count = 0;
        let mut failure: Option<DeserializationError> = None;

        for frame in reader {
            match frame {
                Ok(frame) => {
                    self.dump_frame(&frame)?;
                    frame_count += 1;
                }
                Err(e) => failure = Some(e),
            }
        }

        self.output.flush().context("Failed to flush output")?;
        info!("Dumped {} frames from {}", frame_count, self.input.display());

        match failure {
            Some(e) => Err(anyhow::Error::new(e).context(format!(
                "Failed to read frame {} of {}",
                frame_count,
                self.input.display()
            ))),
            None => Ok(()),
        }
    }

    fn dump_frame(&mut self, frame: &Frame) -> Result<()> {
        let summary = frame.summary();

        match self.output_format {
            OutputFormat::Text => {
                writeln!(
                    self.output,
                    "Frame {} @ offset {}: {} bytes",
                    summary.index, summary.offset, summary.size
                )?;
                if self.hexdump {
                    write!(
                        self.output,
                        "{}",
                        dump_hex(&frame.payload, summary.payload_offset)
                    )?;
                }
            }
            OutputFormat::JSON => {
                writeln!(self.output, "{}", serde_json::to_string_pretty(&summary)?)?;
            }
            OutputFormat::JSONL => {
                writeln!(self.output, "{}", serde_json::to_string(&summary)?)?;
            }
        }

        Ok(())
    }
}

pub(crate) fn verbosity_level(matches: &ArgMatches) -> Option<LevelFilter> {
    match matches.get_count("verbose") {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        3 => Some(LevelFilter::Trace),
        _ => {
            eprintln!("using more than -vvv does not affect verbosity level");
            Some(LevelFilter::Trace)
        }
    }
}

pub(crate) fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("-v - info, -vv - debug, -vvv - trace.")
}

pub(crate) fn try_to_initialize_logging(level: Option<LevelFilter>) {
    if let Some(level) = level {
        if let Err(e) = TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ) {
            eprintln!("Failed to initialize logging: {}", e)
        }
    }
}

/// If `prompt` is passed, will display a confirmation prompt before overwriting files.
pub(crate) fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
    let p = path.as_ref();

    if p.is_dir() {
        bail!(
            "There is a directory at {}, refusing to overwrite",
            p.display()
        );
    }

    if p.exists() {
        if prompt {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    p.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;

            if !confirmed {
                bail!("Cancelled");
            }
        }
        return Ok(File::create(p)?);
    }

    // Ok to assume p is not an existing directory
    match p.parent() {
        Some(parent) => {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
            Ok(File::create(p)?)
        }
        None => bail!("Output file cannot be root."),
    }
}

/// Accepts decimal or `0x`-prefixed hexadecimal offsets.
fn parse_offset(value: &str) -> Result<usize, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse::<usize>(),
    };

    parsed.map_err(|_| format!("`{}` is not a valid non-negative offset", value))
}

fn command() -> Command {
    Command::new("sizeprefix_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to inspect streams of size-prefixed buffers")
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .arg(Arg::new("INPUT").required(true))
        .arg(
            Arg::new("offset")
                .long("offset")
                .value_parser(parse_offset)
                .value_name("N")
                .help("Position of the first size prefix, decimal or 0x-prefixed hex."),
        )
        .arg(
            Arg::new("max-frame-size")
                .long("max-frame-size")
                .value_parser(clap::value_parser!(usize))
                .value_name("BYTES")
                .help("Frames larger than this are reported as errors. 0 disables the limit."),
        )
        .arg(
            Arg::new("max-frames")
                .short('n')
                .long("max-frames")
                .value_parser(clap::value_parser!(usize))
                .value_name("COUNT")
                .help("Stop after dumping this many frames."),
        )
        .arg(
            Arg::new("output-format")
                .short('o')
                .long("format")
                .value_parser(["text", "json", "jsonl"])
                .default_value("text")
                .help("Sets the output format")
                .long_help(indoc!(
                    r#"
                    Sets the output format:
                        "text"  - one line per frame.
                        "json"  - one pretty-printed object per frame.
                        "jsonl" - one compact object per line.
                    "#
                )),
        )
        .arg(
            Arg::new("hexdump")
                .long("hexdump")
                .action(ArgAction::SetTrue)
                .help("In text mode, print a hex dump of every payload."),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .help(indoc!(
                    "Writes output to the file specified instead of stdout, errors will still be printed to stderr.
                     Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`
                     Will create parent directories if needed."
                )),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(verbose_arg())
        .subcommand(pack::command())
}

fn main() -> Result<()> {
    let matches = command().get_matches();

    match matches.subcommand() {
        Some(("pack", sub_matches)) => pack::run(sub_matches),
        _ => SizePrefixDump::from_cli_matches(&matches)?.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_decimal_and_hex_offsets() {
        assert_eq!(parse_offset("16"), Ok(16));
        assert_eq!(parse_offset("0x10"), Ok(16));
        assert_eq!(parse_offset("0XfF"), Ok(255));
        assert!(parse_offset("-1").is_err());
        assert!(parse_offset("0xzz").is_err());
    }

    #[test]
    fn test_command_definition_is_valid() {
        command().debug_assert();
    }
}
