use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indoc::indoc;
use log::{debug, info};

use sizeprefix::{FrameIter, ReaderSettings, write_size_prefixed};

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn command() -> Command {
    Command::new("pack")
        .about("Concatenate files into a stream of size-prefixed buffers")
        .long_about(indoc!(
            r#"
            Concatenate files into a stream of size-prefixed buffers.

            Every input file becomes one frame: a 4-byte little-endian length followed by
            the file's bytes. Frames are written in the order the inputs are given.
        "#
        ))
        .arg(
            Arg::new("inputs")
                .required(true)
                .num_args(1..)
                .value_name("FILE")
                .help("Files to pack, one frame per file."),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('f')
                .required(true)
                .value_name("PATH")
                .help("Where to write the packed stream."),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files."),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .action(ArgAction::SetTrue)
                .help("Read the packed stream back and check every frame against its input."),
        )
        .arg(super::verbose_arg())
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    super::try_to_initialize_logging(super::verbosity_level(matches));

    let inputs: Vec<PathBuf> = matches
        .get_many::<String>("inputs")
        .context("at least one input is required")?
        .map(PathBuf::from)
        .collect();
    let output = PathBuf::from(
        matches
            .get_one::<String>("output")
            .context("an output path is required")?,
    );

    let file = super::create_output_file(&output, !matches.get_flag("no-confirm-overwrite"))
        .with_context(|| {
            format!(
                "An error occurred while creating output file at `{}`",
                output.display()
            )
        })?;
    let mut writer = BufWriter::new(file);

    let mut total = 0;
    for input in &inputs {
        let payload = fs::read(input)
            .with_context(|| format!("Failed to read input file {}", input.display()))?;
        total += write_size_prefixed(&mut writer, &payload)
            .with_context(|| format!("Failed to pack {}", input.display()))?;
        debug!("Packed {} ({} bytes)", input.display(), payload.len());
    }
    writer.flush().context("Failed to flush output")?;

    info!(
        "Wrote {} frames ({} bytes) to {}",
        inputs.len(),
        total,
        output.display()
    );

    if matches.get_flag("verify") {
        verify(&output, &inputs)?;
    }

    Ok(())
}

fn verify(output: &Path, inputs: &[PathBuf]) -> Result<()> {
    let packed = fs::read(output)
        .with_context(|| format!("Failed to read back {}", output.display()))?;

    let settings = ReaderSettings::new().max_frame_size(None);
    let mut count = 0;

    for (frame, input) in FrameIter::new(&packed, settings).zip(inputs) {
        let frame =
            frame.with_context(|| format!("Packed frame for {} is broken", input.display()))?;
        let expected = fs::read(input)?;
        if frame.payload != expected.as_slice() {
            bail!(
                "Frame {} does not match the contents of {}",
                frame.index,
                input.display()
            );
        }
        count += 1;
    }

    if count != inputs.len() {
        bail!("Expected {} frames, found {}", inputs.len(), count);
    }

    info!("Verified {} frames", count);
    Ok(())
}
