//! Interactive prompts used when no URL is given on the command line

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use ytmp3_core::policy::{resolve_output_dir, Quality};

#[derive(Debug, PartialEq, Eq)]
pub struct Answers {
    pub url: String,
    pub output_dir: PathBuf,
    pub quality: Quality,
}

pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Answers> {
    let url = read_line(input, output, "Enter the video URL: ")?;
    let dir = read_line(
        input,
        output,
        "Enter the output directory (or press Enter for current directory): ",
    )?;
    let quality = read_line(input, output, "Prefer 320 kbps quality? (y/n, default is n): ")?;

    Ok(Answers {
        url: url.trim().to_string(),
        output_dir: resolve_output_dir(&dir),
        quality: Quality::from_answer(&quality),
    })
}

fn read_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read answer")?;
    Ok(line)
}
