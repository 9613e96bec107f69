// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! lptrans - convert and inspect translation files
//!
//! Command line front end for the LabelPlus text and Meo JSON formats.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lptrans::io::serialization::{export_with, import_with};
use lptrans::{Format, ProjectFile, Session, Settings};
use std::path::{Path, PathBuf};

/// Convert and inspect image translation files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (YAML); defaults to $LPTRANS_CONFIG
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a translation file to another format
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Input format (default: from extension)
        #[arg(long, value_enum)]
        from: Option<Format>,
        /// Output format (default: from extension)
        #[arg(long, value_enum)]
        to: Option<Format>,
    },
    /// Print a summary of a translation file
    Info {
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Create an empty translation file
    New {
        output: PathBuf,
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Group to create (repeatable)
        #[arg(long = "group", value_name = "NAME")]
        groups: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::discover(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Command::Convert {
            input,
            output,
            from,
            to,
        } => convert(&settings, &input, &output, from, to),
        Command::Info { file, format } => info(&settings, &file, format),
        Command::New {
            output,
            format,
            groups,
        } => new_file(settings, &output, format, &groups),
    }
}

fn convert(
    settings: &Settings,
    input: &Path,
    output: &Path,
    from: Option<Format>,
    to: Option<Format>,
) -> Result<()> {
    let from = from.unwrap_or_else(|| settings.format_for(input));
    let to = to.unwrap_or_else(|| settings.format_for(output));
    let options = settings.codec_options();

    let project = import_with(input, from, &options)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    export_with(&project, output, to, &options)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{} ({}) -> {} ({})", input.display(), from, output.display(), to);
    Ok(())
}

fn info(settings: &Settings, file: &Path, format: Option<Format>) -> Result<()> {
    let format = format.unwrap_or_else(|| settings.format_for(file));
    let project = import_with(file, format, &settings.codec_options())
        .with_context(|| format!("Failed to read {}", file.display()))?;
    print_summary(file, format, &project);
    Ok(())
}

fn print_summary(file: &Path, format: Format, project: &ProjectFile) {
    let version = project.version();
    println!("{} ({} format, version {}.{})", file.display(), format, version.major, version.minor);
    println!();
    println!("Comment:");
    for line in project.comment().lines() {
        println!("  {}", line);
    }
    println!();
    println!("Groups ({}):", project.group_count());
    for (id, group) in project.groups().iter().enumerate() {
        println!("  {} {} #{}", id + 1, group.name(), group.color());
    }
    println!();
    println!("Pictures ({}):", project.picture_count());
    for picture in project.sorted_picture_names() {
        let count = project.labels(&picture).map(<[_]>::len).unwrap_or(0);
        println!("  {} ({} labels)", picture, count);
    }
}

fn new_file(settings: Settings, output: &Path, format: Option<Format>, groups: &[String]) -> Result<()> {
    let format = format.unwrap_or_else(|| settings.format_for(output));
    let mut session = Session::new(settings);
    for name in groups {
        session
            .add_group(name)
            .with_context(|| format!("Invalid group {:?}", name))?;
    }

    let options = session.settings().codec_options();
    export_with(session.project(), output, format, &options)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Created {} ({} groups)", output.display(), session.project().group_count());
    Ok(())
}
