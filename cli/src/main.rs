// Copyright 2023 Viktor Reusch
//
// This file is part of gpx_add_symbol.
//
// gpx_add_symbol is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// gpx_add_symbol is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with gpx_add_symbol. If not, see <https://www.gnu.org/licenses/>.

//! Command-line interface for annotating a directory of GPX files.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use gpx_add_symbol::{run, CategoryTable};
use tracing::{debug, error, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

/// Annotates GPX files with individual symbols. Every file ends up in its own
/// subdirectory of the target.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory containing all GPX files. Each symbol must have the same file
    /// name as its GPX file, with the extension `.bmp`.
    #[arg(value_parser = readable_dir)]
    source: PathBuf,
    /// Directory receiving the generated files. It is deleted first if it
    /// exists.
    target: PathBuf,
    /// Be verbose.
    #[arg(short)]
    verbose: bool,
    /// TOML file mapping GPX file stems to category lists, replacing the
    /// built-in table.
    #[arg(long, value_name = "FILE")]
    categories: Option<PathBuf>,
}

/// Accept only existing directories that can be listed.
fn readable_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_dir() {
        return Err(format!("{value} is not a valid path"));
    }
    fs::read_dir(&path).map_err(|_| format!("{value} is not a readable dir"))?;
    Ok(path)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_table(path: Option<&Path>) -> Result<CategoryTable, gpx_add_symbol::Error> {
    match path {
        Some(path) => CategoryTable::load(path),
        None => Ok(CategoryTable::default()),
    }
}

/// Copies and annotates all GPX files from the source into the target
/// directory.
fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Usage problems, including `--help`, are not treated as failures.
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };
    init_logging(args.verbose);

    let result = load_table(args.categories.as_deref()).and_then(|table| {
        debug!("categories for: {}", table.stems().collect::<Vec<_>>().join(", "));
        run(&args.source, &args.target, &table)
    });
    match result {
        Ok(entries) => {
            debug!("annotated {} GPX files", entries.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Annotation failed with: {err}");
            ExitCode::FAILURE
        }
    }
}
