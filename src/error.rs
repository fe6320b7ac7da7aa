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

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dom;

/// Error returned from the scanning, copying, and annotating steps.
///
/// Every error is fatal for the whole batch. Files processed before the error
/// stay as they are.
#[derive(Error, Debug)]
pub enum Error {
    /// The source directory vanished before it could be scanned.
    #[error("source directory {} not found", .0.display())]
    SourceNotFound(PathBuf),
    /// The bitmap symbol next to a GPX file is missing.
    #[error("symbol file {} not found", .0.display())]
    SymbolNotFound(PathBuf),
    /// The category table has no entry for this GPX file stem.
    #[error("no categories configured for {0:?}")]
    UnknownCategory(String),
    /// The path has no file stem or it is not valid UTF-8.
    #[error("unusable file name {}", .0.display())]
    InvalidFileName(PathBuf),
    /// Reading or writing GPX failed.
    #[error("processing GPX {} failed: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: dom::Error,
    },
    /// Parsing a category table failed.
    #[error("reading categories from {} failed: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Any other file system operation failed.
    #[error("I/O on {} failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Wrap an [`io::Error`] occurring at `path`, for use with `map_err`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Return the UTF-8 file stem of `path`.
pub(crate) fn file_stem(path: &Path) -> Result<&str, Error> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.to_path_buf()))
}
