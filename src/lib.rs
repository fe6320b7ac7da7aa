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

//! Annotate [GPX](https://www.topografix.com/gpx.asp) waypoints with a custom
//! display symbol and Garmin category extensions.
//!
//! A batch run has three steps, each available on its own:
//! 1. [`find_gpx_files`] lists the GPX files of a source directory.
//! 2. [`generate_target_structure`] copies every GPX file together with its
//!    `.bmp` symbol into its own subdirectory of the target.
//! 3. [`annotate_files`] rewrites the copied GPX files.
//!
//! [`run`] performs all of them. For annotating a single document without
//! touching the file system, see [`annotate`].

use std::io::{Read, Write};
use std::path::Path;

mod annotate;
mod categories;
pub mod dom;
mod error;
pub mod namespaces;
mod scan;
mod structure;

pub use annotate::{annotate_document, annotate_file, annotate_files};
pub use categories::CategoryTable;
pub use error::Error;
pub use scan::{find_gpx_files, GPX_EXTENSION};
pub use structure::{generate_target_structure, TargetGpx, SYMBOL_EXTENSION};

use dom::Document;

/// Copy and annotate all GPX files in `source` into `target`.
///
/// `target` is deleted and recreated unless `source` contains no GPX files.
/// The run stops at the first error, leaving everything written so far in
/// place.
///
/// Returns the copied and annotated GPX files.
pub fn run(source: &Path, target: &Path, table: &CategoryTable) -> Result<Vec<TargetGpx>, Error> {
    let gpx_files = find_gpx_files(source)?;
    let entries = generate_target_structure(target, &gpx_files)?;
    annotate_files(&entries, table)?;
    Ok(entries)
}

/// Read a GPX document and write it annotated.
///
/// A complete GPX document is read from `source`. All waypoints get `symbol`
/// and the categories of `stem` from `table`. The result is written to
/// `sink`.
///
/// If an error occurs, the function returns immediately. The `sink` might
/// have been written to in this case. XML errors report `stem` as their path.
///
/// # Example
/// ```
/// # use gpx_add_symbol::{annotate, CategoryTable};
/// #
/// let source = r#"
/// <?xml version="1.0" encoding="UTF-8"?>
/// <gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="test">
///     <wpt lat="49.4521" lon="11.0767"><name>Zisterne Hauptmarkt</name></wpt>
/// </gpx>
/// "#.trim_start();
/// let mut sink = vec![];
///
/// annotate(source.as_bytes(), &mut sink, "zisterne", "zisterne", &CategoryTable::default())
///     .expect("annotation failed");
///
/// let gpx = String::from_utf8(sink).expect("GPX data is not valid UTF-8");
/// assert!(gpx.contains("<sym>zisterne</sym>"));
/// assert!(gpx.contains("<gpxx:DisplayMode>SymbolOnly</gpxx:DisplayMode>"));
/// assert!(gpx.contains("<wptx1:Category>Zisterne</wptx1:Category>"));
/// ```
pub fn annotate(
    source: impl Read,
    sink: impl Write,
    symbol: &str,
    stem: &str,
    table: &CategoryTable,
) -> Result<usize, Error> {
    let xml_error = |source| Error::Xml {
        path: stem.into(),
        source,
    };

    let mut document = Document::parse(source).map_err(xml_error)?;
    let count = annotate_document(&mut document, symbol, stem, table)?;
    document.write(sink).map_err(xml_error)?;
    Ok(count)
}
