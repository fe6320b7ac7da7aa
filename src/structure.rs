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

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::file_stem;
use crate::scan::GPX_EXTENSION;
use crate::Error;

/// Extension of the symbol bitmap next to each GPX file.
pub const SYMBOL_EXTENSION: &str = "bmp";

/// A GPX file copied into the target structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGpx {
    /// Path of the copy, `<target>/<stem>/<stem>.gpx`.
    pub gpx: PathBuf,
    /// Name written into the `<sym>` tags: the stem of the copied bitmap.
    pub symbol: String,
}

/// Create one subdirectory per GPX file in `target` and copy the GPX file and
/// its symbol into it.
///
/// An existing `target` is deleted first. Nothing is touched if `gpx_files`
/// is empty.
///
/// Each GPX file needs a `.bmp` file with the same stem next to it. If one is
/// missing, [`Error::SymbolNotFound`] is returned before the subdirectory for
/// that file is created. Subdirectories created for earlier files are kept.
pub fn generate_target_structure(
    target: &Path,
    gpx_files: &[PathBuf],
) -> Result<Vec<TargetGpx>, Error> {
    if gpx_files.is_empty() {
        debug!("no GPX files, leaving {} untouched", target.display());
        return Ok(vec![]);
    }

    if target.exists() {
        info!("target already exists, delete it: {}", target.display());
        fs::remove_dir_all(target).map_err(Error::io(target))?;
    }

    info!("create target: {}", target.display());
    fs::create_dir_all(target).map_err(Error::io(target))?;

    let mut entries = Vec::with_capacity(gpx_files.len());
    for gpx in gpx_files {
        entries.push(copy_gpx(target, gpx)?);
    }
    Ok(entries)
}

/// Copy a single `gpx` file and its symbol into a new directory in `target`.
fn copy_gpx(target: &Path, gpx: &Path) -> Result<TargetGpx, Error> {
    let stem = file_stem(gpx)?;
    let symbol = gpx.with_extension(SYMBOL_EXTENSION);
    if !symbol.is_file() {
        return Err(Error::SymbolNotFound(symbol));
    }
    let symbol_stem = file_stem(&symbol)?.to_string();

    let dir = target.join(stem);
    fs::create_dir(&dir).map_err(Error::io(&dir))?;

    let copied_gpx = dir.join(format!("{stem}.{GPX_EXTENSION}"));
    copy(gpx, &copied_gpx)?;
    copy(&symbol, &dir.join(format!("{symbol_stem}.{SYMBOL_EXTENSION}")))?;

    Ok(TargetGpx {
        gpx: copied_gpx,
        symbol: symbol_stem,
    })
}

fn copy(from: &Path, to: &Path) -> Result<(), Error> {
    debug!("copy {} to {}", from.display(), to.display());
    fs::copy(from, to).map_err(Error::io(from))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    /// Create `names` as files with their own name as content.
    fn source_with(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), name).unwrap();
        }
        dir
    }

    #[test]
    fn copies_gpx_and_symbol() {
        let source = source_with(&[
            "zisterne.gpx",
            "zisterne.bmp",
            "saugstelle.gpx",
            "saugstelle.bmp",
        ]);
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("deep").join("target");
        let gpx_files = [source.path().join("zisterne.gpx"), source.path().join("saugstelle.gpx")];

        let entries = generate_target_structure(&target, &gpx_files).unwrap();

        assert_eq!(
            entries,
            [
                TargetGpx {
                    gpx: target.join("zisterne").join("zisterne.gpx"),
                    symbol: "zisterne".to_string(),
                },
                TargetGpx {
                    gpx: target.join("saugstelle").join("saugstelle.gpx"),
                    symbol: "saugstelle".to_string(),
                },
            ]
        );
        let bmp = fs::read_to_string(target.join("zisterne").join("zisterne.bmp")).unwrap();
        assert_eq!(bmp, "zisterne.bmp");
        let gpx = fs::read_to_string(&entries[1].gpx).unwrap();
        assert_eq!(gpx, "saugstelle.gpx");
    }

    #[test]
    fn empty_input_leaves_target_alone() {
        let out = tempfile::tempdir().unwrap();
        let stale = out.path().join("stale.txt");
        fs::write(&stale, "").unwrap();

        let entries = generate_target_structure(out.path(), &[]).unwrap();

        assert!(entries.is_empty());
        assert!(stale.exists());
    }

    #[test]
    fn replaces_existing_target() {
        let source = source_with(&["loeschteich.gpx", "loeschteich.bmp"]);
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("target");
        fs::create_dir_all(target.join("old")).unwrap();
        fs::write(target.join("old.txt"), "").unwrap();

        generate_target_structure(&target, &[source.path().join("loeschteich.gpx")]).unwrap();

        let mut names: Vec<_> = fs::read_dir(&target)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["loeschteich"]);
    }

    #[test]
    fn missing_symbol_aborts() {
        let source = source_with(&["a.gpx", "a.bmp", "b.gpx"]);
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("target");
        let gpx_files = [source.path().join("a.gpx"), source.path().join("b.gpx")];

        let result = generate_target_structure(&target, &gpx_files);

        let missing = source.path().join("b.bmp");
        assert!(matches!(result, Err(Error::SymbolNotFound(path)) if path == missing));
        assert!(target.join("a").join("a.bmp").exists());
        assert!(!target.join("b").exists());
    }
}
