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

use tracing::debug;

use crate::Error;

/// Extension of the files picked up from the source directory.
pub const GPX_EXTENSION: &str = "gpx";

/// List the GPX files directly inside `source`.
///
/// Subdirectories are not searched. The result is sorted by path.
pub fn find_gpx_files(source: &Path) -> Result<Vec<PathBuf>, Error> {
    if !source.exists() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }

    let mut files = vec![];
    for entry in fs::read_dir(source).map_err(Error::io(source))? {
        let path = entry.map_err(Error::io(source))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == GPX_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    debug!("found {} GPX files in {}", files.len(), source.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_only_gpx_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.gpx", "a.gpx", "a.bmp", "notes.txt", "upper.GPX"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.gpx")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.gpx"), "").unwrap();

        let files = find_gpx_files(dir.path()).unwrap();

        assert_eq!(files, [dir.path().join("a.gpx"), dir.path().join("b.gpx")]);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(find_gpx_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let result = find_gpx_files(&missing);

        assert!(matches!(result, Err(Error::SourceNotFound(path)) if path == missing));
    }
}
