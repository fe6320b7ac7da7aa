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

//! Mapping from GPX file stems to category labels.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::Error;

/// Categories used when no table is given.
const BUILTIN: &[(&str, &[&str])] = &[
    ("geraetehaeuser", &["Feuerwehr", "Gerätehaus"]),
    (
        "hydrant_oberflur",
        &["Feuerwehr", "Wasserentnahme", "Hydrant", "Oberflurhydrant"],
    ),
    (
        "hydrant_unterflur",
        &["Feuerwehr", "Wasserentnahme", "Hydrant", "Unterflurhydrant"],
    ),
    ("loeschteich", &["Feuerwehr", "Wasserentnahme", "Löschteich"]),
    ("zisterne", &["Feuerwehr", "Wasserentnahme", "Zisterne"]),
    ("saugstelle", &["Feuerwehr", "Wasserentnahme", "Saugstelle"]),
];

/// Immutable table of ordered category labels per GPX file stem.
///
/// All waypoints of one file get the same categories.
///
/// A table can be read from TOML with one key per stem:
/// ```
/// # use gpx_add_symbol::CategoryTable;
/// #
/// let table = CategoryTable::from_toml_str(r#"
/// zisterne = ["Feuerwehr", "Wasserentnahme", "Zisterne"]
/// "#).expect("invalid table");
///
/// assert_eq!(table.get("zisterne").unwrap().len(), 3);
/// assert!(table.get("saugstelle").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable(BTreeMap<String, Vec<String>>);

impl CategoryTable {
    /// Parse a table from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    /// Read a TOML table from the file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let toml = fs::read_to_string(path).map_err(Error::io(path))?;
        Self::from_toml_str(&toml).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Categories for the GPX file `stem`.
    pub fn get(&self, stem: &str) -> Result<&[String], Error> {
        self.0
            .get(stem)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownCategory(stem.to_string()))
    }

    /// Iterate over the known stems in lexical order.
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        BUILTIN
            .iter()
            .map(|(stem, labels)| {
                let labels = labels.iter().map(|label| label.to_string()).collect();
                (stem.to_string(), labels)
            })
            .collect()
    }
}

impl FromIterator<(String, Vec<String>)> for CategoryTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
