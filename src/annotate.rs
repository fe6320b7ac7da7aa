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

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, info};
use xml::name::OwnedName;

use crate::dom::{Document, Element};
use crate::error::file_stem;
use crate::namespaces::{
    ExtensionNamespace, CATEGORIES, CATEGORY, DISPLAY_MODE, EXTENSION_NAMESPACES, SYMBOL_ONLY,
    WAYPOINT_EXTENSION,
};
use crate::structure::TargetGpx;
use crate::{CategoryTable, Error};

/// GPX waypoint element.
const WAYPOINT: &str = "wpt";
/// GPX element naming the waypoint symbol.
const SYMBOL: &str = "sym";
/// GPX element holding foreign extension elements.
const EXTENSIONS: &str = "extensions";

/// Annotate every copied GPX file in `entries` in order.
pub fn annotate_files(entries: &[TargetGpx], table: &CategoryTable) -> Result<(), Error> {
    for entry in entries {
        annotate_file(&entry.gpx, &entry.symbol, table)?;
    }
    Ok(())
}

/// Annotate the GPX file at `path` in place.
///
/// The categories are looked up by the file stem of `path`. The file is
/// only overwritten once the complete document has been serialized.
///
/// Returns the number of annotated waypoints.
pub fn annotate_file(path: &Path, symbol: &str, table: &CategoryTable) -> Result<usize, Error> {
    info!("modify: {}", path.display());
    let xml_error = |source| Error::Xml {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(Error::io(path))?;
    let mut document = Document::parse(BufReader::new(file)).map_err(xml_error)?;

    let count = annotate_document(&mut document, symbol, file_stem(path)?, table)?;
    debug!("annotated {count} waypoints with symbol {symbol:?}");

    let mut buffer = vec![];
    document.write(&mut buffer).map_err(xml_error)?;
    fs::write(path, buffer).map_err(Error::io(path))?;
    Ok(count)
}

/// Add the symbol and category extensions to all waypoints of `document`.
///
/// Every unprefixed `wpt` element gets a `sym` child containing `symbol`.
/// Its `extensions` child receives one `WaypointExtension` block per
/// [extension namespace](EXTENSION_NAMESPACES) listing the categories of
/// `stem`. Existing blocks are emptied first, so annotating twice gives the
/// same result as annotating once.
///
/// The category table is only consulted if there are waypoints.
///
/// Returns the number of annotated waypoints.
pub fn annotate_document(
    document: &mut Document,
    symbol: &str,
    stem: &str,
    table: &CategoryTable,
) -> Result<usize, Error> {
    let count = document.root.count_descendants(&is_waypoint);
    if count == 0 {
        return Ok(0);
    }
    let categories = table.get(stem)?;

    // Prefixes the root already binds to another URI are declared on each
    // block instead.
    let mut rebound = vec![];
    for namespace in EXTENSION_NAMESPACES {
        document.root.declare_namespace(namespace.prefix, namespace.uri);
        if document.root.namespace.get(namespace.prefix) != Some(namespace.uri) {
            rebound.push(*namespace);
        }
    }
    document.root.for_each_descendant_mut(&is_waypoint, &mut |waypoint: &mut Element| {
        set_symbol(waypoint, symbol);
        set_categories(waypoint, categories, &rebound);
    });

    Ok(count)
}

fn is_waypoint(element: &Element) -> bool {
    element.name.prefix.is_none() && element.name.local_name == WAYPOINT
}

/// Name of a GPX child element of `waypoint`, in the waypoint's namespace.
fn gpx_name(waypoint: &Element, local_name: &str) -> OwnedName {
    OwnedName {
        local_name: local_name.to_string(),
        namespace: waypoint.name.namespace.clone(),
        prefix: waypoint.name.prefix.clone(),
    }
}

/// The first GPX child of `waypoint` named `local_name`, appended if missing.
fn gpx_child_or_append<'a>(
    waypoint: &'a mut Element,
    local_name: &'static str,
) -> &'a mut Element {
    let name = gpx_name(waypoint, local_name);
    let namespace = name.namespace.clone();
    waypoint.child_or_append(
        move |element| {
            element.name.namespace == namespace && element.name.local_name == local_name
        },
        || Element::new(name),
    )
}

/// Set the text of the `sym` element, appending one if there is none.
fn set_symbol(waypoint: &mut Element, symbol: &str) {
    gpx_child_or_append(waypoint, SYMBOL).set_text(symbol);
}

/// Rewrite the extension blocks of `waypoint`.
///
/// Blocks of the `rebound` namespaces declare their prefix themselves.
fn set_categories(
    waypoint: &mut Element,
    categories: &[String],
    rebound: &[ExtensionNamespace],
) {
    let extensions = gpx_child_or_append(waypoint, EXTENSIONS);

    for namespace in EXTENSION_NAMESPACES {
        let block = extensions.child_or_append(
            |element| namespace.is(element, WAYPOINT_EXTENSION),
            || Element::new(namespace.name(WAYPOINT_EXTENSION)),
        );
        block.clear();
        if rebound.contains(namespace) {
            block
                .namespace
                .0
                .insert(namespace.prefix.to_string(), namespace.uri.to_string());
        }
        block.append_child(Element::with_text(namespace.name(DISPLAY_MODE), SYMBOL_ONLY));

        let list = block.append_child(Element::new(namespace.name(CATEGORIES)));
        for category in categories {
            list.append_child(Element::with_text(namespace.name(CATEGORY), category.as_str()));
        }
    }
}
