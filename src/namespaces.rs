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

//! Garmin extension namespaces written into each waypoint.

use xml::name::OwnedName;

use crate::dom::Element;

/// Element holding the extension data of one namespace.
pub const WAYPOINT_EXTENSION: &str = "WaypointExtension";
/// Element selecting how the device renders the waypoint.
pub const DISPLAY_MODE: &str = "DisplayMode";
/// Element listing the categories.
pub const CATEGORIES: &str = "Categories";
/// Element holding a single category label.
pub const CATEGORY: &str = "Category";
/// Display mode showing only the symbol, without the waypoint name.
pub const SYMBOL_ONLY: &str = "SymbolOnly";

/// A vendor namespace with the prefix used for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionNamespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

/// Namespaces which receive an extension block, in output order.
pub const EXTENSION_NAMESPACES: &[ExtensionNamespace] = &[
    ExtensionNamespace {
        prefix: "gpxx",
        uri: "http://www.garmin.com/xmlschemas/GpxExtensions/v3",
    },
    ExtensionNamespace {
        prefix: "wptx1",
        uri: "http://www.garmin.com/xmlschemas/WaypointExtension/v1",
    },
];

impl ExtensionNamespace {
    /// Qualified name of `local_name` in this namespace.
    pub fn name(&self, local_name: &str) -> OwnedName {
        OwnedName::qualified(local_name, self.uri, Some(self.prefix))
    }

    /// Check whether `element` is `local_name` in this namespace.
    ///
    /// Only the URI is compared, so a block written under another prefix is
    /// still found.
    pub fn is(&self, element: &Element, local_name: &str) -> bool {
        element.name.namespace.as_deref() == Some(self.uri) && element.name.local_name == local_name
    }
}
