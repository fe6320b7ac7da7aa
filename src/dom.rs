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

//! A small owning XML tree.
//!
//! Every [`Element`] owns its children. Lookups are plain scans over the
//! children, so finding a node and appending to it never share state.

use std::io::{Read, Write};

use thiserror::Error;
use xml::attribute::OwnedAttribute;
use xml::common::XmlVersion;
use xml::name::OwnedName;
use xml::namespace::{Namespace, NS_EMPTY_URI, NS_NO_PREFIX, NS_XMLNS_PREFIX, NS_XML_PREFIX};
use xml::reader::{EventReader, ParserConfig, XmlEvent as ReaderEvent};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent as WriterEvent};

/// Indentation per nesting level of written documents.
const INDENT: &str = "  ";
/// Encoding named in the XML declaration of written documents.
const ENCODING: &str = "UTF-8";

/// Error returned from reading or writing a [`Document`].
#[derive(Error, Debug)]
pub enum Error {
    /// The XML is malformed.
    #[error("reading XML failed: {0}")]
    Read(#[from] xml::reader::Error),
    /// Emitting XML failed.
    #[error("writing XML failed: {0}")]
    Write(#[from] xml::writer::Error),
    /// The input contains no root element.
    #[error("document has no root element")]
    MissingRoot,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { name: String, data: Option<String> },
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An element with its attributes, the namespaces it declares itself, and
/// its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: OwnedName,
    pub attributes: Vec<OwnedAttribute>,
    /// Only the `xmlns` declarations written on this element, not the
    /// inherited ones.
    pub namespace: Namespace,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: OwnedName) -> Self {
        Self {
            name,
            attributes: vec![],
            namespace: Namespace::empty(),
            children: vec![],
        }
    }

    /// Create an element whose only child is `text`.
    pub fn with_text(name: OwnedName, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    /// Replace all children by a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Declare `prefix` for `uri` on this element.
    ///
    /// Returns `false` and leaves the element untouched if the prefix is
    /// already declared here.
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) -> bool {
        self.namespace.put(prefix, uri)
    }

    /// Iterate over the child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// The first child element matching `pred`.
    pub fn child(&self, pred: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.elements().find(|element| pred(*element))
    }

    /// Append `child` and return a reference to it.
    pub fn append_child(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        self.element_at(self.children.len() - 1)
    }

    /// The first child element matching `pred`, or a new one from `create`
    /// appended at the end.
    pub fn child_or_append(
        &mut self,
        pred: impl Fn(&Element) -> bool,
        create: impl FnOnce() -> Element,
    ) -> &mut Element {
        let position = self
            .children
            .iter()
            .position(|node| node.as_element().is_some_and(&pred));
        match position {
            Some(index) => self.element_at(index),
            None => self.append_child(create()),
        }
    }

    /// Number of descendant elements matching `pred`.
    pub fn count_descendants(&self, pred: &impl Fn(&Element) -> bool) -> usize {
        self.elements()
            .map(|child| usize::from(pred(child)) + child.count_descendants(pred))
            .sum()
    }

    /// Call `visit` on every descendant element matching `pred`, in document
    /// order.
    ///
    /// An element is visited before its own children are searched, so
    /// children added by `visit` are searched as well.
    pub fn for_each_descendant_mut(
        &mut self,
        pred: &impl Fn(&Element) -> bool,
        visit: &mut impl FnMut(&mut Element),
    ) {
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            if pred(child) {
                visit(child);
            }
            child.for_each_descendant_mut(pred, visit);
        }
    }

    fn element_at(&mut self, index: usize) -> &mut Element {
        match &mut self.children[index] {
            Node::Element(element) => element,
            _ => unreachable!("child {index} is not an element"),
        }
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub standalone: Option<bool>,
    /// Comments and processing instructions before the root element.
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and processing instructions after the root element.
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parse a complete document from `source`.
    ///
    /// Whitespace-only text between elements is dropped, so the document can
    /// be indented freshly on [`write`](Self::write). Other text is kept as
    /// is. A `<!DOCTYPE>` declaration is not kept.
    pub fn parse(source: impl Read) -> Result<Self, Error> {
        let config = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(false)
            .ignore_comments(false)
            .cdata_to_characters(false);

        let mut standalone = None;
        let mut prolog = vec![];
        let mut epilog = vec![];
        let mut root = None;
        // Open elements together with the namespaces in scope for them.
        let mut open: Vec<(Element, Namespace)> = vec![];

        for event in EventReader::new_with_config(source, config) {
            let node = match event? {
                ReaderEvent::StartDocument {
                    standalone: value, ..
                } => {
                    standalone = value;
                    continue;
                }
                ReaderEvent::StartElement {
                    name,
                    attributes,
                    namespace,
                } => {
                    let element = Element {
                        name,
                        attributes,
                        namespace: declared_namespaces(&namespace, open.last().map(|(_, s)| s)),
                        children: vec![],
                    };
                    open.push((element, namespace));
                    continue;
                }
                ReaderEvent::EndElement { .. } => match open.pop() {
                    Some((element, _)) => Node::Element(element),
                    None => continue,
                },
                ReaderEvent::Characters(text) => Node::Text(text),
                ReaderEvent::CData(text) => Node::CData(text),
                ReaderEvent::Comment(text) => Node::Comment(text),
                ReaderEvent::ProcessingInstruction { name, data } => {
                    Node::ProcessingInstruction { name, data }
                }
                ReaderEvent::Whitespace(_) | ReaderEvent::EndDocument => continue,
                // Doctype declarations.
                #[allow(unreachable_patterns)]
                _ => continue,
            };

            match (open.last_mut(), node) {
                (Some((parent, _)), node) => parent.children.push(node),
                (None, Node::Element(element)) => root = Some(element),
                (None, node) if root.is_none() => prolog.push(node),
                (None, node) => epilog.push(node),
            }
        }

        Ok(Self {
            standalone,
            prolog,
            root: root.ok_or(Error::MissingRoot)?,
            epilog,
        })
    }

    /// Write the document to `sink`, indented by two spaces per level and
    /// terminated by a newline.
    pub fn write(&self, sink: impl Write) -> Result<(), Error> {
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .autopad_comments(false)
            .indent_string(INDENT)
            .line_separator("\n")
            .create_writer(sink);

        writer.write(WriterEvent::StartDocument {
            version: XmlVersion::Version10,
            encoding: Some(ENCODING),
            standalone: self.standalone,
        })?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        writer
            .into_inner()
            .write_all(b"\n")
            .map_err(xml::writer::Error::from)?;
        Ok(())
    }
}

/// Pick the mappings of `scope` which are not inherited from `parent`.
///
/// For the root element, only the predefined `xml` and `xmlns` prefixes and
/// the empty default namespace count as inherited.
fn declared_namespaces(scope: &Namespace, parent: Option<&Namespace>) -> Namespace {
    let mut declared = Namespace::empty();
    for (prefix, uri) in scope {
        let inherited = match parent {
            Some(parent) => parent.get(prefix) == Some(uri),
            None => {
                matches!(prefix, NS_XML_PREFIX | NS_XMLNS_PREFIX)
                    || (prefix == NS_NO_PREFIX && uri == NS_EMPTY_URI)
            }
        };
        if !inherited {
            declared.put(prefix, uri);
        }
    }
    declared
}

fn write_node<W: Write>(writer: &mut EventWriter<W>, node: &Node) -> xml::writer::Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => writer.write(WriterEvent::characters(text)),
        Node::CData(text) => writer.write(WriterEvent::cdata(text)),
        Node::Comment(text) => writer.write(WriterEvent::comment(text)),
        Node::ProcessingInstruction { name, data } => {
            writer.write(WriterEvent::processing_instruction(name, data.as_deref()))
        }
    }
}

fn write_element<W: Write>(
    writer: &mut EventWriter<W>,
    element: &Element,
) -> xml::writer::Result<()> {
    let mut start = WriterEvent::start_element(element.name.borrow());
    for (prefix, uri) in &element.namespace {
        start = start.ns(prefix, uri);
    }
    for attr in &element.attributes {
        start = start.attr(attr.name.borrow(), &attr.value);
    }
    writer.write(start)?;

    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write(WriterEvent::end_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!--exported-->
<gpx xmlns="http://www.topografix.com/GPX/1/1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" version="1.1" creator="test">
    <wpt lat="49.1" lon="11.2">
        <name> Hydrant 1 </name>
        <desc><![CDATA[a < b]]></desc>
    </wpt>
    <wpt lat="49.2" lon="11.3"/>
</gpx>
"#;

    fn parse(xml: &str) -> Document {
        Document::parse(xml.as_bytes()).expect("sample is valid XML")
    }

    fn render(document: &Document) -> String {
        let mut sink = vec![];
        document.write(&mut sink).expect("writing failed");
        String::from_utf8(sink).expect("output is not UTF-8")
    }

    fn is_wpt(element: &Element) -> bool {
        element.name.local_name == "wpt"
    }

    #[test]
    fn parse_keeps_structure() {
        let document = parse(SAMPLE);

        assert_eq!(document.root.name.local_name, "gpx");
        let attributes: Vec<_> = document
            .root
            .attributes
            .iter()
            .map(|attr| (attr.name.local_name.as_str(), attr.value.as_str()))
            .collect();
        assert_eq!(attributes, [("version", "1.1"), ("creator", "test")]);
        assert_eq!(
            document.root.namespace.get(NS_NO_PREFIX),
            Some("http://www.topografix.com/GPX/1/1")
        );
        assert_eq!(
            document.root.namespace.get("xsi"),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert_eq!(document.prolog, vec![Node::Comment("exported".to_string())]);
        assert_eq!(document.root.count_descendants(&is_wpt), 2);

        let wpt = document.root.child(is_wpt).unwrap();
        let name = wpt.child(|e| e.name.local_name == "name").unwrap();
        assert_eq!(name.text(), " Hydrant 1 ");
        let desc = wpt.child(|e| e.name.local_name == "desc").unwrap();
        assert_eq!(desc.children, vec![Node::CData("a < b".to_string())]);
    }

    #[test]
    fn children_do_not_repeat_inherited_namespaces() {
        let document = parse(SAMPLE);
        let wpt = document.root.child(is_wpt).unwrap();

        assert_eq!(
            wpt.name.namespace.as_deref(),
            Some("http://www.topografix.com/GPX/1/1")
        );
        assert!(wpt.namespace.is_empty());
    }

    #[test]
    fn write_indents_by_two_spaces() {
        let output = render(&parse(SAMPLE));

        assert!(output.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(output.contains("\n  <wpt lat=\"49.1\" lon=\"11.2\">"));
        assert!(output.contains("\n    <name> Hydrant 1 </name>"));
        assert!(output.contains("<![CDATA[a < b]]>"));
        assert!(output.ends_with("</gpx>\n"));
        assert!(!output.contains('\r'));
    }

    #[test]
    fn write_then_parse_is_stable() {
        let document = parse(SAMPLE);
        let reparsed = parse(&render(&document));

        assert_eq!(reparsed, document);
    }

    #[test]
    fn child_or_append_reuses_first_match() {
        let mut element = Element::new(OwnedName::local("wpt"));
        element.append_child(Element::with_text(OwnedName::local("sym"), "a"));
        element.append_child(Element::with_text(OwnedName::local("sym"), "b"));

        let sym = element.child_or_append(
            |e| e.name.local_name == "sym",
            || Element::new(OwnedName::local("sym")),
        );
        sym.set_text("c");

        let texts: Vec<_> = element.elements().map(Element::text).collect();
        assert_eq!(texts, ["c", "b"]);
    }

    #[test]
    fn child_or_append_creates_missing() {
        let mut element = Element::new(OwnedName::local("wpt"));
        element.children.push(Node::Text("x".to_string()));

        element
            .child_or_append(
                |e| e.name.local_name == "extensions",
                || Element::new(OwnedName::local("extensions")),
            )
            .append_child(Element::new(OwnedName::local("inner")));

        assert_eq!(element.children.len(), 2);
        let extensions = element.child(|e| e.name.local_name == "extensions").unwrap();
        assert_eq!(extensions.elements().count(), 1);
    }

    #[test]
    fn declare_namespace_keeps_existing_prefix() {
        let mut element = Element::new(OwnedName::local("gpx"));

        assert!(element.declare_namespace("gpxx", "urn:a"));
        assert!(!element.declare_namespace("gpxx", "urn:b"));
        assert_eq!(element.namespace.get("gpxx"), Some("urn:a"));
    }

    #[test]
    fn text_keeps_its_whitespace() {
        let document = parse("<wpt>\n  <desc>  Zeile 1\n  Zeile 2  </desc>\n</wpt>");

        let desc = document.root.child(|e| e.name.local_name == "desc").unwrap();
        assert_eq!(desc.text(), "  Zeile 1\n  Zeile 2  ");
        assert_eq!(document.root.children.len(), 1);
        assert_eq!(parse(&render(&document)), document);
    }

    #[test]
    fn comments_are_written_unpadded() {
        let output = render(&parse(SAMPLE));

        assert!(output.contains("<!--exported-->"), "{output}");
    }

    #[test]
    fn doctype_is_dropped() {
        let document = parse("<!DOCTYPE gpx>\n<gpx><wpt/></gpx>");

        assert!(document.prolog.is_empty());
        assert!(!render(&document).contains("DOCTYPE"));
        assert_eq!(document.root.count_descendants(&is_wpt), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(Document::parse("".as_bytes()).is_err());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let result = Document::parse("<gpx><wpt></gpx>".as_bytes());

        assert!(matches!(result, Err(Error::Read(_))));
    }
}
