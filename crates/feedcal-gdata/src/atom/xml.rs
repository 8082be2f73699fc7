//! Reading and writing element trees with quick-xml.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{FeedError, FeedResult};

use super::element::{Attribute, Element, Node};
use super::{ATOM_NS, KNOWN_PREFIXES, XML_NS};

/// Parses an XML document into its root element.
pub fn parse(xml: &str) -> FeedResult<Element> {
    let mut reader = NsReader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| malformed("failed to read XML", e))?;
        let namespace = namespace_uri(ns);

        match event {
            Event::Start(start) => {
                let element = open_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, namespace, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| FeedError::invalid_response("unbalanced end tag"))?;
                element.drop_layout_whitespace();
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| malformed("invalid character data", e))?;
                    current.push_node(Node::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_node(Node::Text(String::from_utf8_lossy(&data).into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(FeedError::invalid_response("document ended inside an element"));
    }
    root.ok_or_else(|| FeedError::invalid_response("document has no root element"))
}

/// Serializes an element tree as a standalone UTF-8 document.
///
/// Every namespace used in the tree is declared once on the root element.
pub fn to_xml(root: &Element) -> FeedResult<String> {
    let prefixes = Prefixes::for_tree(root);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_failed)?;
    write_element(&mut writer, root, &prefixes, true)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| FeedError::internal("serialized document is not UTF-8").with_source(e))
}

fn malformed(context: &str, err: impl std::fmt::Display) -> FeedError {
    FeedError::invalid_response(format!("{}: {}", context, err))
}

fn write_failed(err: impl std::fmt::Display) -> FeedError {
    FeedError::internal(format!("failed to write XML: {}", err))
}

fn namespace_uri(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> FeedResult<Element> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut element = match namespace {
        Some(ref ns) => Element::new(ns, &local),
        None => Element::unqualified(&local),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed("invalid attribute", e))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, name) = reader.resolve_attribute(attr.key);
        let name = String::from_utf8_lossy(name.as_ref()).into_owned();
        let namespace = namespace_uri(ns);
        let value = attr
            .unescape_value()
            .map_err(|e| malformed("invalid attribute value", e))?
            .into_owned();
        element.push_attribute(Attribute {
            namespace,
            name,
            value,
        });
    }

    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> FeedResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_node(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(FeedError::invalid_response(
            "document has more than one root element",
        )),
    }
}

/// Namespace URI to prefix assignment for one serialization.
struct Prefixes {
    /// (uri, prefix); an empty prefix is the default namespace.
    entries: Vec<(String, String)>,
}

impl Prefixes {
    fn for_tree(root: &Element) -> Self {
        let mut used: Vec<String> = Vec::new();
        let mut needs_unprefixed = false;
        let mut atom_attribute = false;

        root.walk(&mut |element| {
            match element.namespace() {
                Some(ns) => remember(&mut used, ns),
                None => needs_unprefixed = true,
            }
            for attr in element.attributes() {
                if let Some(ns) = attr.namespace.as_deref() {
                    remember(&mut used, ns);
                    atom_attribute |= ns == ATOM_NS;
                }
            }
        });

        // Atom is the default namespace unless that would capture
        // unqualified elements or Atom-qualified attributes.
        let atom_default = !needs_unprefixed && !atom_attribute;
        let mut generated = 0usize;
        let entries = used
            .into_iter()
            .filter(|ns| ns != XML_NS)
            .map(|ns| {
                let prefix = if ns == ATOM_NS && atom_default {
                    String::new()
                } else if let Some((_, known)) = KNOWN_PREFIXES.iter().find(|(uri, _)| *uri == ns)
                {
                    (*known).to_string()
                } else {
                    generated += 1;
                    format!("ns{}", generated)
                };
                (ns, prefix)
            })
            .collect();

        Self { entries }
    }

    fn qualify(&self, namespace: Option<&str>, local: &str) -> String {
        let prefix = match namespace {
            None => None,
            Some(XML_NS) => Some("xml"),
            Some(ns) => self
                .entries
                .iter()
                .find(|(uri, _)| uri == ns)
                .map(|(_, prefix)| prefix.as_str()),
        };
        match prefix {
            Some(p) if !p.is_empty() => format!("{}:{}", p, local),
            _ => local.to_string(),
        }
    }
}

fn remember(used: &mut Vec<String>, ns: &str) {
    if !used.iter().any(|u| u == ns) {
        used.push(ns.to_string());
    }
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    element: &Element,
    prefixes: &Prefixes,
    is_root: bool,
) -> FeedResult<()> {
    let name = prefixes.qualify(element.namespace(), element.name());
    let mut start = BytesStart::new(name.as_str());

    if is_root {
        for (uri, prefix) in &prefixes.entries {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            start.push_attribute((key.as_str(), uri.as_str()));
        }
    }

    for attr in element.attributes() {
        let key = prefixes.qualify(attr.namespace.as_deref(), &attr.name);
        start.push_attribute((key.as_str(), attr.value.as_str()));
    }

    if element.nodes().is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(write_failed)?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(write_failed)?;
    for node in element.nodes() {
        match node {
            Node::Element(child) => write_element(writer, child, prefixes, false)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_failed)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(write_failed)?;
    Ok(())
}
