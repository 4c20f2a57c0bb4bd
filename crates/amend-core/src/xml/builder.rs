use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName, XMLNS_NS};
use crate::error::{AmendError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;

/// Serialize a whole document to canonical bytes: XML declaration, source
/// attribute order, `<x/>` for childless elements. The same tree always
/// produces the same bytes.
pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(|e| AmendError::XmlWrite(e.to_string()))?;

    if let Some(root_id) = doc.root() {
        let mut namespace_map = NamespaceMap::new();
        if let Some(attrs) = doc.get(root_id).and_then(|d| d.attributes()) {
            extend_namespace_map(&mut namespace_map, attrs);
        }
        write_node(doc, root_id, &mut writer, &namespace_map)?;
    }

    Ok(writer.into_inner().into_inner())
}

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    let bytes = serialize_bytes(doc)?;
    String::from_utf8(bytes).map_err(|e| AmendError::XmlWrite(e.to_string()))
}

/// Serialize a subtree with no XML declaration. Namespace declarations in
/// scope on ancestors are pulled down onto the subtree root so the output
/// stands alone. Used for ToC inline content and annotation comparison.
pub fn serialize_subtree(doc: &XmlDocument, node_id: indextree::NodeId) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let Some(node_data) = doc.get(node_id) else {
        return Ok(String::new());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            let mut merged_attrs = attributes.clone();
            let mut declared: HashSet<XName> = merged_attrs
                .iter()
                .filter(|attr| attr.is_xmlns())
                .map(|attr| attr.name.clone())
                .collect();
            merged_attrs.extend(inherited_namespace_attrs(doc, node_id, &mut declared));

            let mut namespace_map = NamespaceMap::new();
            extend_namespace_map(&mut namespace_map, &merged_attrs);

            write_element(doc, node_id, name, &merged_attrs, &mut writer, &namespace_map)?;
        }
        _ => {
            write_node(doc, node_id, &mut writer, &NamespaceMap::new())?;
        }
    }

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| AmendError::XmlWrite(e.to_string()))
}

type NamespaceMap = HashMap<String, String>;

fn inherited_namespace_attrs(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    declared: &mut HashSet<XName>,
) -> Vec<XAttribute> {
    let mut collected = Vec::new();
    let mut ancestors = doc.ancestors(node_id);
    ancestors.next(); // the node itself

    for ancestor_id in ancestors {
        let Some(attrs) = doc.get(ancestor_id).and_then(|d| d.attributes()) else {
            continue;
        };
        for attr in attrs {
            if attr.is_xmlns() && !declared.contains(&attr.name) {
                declared.insert(attr.name.clone());
                collected.push(attr.clone());
            }
        }
    }

    collected
}

fn extend_namespace_map(namespace_map: &mut NamespaceMap, attributes: &[XAttribute]) {
    for attr in attributes {
        let Some(ns) = &attr.name.namespace else {
            if attr.name.local_name == "xmlns" {
                // Default namespace: elements in it get no prefix.
                namespace_map.entry(attr.value.clone()).or_default();
            }
            continue;
        };

        if ns == XMLNS_NS {
            namespace_map
                .entry(attr.value.clone())
                .or_insert_with(|| attr.name.local_name.clone());
        }
    }
}

fn prefix_for_namespace<'a>(namespace: &str, namespace_map: &'a NamespaceMap) -> &'a str {
    match namespace_map.get(namespace) {
        Some(prefix) => prefix.as_str(),
        None => fallback_prefix(namespace),
    }
}

fn prefix_for_attribute<'a>(namespace: &str, namespace_map: &'a NamespaceMap) -> &'a str {
    if namespace == XMLNS_NS {
        return "xmlns";
    }
    // Unprefixed attributes never inherit the default namespace; an empty
    // mapping cannot apply to them.
    match namespace_map.get(namespace) {
        Some(prefix) if !prefix.is_empty() => prefix.as_str(),
        _ => fallback_prefix(namespace),
    }
}

fn write_node<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let Some(node_data) = doc.get(node_id) else {
        return Ok(());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            write_element(doc, node_id, name, attributes, writer, namespace_map)?;
        }
        XmlNodeData::Text(text) => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| AmendError::XmlWrite(e.to_string()))?;
        }
        XmlNodeData::CData(text) => {
            writer
                .write_event(Event::CData(BytesCData::new(text)))
                .map_err(|e| AmendError::XmlWrite(e.to_string()))?;
        }
        XmlNodeData::Comment(text) => {
            writer
                .write_event(Event::Comment(BytesText::new(text)))
                .map_err(|e| AmendError::XmlWrite(e.to_string()))?;
        }
        XmlNodeData::ProcessingInstruction { target, data } => {
            let pi_content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            writer
                .write_event(Event::PI(BytesPI::new(&pi_content)))
                .map_err(|e| AmendError::XmlWrite(e.to_string()))?;
        }
    }

    Ok(())
}

fn write_element<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let mut scoped_map = namespace_map.clone();
    extend_namespace_map(&mut scoped_map, attributes);

    let tag_name = match &name.namespace {
        Some(ns) => {
            let prefix = prefix_for_namespace(ns, &scoped_map);
            if prefix.is_empty() {
                name.local_name.clone()
            } else {
                format!("{}:{}", prefix, &name.local_name)
            }
        }
        None => name.local_name.clone(),
    };

    let mut elem = BytesStart::new(&tag_name);

    for attr in attributes {
        let attr_name = match &attr.name.namespace {
            Some(ns) => {
                let prefix = prefix_for_attribute(ns, &scoped_map);
                if prefix.is_empty() {
                    attr.name.local_name.clone()
                } else {
                    format!("{}:{}", prefix, &attr.name.local_name)
                }
            }
            None => attr.name.local_name.clone(),
        };
        elem.push_attribute((attr_name.as_str(), attr.value.as_str()));
    }

    let children: Vec<_> = doc.children(node_id).collect();

    if children.is_empty() {
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| AmendError::XmlWrite(e.to_string()))?;
    } else {
        writer
            .write_event(Event::Start(elem))
            .map_err(|e| AmendError::XmlWrite(e.to_string()))?;

        for child_id in children {
            write_node(doc, child_id, writer, &scoped_map)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(&tag_name)))
            .map_err(|e| AmendError::XmlWrite(e.to_string()))?;
    }

    Ok(())
}

fn fallback_prefix(namespace: &str) -> &'static str {
    match namespace {
        // Akoma Ntoso
        "http://docs.oasis-open.org/legaldocml/ns/akn/3.0" => "akn",
        // Editor extensions carried by drafted documents
        "urn:eu:europa:ec:leos" => "leos",
        // xmlns namespace for namespace declarations
        XMLNS_NS => "xmlns",
        // xml namespace for xml:space, xml:id, etc.
        "http://www.w3.org/XML/1998/namespace" => "xml",
        _ => "ns",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse_str;

    #[test]
    fn serialize_simple_document() {
        let mut doc = XmlDocument::new();
        let root = doc.add_root(XmlNodeData::element(XName::local("recital")));
        doc.add_child(root, XmlNodeData::text("Whereas"));

        let xml = serialize(&doc).unwrap();
        assert!(xml.contains("<recital>Whereas</recital>"));
    }

    #[test]
    fn serialize_empty_element_self_closes() {
        let mut doc = XmlDocument::new();
        doc.add_root(XmlNodeData::element(XName::local("meta")));

        let xml = serialize(&doc).unwrap();
        assert!(xml.contains("<meta/>"));
    }

    #[test]
    fn round_trip_is_byte_stable() {
        let src = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<bill><body><article id="art_1"><num>Article 1</num>"#,
            r#"<paragraph id="art_1-par_1">Text &amp; more</paragraph></article></body></bill>"#
        );
        let doc = parse_str(src).unwrap();
        let out = serialize(&doc).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn subtree_serialization_pulls_down_ancestor_namespaces() {
        let src = concat!(
            r#"<bill xmlns:leos="urn:eu:europa:ec:leos">"#,
            r#"<article id="a1" leos:editable="true"/></bill>"#
        );
        let doc = parse_str(src).unwrap();
        let article = doc.first_element_named("article").unwrap();
        let out = serialize_subtree(&doc, article).unwrap();
        assert!(out.contains(r#"xmlns:leos="urn:eu:europa:ec:leos""#));
        assert!(out.contains(r#"leos:editable="true""#));
    }
}
