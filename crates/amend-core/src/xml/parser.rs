use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName, XMLNS_NS};
use crate::error::{AmendError, Result};

/// Parse a whole document buffer. Fails with `MalformedDocument`.
pub fn parse_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| AmendError::MalformedDocument {
        message: e.to_string(),
        location: "input".to_string(),
    })?;
    parse_str(text)
}

pub fn parse_str(xml: &str) -> Result<XmlDocument> {
    let doc = roxmltree::Document::parse_with_options(
        xml,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| AmendError::MalformedDocument {
        message: e.to_string(),
        location: format!("line {}", e.pos().row),
    })?;

    Ok(build_document(&doc))
}

/// Parse a caller-supplied fragment for insertion or replacement. The
/// fragment must be a single well-formed element; anything else is
/// `FragmentParse`.
pub fn parse_fragment(xml: &str) -> Result<XmlDocument> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| AmendError::FragmentParse(e.to_string()))?;

    Ok(build_document(&doc))
}

fn build_document(doc: &roxmltree::Document) -> XmlDocument {
    let mut xml_doc = XmlDocument::new();
    build_tree(doc.root_element(), &mut xml_doc, None);
    xml_doc
}

fn build_tree(node: roxmltree::Node, doc: &mut XmlDocument, parent: Option<indextree::NodeId>) {
    let node_data = match node.node_type() {
        roxmltree::NodeType::Element => {
            let name = XName::new(
                node.tag_name().namespace().unwrap_or(""),
                node.tag_name().name(),
            );

            let mut attributes: Vec<XAttribute> = node
                .attributes()
                .map(|attr| {
                    XAttribute::new(
                        XName::new(attr.namespace().unwrap_or(""), attr.name()),
                        attr.value(),
                    )
                })
                .collect();

            // roxmltree separates namespace declarations from attributes and
            // reports every namespace in scope; fold back only the ones this
            // element itself declares so serialization reproduces the source.
            let parent = node.parent_element();
            for ns in node.namespaces() {
                let inherited = parent.is_some_and(|p| {
                    p.namespaces()
                        .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
                });
                if inherited {
                    continue;
                }
                if let Some(prefix) = ns.name() {
                    attributes.push(XAttribute::new(XName::new(XMLNS_NS, prefix), ns.uri()));
                } else {
                    attributes.push(XAttribute::new(XName::local("xmlns"), ns.uri()));
                }
            }

            XmlNodeData::Element { name, attributes }
        }
        roxmltree::NodeType::Text => match node.text() {
            Some(text) => XmlNodeData::Text(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::Comment => match node.text() {
            Some(text) => XmlNodeData::Comment(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::PI => XmlNodeData::ProcessingInstruction {
            target: node
                .pi()
                .map(|pi| pi.target.to_string())
                .unwrap_or_default(),
            data: node
                .pi()
                .and_then(|pi| pi.value.map(|s| s.to_string()))
                .unwrap_or_default(),
        },
        _ => return,
    };

    let new_id = match parent {
        Some(parent_id) => doc.add_child(parent_id, node_data),
        None => doc.add_root(node_data),
    };

    for child in node.children() {
        build_tree(child, doc, Some(new_id));
    }
}
