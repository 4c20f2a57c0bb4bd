use std::fmt;

pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace-qualified element or attribute name. Legal documents are
/// matched by local name (`article`, `recital`, ...) regardless of whether
/// the source carries the Akoma Ntoso namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct XName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl XName {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        Self {
            namespace: if namespace.is_empty() {
                None
            } else {
                Some(namespace.to_string())
            },
            local_name: local_name.to_string(),
        }
    }

    pub fn local(local_name: &str) -> Self {
        Self {
            namespace: None,
            local_name: local_name.to_string(),
        }
    }

    /// Tag-vocabulary match: namespace is ignored, local name is exact.
    pub fn matches_local(&self, local_name: &str) -> bool {
        self.local_name == local_name
    }
}

impl fmt::Display for XName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XAttribute {
    pub name: XName,
    pub value: String,
}

impl XAttribute {
    pub fn new(name: XName, value: &str) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }

    pub fn local(local_name: &str, value: &str) -> Self {
        Self::new(XName::local(local_name), value)
    }

    /// Whether this attribute is a namespace declaration (`xmlns` or
    /// `xmlns:prefix`).
    pub fn is_xmlns(&self) -> bool {
        (self.name.namespace.is_none() && self.name.local_name == "xmlns")
            || self.name.namespace.as_deref() == Some(XMLNS_NS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xname_with_namespace_displays_correctly() {
        let name = XName::new("http://docs.oasis-open.org/legaldocml/ns/akn/3.0", "article");
        assert_eq!(
            name.to_string(),
            "{http://docs.oasis-open.org/legaldocml/ns/akn/3.0}article"
        );
    }

    #[test]
    fn matches_local_ignores_namespace() {
        let plain = XName::local("recital");
        let namespaced = XName::new("urn:example", "recital");
        assert!(plain.matches_local("recital"));
        assert!(namespaced.matches_local("recital"));
        assert!(!namespaced.matches_local("article"));
    }

    #[test]
    fn xmlns_attributes_are_detected() {
        assert!(XAttribute::local("xmlns", "urn:x").is_xmlns());
        assert!(XAttribute::new(XName::new(XMLNS_NS, "leos"), "urn:x").is_xmlns());
        assert!(!XAttribute::local("id", "a1").is_xmlns());
    }
}
