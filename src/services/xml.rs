//! Streaming XML helpers built on `quick-xml`.
//!
//! Nothing here builds a DOM. The classifier only needs the root element,
//! the packer needs a well-formedness check and the payload without its
//! prolog, and the preview engine needs the payload subtree of a data
//! container imported as a standalone document.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Namespace-resolved name of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl ElementName {
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }
}

/// In-scope prefix bindings; the empty prefix is the default namespace.
type Bindings = BTreeMap<String, String>;

fn reader(bytes: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(bytes);
    reader.check_end_names(true);
    reader
}

/// Namespace declarations carried by a start tag.
fn declarations(start: &BytesStart<'_>) -> Result<Vec<(String, String)>, String> {
    let mut declared = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("Malformed attribute: {e}"))?;
        let key = attr.key.as_ref();
        let prefix = if key == b"xmlns" {
            String::new()
        } else if let Some(p) = key.strip_prefix(b"xmlns:") {
            String::from_utf8_lossy(p).into_owned()
        } else {
            continue;
        };
        let uri = attr
            .unescape_value()
            .map_err(|e| format!("Malformed namespace declaration: {e}"))?;
        declared.push((prefix, uri.into_owned()));
    }
    Ok(declared)
}

fn prefix_of(qname: &[u8]) -> Option<&[u8]> {
    qname
        .iter()
        .position(|b| *b == b':')
        .map(|idx| &qname[..idx])
}

fn local_of(qname: &[u8]) -> &[u8] {
    match qname.iter().position(|b| *b == b':') {
        Some(idx) => &qname[idx + 1..],
        None => qname,
    }
}

fn resolve(start: &BytesStart<'_>, scope: &Bindings) -> ElementName {
    let qname = start.name();
    let raw = qname.as_ref();
    let prefix = prefix_of(raw)
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .unwrap_or_default();
    ElementName {
        namespace: scope.get(&prefix).filter(|uri| !uri.is_empty()).cloned(),
        local_name: String::from_utf8_lossy(local_of(raw)).into_owned(),
    }
}

fn with_declarations(parent: &Bindings, declared: &[(String, String)]) -> Bindings {
    let mut scope = parent.clone();
    for (prefix, uri) in declared {
        scope.insert(prefix.clone(), uri.clone());
    }
    scope
}

/// Resolve the root element without reading the rest of the document.
pub fn root_element(bytes: &[u8]) -> Result<ElementName, String> {
    let mut reader = reader(bytes);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let scope = with_declarations(&Bindings::new(), &declarations(&e)?);
                return Ok(resolve(&e, &scope));
            }
            Ok(Event::Eof) => return Err("Document has no root element".to_string()),
            Ok(_) => {}
            Err(e) => return Err(format!("XML parse error: {e}")),
        }
    }
}

/// Check that `bytes` is a single well-formed XML document.
pub fn check_well_formed(bytes: &[u8]) -> Result<(), String> {
    if std::str::from_utf8(bytes).is_err() {
        return Err("Document is not valid UTF-8".to_string());
    }

    let mut reader = reader(bytes);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML parse error at byte {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(e) | Event::Empty(e) if depth == 0 && roots > 0 => {
                return Err(format!(
                    "Second root element <{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                ));
            }
            Event::Start(e) => {
                declarations(&e)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                declarations(&e)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err("Unexpected closing tag".to_string());
                }
                depth -= 1;
            }
            Event::Text(t) => {
                if depth == 0 {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err("Text content outside the root element".to_string());
                    }
                } else {
                    t.unescape()
                        .map_err(|e| format!("Malformed character data: {e}"))?;
                }
            }
            Event::CData(_) if depth == 0 => {
                return Err("CDATA outside the root element".to_string());
            }
            Event::DocType(_) if depth > 0 || roots > 0 => {
                return Err("DOCTYPE is only allowed before the root element".to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(format!("{depth} element(s) left unclosed"));
    }
    if roots == 0 {
        return Err("Document has no root element".to_string());
    }
    Ok(())
}

/// The root element of a well-formed document, without the byte-order mark,
/// XML declaration, DOCTYPE, prolog comments or processing instructions and
/// anything after the root, ready to be embedded into another document.
pub fn root_element_bytes(bytes: &[u8]) -> Result<&[u8], String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = reader(bytes);
    let mut start = None;
    let mut depth = 0usize;

    loop {
        let before = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    start = Some(before);
                }
                depth += 1;
            }
            Ok(Event::Empty(_)) if depth == 0 => {
                return Ok(&bytes[before..reader.buffer_position()]);
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(start) = start {
                        return Ok(&bytes[start..reader.buffer_position()]);
                    }
                }
            }
            Ok(Event::Eof) => return Err("Document has no root element".to_string()),
            Ok(_) => {}
            Err(e) => return Err(format!("XML parse error: {e}")),
        }
    }
}

/// Copy the first element child of the first `{namespace}local_name`
/// element into a standalone document.
///
/// The copied subtree keeps its own namespace declarations; prefixes it uses
/// that were bound on ancestors are re-declared on the new root so the
/// result resolves exactly as it did in place.
pub fn import_first_child(
    bytes: &[u8],
    namespace: &str,
    local_name: &str,
) -> Result<Vec<u8>, String> {
    let mut reader = reader(bytes);
    let mut scopes: Vec<Bindings> = vec![Bindings::new()];

    // Locate the container element.
    let container_scope = loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML parse error: {e}"))?;
        match event {
            Event::Start(e) => {
                let scope = with_declarations(current(&scopes), &declarations(&e)?);
                let found = resolve(&e, &scope).is(namespace, local_name);
                scopes.push(scope);
                if found {
                    break scopes.pop().unwrap_or_default();
                }
            }
            Event::Empty(e) => {
                let scope = with_declarations(current(&scopes), &declarations(&e)?);
                if resolve(&e, &scope).is(namespace, local_name) {
                    return Err(format!("{local_name} element is empty"));
                }
            }
            Event::End(_) => {
                scopes.pop();
            }
            Event::Eof => return Err(format!("{local_name} not found")),
            _ => {}
        }
    };

    // Collect the first element child and everything beneath it.
    let mut subtree: Vec<Event<'static>> = Vec::new();
    let mut used_prefixes: Vec<String> = Vec::new();
    let mut depth = 0usize;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML parse error: {e}"))?;
        match event {
            Event::Start(e) => {
                note_prefixes(&e, &mut used_prefixes);
                depth += 1;
                subtree.push(Event::Start(e.into_owned()));
            }
            Event::Empty(e) => {
                note_prefixes(&e, &mut used_prefixes);
                subtree.push(Event::Empty(e.into_owned()));
                if depth == 0 {
                    break;
                }
            }
            Event::End(e) => {
                if depth == 0 {
                    return Err(format!("{local_name} has no payload element"));
                }
                depth -= 1;
                subtree.push(Event::End(e.into_owned()));
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => return Err(format!("{local_name} is not closed")),
            other if depth > 0 => subtree.push(other.into_owned()),
            // Whitespace, comments and PIs before the payload element
            _ => {}
        }
    }

    let mut writer = Writer::new(Vec::new());
    let mut events = subtree.into_iter();
    match events.next() {
        Some(Event::Start(root)) => {
            let root = redeclare(root, &container_scope, &used_prefixes)?;
            write(&mut writer, Event::Start(root))?;
        }
        Some(Event::Empty(root)) => {
            let root = redeclare(root, &container_scope, &used_prefixes)?;
            write(&mut writer, Event::Empty(root))?;
        }
        _ => return Err(format!("{local_name} has no payload element")),
    }
    for event in events {
        write(&mut writer, event)?;
    }
    Ok(writer.into_inner())
}

fn current(scopes: &[Bindings]) -> &Bindings {
    static EMPTY: Bindings = Bindings::new();
    scopes.last().unwrap_or(&EMPTY)
}

fn note_prefixes(start: &BytesStart<'_>, used: &mut Vec<String>) {
    let mut note = |prefix: String| {
        if !used.contains(&prefix) {
            used.push(prefix);
        }
    };
    let qname = start.name();
    note(
        prefix_of(qname.as_ref())
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default(),
    );
    for attr in start.attributes().flatten() {
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        // Unprefixed attributes are in no namespace, only prefixed ones count.
        if let Some(p) = prefix_of(key) {
            if p != b"xml" {
                note(String::from_utf8_lossy(p).into_owned());
            }
        }
    }
}

fn redeclare(
    root: BytesStart<'static>,
    inherited: &Bindings,
    used: &[String],
) -> Result<BytesStart<'static>, String> {
    let own: Vec<String> = declarations(&root)?.into_iter().map(|(p, _)| p).collect();
    let mut root = root;
    for prefix in used {
        if own.contains(prefix) {
            continue;
        }
        let Some(uri) = inherited.get(prefix) else {
            continue;
        };
        if prefix.is_empty() {
            root.push_attribute(("xmlns", uri.as_str()));
        } else {
            let key = format!("xmlns:{prefix}");
            root.push_attribute((key.as_str(), uri.as_str()));
        }
    }
    Ok(root)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer
        .write_event(event)
        .map_err(|e| format!("XML write error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:test:envelope";

    #[test]
    fn test_root_element_resolves_prefix() {
        let xml = br#"<?xml version="1.0"?><e:Envelope xmlns:e="urn:test:envelope"><x/></e:Envelope>"#;
        let root = root_element(xml).unwrap();
        assert!(root.is(NS, "Envelope"));
    }

    #[test]
    fn test_root_element_default_namespace() {
        let root = root_element(br#"<Form xmlns="urn:form"/>"#).unwrap();
        assert_eq!(root.namespace.as_deref(), Some("urn:form"));
        assert_eq!(root.local_name, "Form");
    }

    #[test]
    fn test_root_element_without_namespace() {
        let root = root_element(b"<Form/>").unwrap();
        assert_eq!(root.namespace, None);
        assert!(root_element(b"   ").is_err());
    }

    #[test]
    fn test_well_formed_accepts() {
        assert!(check_well_formed(b"<?xml version=\"1.0\"?>\n<a x=\"1\"><b>t &amp; u</b><c/></a>\n").is_ok());
    }

    #[test]
    fn test_well_formed_rejects() {
        assert!(check_well_formed(b"<a><b></a>").is_err());
        assert!(check_well_formed(b"<a>").is_err());
        assert!(check_well_formed(b"<a/><b/>").is_err());
        assert!(check_well_formed(b"text<a/>").is_err());
        assert!(check_well_formed(b"").is_err());
        assert!(check_well_formed(b"</a>").is_err());
        assert!(check_well_formed(b"<a x=\"1\" x=\"2\"/>").is_err());
        assert!(check_well_formed(b"<a>\xff</a>").is_err());
    }

    #[test]
    fn test_root_element_bytes_drops_prolog() {
        assert_eq!(
            root_element_bytes(b"\xEF\xBB\xBF<?xml version=\"1.0\"?>\n  <a/>\n").unwrap(),
            b"<a/>"
        );
        assert_eq!(root_element_bytes(b"<a/>").unwrap(), b"<a/>");
        assert_eq!(
            root_element_bytes(
                b"<?xml version=\"1.0\"?>\n<!DOCTYPE form>\n<!-- note -->\n<?pi x?>\n<form><b/>x</form>\n<!-- tail -->"
            )
            .unwrap(),
            b"<form><b/>x</form>"
        );
        assert!(root_element_bytes(b"<!-- only -->").is_err());
    }

    #[test]
    fn test_doctype_inside_root_rejected() {
        assert!(check_well_formed(b"<!DOCTYPE a>\n<a/>").is_ok());
        assert!(check_well_formed(b"<a><!DOCTYPE b><b/></a>").is_err());
        assert!(check_well_formed(b"<a/>\n<!DOCTYPE b>").is_err());
    }

    #[test]
    fn test_import_first_child() {
        let xml = br#"<e:Envelope xmlns:e="urn:test:envelope"><e:Data>
            <f:Form xmlns:f="urn:form" f:id="7"><f:Name>Jane</f:Name></f:Form>
        </e:Data></e:Envelope>"#;
        let payload = import_first_child(xml, NS, "Data").unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"<f:Form xmlns:f="urn:form" f:id="7"><f:Name>Jane</f:Name></f:Form>"#
        );
    }

    #[test]
    fn test_import_redeclares_inherited_namespaces() {
        let xml = br#"<e:Envelope xmlns:e="urn:test:envelope" xmlns="urn:form"><e:Data><Form><Name>Jane</Name></Form></e:Data></e:Envelope>"#;
        let payload = String::from_utf8(import_first_child(xml, NS, "Data").unwrap()).unwrap();
        assert_eq!(payload, r#"<Form xmlns="urn:form"><Name>Jane</Name></Form>"#);
        // The envelope namespace is not used by the payload and is not carried over.
        assert!(!payload.contains("urn:test:envelope"));
    }

    #[test]
    fn test_import_keeps_escaping() {
        let xml = br#"<e:Envelope xmlns:e="urn:test:envelope"><e:Data><a t="&lt;x&gt;">&amp;&#233;</a></e:Data></e:Envelope>"#;
        let payload = String::from_utf8(import_first_child(xml, NS, "Data").unwrap()).unwrap();
        assert_eq!(payload, r#"<a t="&lt;x&gt;">&amp;&#233;</a>"#);
    }

    #[test]
    fn test_import_missing_element() {
        let xml = br#"<e:Envelope xmlns:e="urn:test:envelope"><e:Other/></e:Envelope>"#;
        let err = import_first_child(xml, NS, "Data").unwrap_err();
        assert!(err.contains("Data not found"));
    }

    #[test]
    fn test_import_wrong_namespace() {
        let xml = br#"<e:Envelope xmlns:e="urn:other"><e:Data><a/></e:Data></e:Envelope>"#;
        assert!(import_first_child(xml, NS, "Data").is_err());
    }

    #[test]
    fn test_import_empty_container() {
        let xml = br#"<e:Envelope xmlns:e="urn:test:envelope"><e:Data>  </e:Data></e:Envelope>"#;
        let err = import_first_child(xml, NS, "Data").unwrap_err();
        assert!(err.contains("no payload element"));

        let xml = br#"<e:Envelope xmlns:e="urn:test:envelope"><e:Data/></e:Envelope>"#;
        assert!(import_first_child(xml, NS, "Data").is_err());
    }
}
