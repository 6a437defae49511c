use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use crate::error::AutomationError;
use crate::screen::bounds::parse_bounds;
use crate::screen::screen_model::{Snapshot, UiElement};
use crate::state::normalize::text_fingerprint;

const NODE_TAG: &[u8] = b"node";

/// Parse a `uiautomator` dump into a snapshot.
///
/// Every `node` element becomes one `UiElement`, in document (depth-first)
/// order. Document order roughly tracks top-to-bottom layout but callers must
/// not rely on it beyond "as authored".
pub fn index(raw: &str) -> Result<Snapshot, AutomationError> {
    let mut reader = Reader::from_str(raw);
    let mut elements = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                saw_root = true;
                depth += 1;
                if tag.name().as_ref() == NODE_TAG {
                    elements.push(to_element(&tag, reader.buffer_position() as u64)?);
                }
            }
            Ok(Event::Empty(tag)) => {
                saw_root = true;
                if tag.name().as_ref() == NODE_TAG {
                    elements.push(to_element(&tag, reader.buffer_position() as u64)?);
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    AutomationError::parse(
                        reader.buffer_position() as u64,
                        "closing tag without matching opening tag",
                    )
                })?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AutomationError::parse(
                    reader.error_position() as u64,
                    e.to_string(),
                ));
            }
        }
    }

    if !saw_root {
        return Err(AutomationError::parse(0, "document has no root element"));
    }
    if depth != 0 {
        return Err(AutomationError::parse(
            raw.len() as u64,
            format!("{depth} element(s) left unclosed at end of document"),
        ));
    }

    debug!(elements = elements.len(), bytes = raw.len(), "indexed UI tree");
    Ok(Snapshot::new(elements, raw.to_string(), text_fingerprint(raw)))
}

fn to_element(tag: &BytesStart<'_>, position: u64) -> Result<UiElement, AutomationError> {
    let mut element = UiElement::default();

    for attr in tag.attributes() {
        let attr = attr.map_err(|e| AutomationError::parse(position, e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| AutomationError::parse(position, e.to_string()))?;

        match attr.key.as_ref() {
            b"text" => element.text = value.into_owned(),
            b"content-desc" => element.content_desc = value.into_owned(),
            b"resource-id" => element.resource_id = value.into_owned(),
            b"class" => element.class_name = value.into_owned(),
            b"clickable" => element.clickable = value == "true",
            b"bounds" => element.bounds = parse_bounds(&value),
            _ => {}
        }
    }

    Ok(element)
}
