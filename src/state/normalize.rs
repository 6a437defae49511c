use crate::screen::screen_model::UiElement;

/// Collapse whitespace so labels that differ only in layout padding compare equal.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether an element's visible text is exactly `label`, ignoring
/// surrounding and repeated whitespace.
pub fn label_equals(el: &UiElement, label: &str) -> bool {
    normalize_label(&el.text) == normalize_label(label)
}

pub fn text_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
