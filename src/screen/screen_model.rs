use serde::Serialize;

/// Integer device-pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned on-screen rectangle. Only constructed through `new`,
/// which enforces `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Option<Self> {
        if left > right || top > bottom {
            return None;
        }
        Some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Floor-divided midpoint, the coordinate handed to the tap primitive.
    pub fn center(&self) -> Point {
        let mid = |a: i32, b: i32| ((i64::from(a) + i64::from(b)).div_euclid(2)) as i32;
        Point {
            x: mid(self.left, self.right),
            y: mid(self.top, self.bottom),
        }
    }
}

/// One `node` of a UI dump.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UiElement {
    pub text: String,
    pub content_desc: String,
    pub resource_id: String,
    pub class_name: String,
    pub clickable: bool,
    /// Absent when the geometry attribute was missing or malformed
    pub bounds: Option<Bounds>,
}

impl UiElement {
    pub fn center(&self) -> Option<Point> {
        self.bounds.map(|b| b.center())
    }

    /// Human-facing label: visible text, falling back to the accessibility label.
    pub fn label(&self) -> &str {
        if self.text.is_empty() {
            &self.content_desc
        } else {
            &self.text
        }
    }

    pub fn mentions(&self, needle: &str) -> bool {
        self.text.contains(needle) || self.content_desc.contains(needle)
    }
}

/// Immutable capture of the on-device UI tree at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    elements: Vec<UiElement>,
    raw: String,
    fingerprint: String,
    sequence: u64,
}

impl Snapshot {
    pub(crate) fn new(elements: Vec<UiElement>, raw: String, fingerprint: String) -> Self {
        Self {
            elements,
            raw,
            fingerprint,
            sequence: 0,
        }
    }

    /// Stamp the capture order assigned by the acquirer.
    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Elements in document order.
    pub fn elements(&self) -> &[UiElement] {
        &self.elements
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// SHA-1 of the raw dump; equal fingerprints mean an unchanged screen.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Capture order within a run. Zero for snapshots indexed directly from text.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether any element's text or description contains `needle`,
    /// regardless of whether it has usable bounds.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.elements.iter().any(|el| el.mentions(needle))
    }

    /// Raw-or-indexed presence test, used for indicators that may live in
    /// attributes other than text (package names, resource ids).
    pub fn mentions_anywhere(&self, needle: &str) -> bool {
        self.raw.contains(needle) || self.contains_text(needle)
    }
}
