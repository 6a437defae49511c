use serde::Serialize;

use crate::screen::screen_model::{Point, Snapshot, UiElement};
use crate::state::identity::SpatialAnchor;
use crate::state::normalize::label_equals;

/// Candidate strings plus an optional clickability requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorQuery {
    pub candidates: Vec<String>,
    pub require_clickable: bool,
    /// Retry case-insensitively when the exact pass finds nothing
    pub case_insensitive_fallback: bool,
}

impl LocatorQuery {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            require_clickable: false,
            case_insensitive_fallback: false,
        }
    }

    pub fn clickable(mut self) -> Self {
        self.require_clickable = true;
        self
    }

    pub fn with_case_fallback(mut self) -> Self {
        self.case_insensitive_fallback = true;
        self
    }
}

/// A tappable element and the point to tap it at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub element: UiElement,
    pub center: Point,
}

/// All tappable elements whose text or description contains any candidate,
/// in document order.
///
/// Elements without usable bounds never appear in the result.
pub fn find(snapshot: &Snapshot, query: &LocatorQuery) -> Vec<Match> {
    let exact = collect(snapshot, query, |haystack, needle| haystack.contains(needle));
    if !exact.is_empty() || !query.case_insensitive_fallback {
        return exact;
    }

    let lowered: Vec<String> = query.candidates.iter().map(|c| c.to_lowercase()).collect();
    collect_with(snapshot, query.require_clickable, |el| {
        let text = el.text.to_lowercase();
        let desc = el.content_desc.to_lowercase();
        lowered
            .iter()
            .filter(|c| !c.is_empty())
            .any(|c| text.contains(c.as_str()) || desc.contains(c.as_str()))
    })
}

/// Re-identify a control: the match of `query` nearest `point`, within
/// `tolerance` pixels on both axes.
pub fn near(snapshot: &Snapshot, query: &LocatorQuery, point: Point, tolerance: i32) -> Option<Match> {
    let matches = find(snapshot, query);
    SpatialAnchor::new(point, tolerance).reidentify(&matches).cloned()
}

/// Tappable elements whose visible text equals one of `labels`.
pub fn find_exact(snapshot: &Snapshot, labels: &[&str], require_clickable: bool) -> Vec<Match> {
    collect_with(snapshot, require_clickable, |el| {
        labels.iter().any(|label| label_equals(el, label))
    })
}

/// Tappable elements carrying exactly this resource identifier.
pub fn find_by_resource_id(snapshot: &Snapshot, resource_id: &str) -> Vec<Match> {
    collect_with(snapshot, false, |el| el.resource_id == resource_id)
}

/// Prefer an exact resource-id hit; fall back to the text query.
pub fn find_preferred(
    snapshot: &Snapshot,
    resource_id: Option<&str>,
    query: &LocatorQuery,
) -> Option<Match> {
    resource_id
        .and_then(|id| {
            find_by_resource_id(snapshot, id)
                .into_iter()
                .find(|m| !query.require_clickable || m.element.clickable)
        })
        .or_else(|| find(snapshot, query).into_iter().next())
}

fn collect<F>(snapshot: &Snapshot, query: &LocatorQuery, contains: F) -> Vec<Match>
where
    F: Fn(&str, &str) -> bool,
{
    collect_with(snapshot, query.require_clickable, |el| {
        query
            .candidates
            .iter()
            .filter(|c| !c.is_empty())
            .any(|c| contains(&el.text, c) || contains(&el.content_desc, c))
    })
}

fn collect_with<P>(snapshot: &Snapshot, require_clickable: bool, predicate: P) -> Vec<Match>
where
    P: Fn(&UiElement) -> bool,
{
    snapshot
        .elements()
        .iter()
        .filter(|el| !require_clickable || el.clickable)
        .filter(|el| predicate(el))
        .filter_map(|el| {
            el.center().map(|center| Match {
                element: el.clone(),
                center,
            })
        })
        .collect()
}
