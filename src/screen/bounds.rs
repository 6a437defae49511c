use std::sync::LazyLock;

use regex::Regex;

use crate::screen::screen_model::Bounds;

static INTEGER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("static pattern compiles"));

/// Parse a `[left,top][right,bottom]` geometry string.
///
/// Integer runs are pulled out of the string and exactly four are required.
/// Values outside `i32` and inverted rectangles yield `None`.
pub fn parse_bounds(raw: &str) -> Option<Bounds> {
    let mut coords = [0i32; 4];
    let mut found = 0usize;

    for run in INTEGER_RUN.find_iter(raw) {
        if found == coords.len() {
            return None;
        }
        coords[found] = run.as_str().parse().ok()?;
        found += 1;
    }

    if found != coords.len() {
        return None;
    }

    let [left, top, right, bottom] = coords;
    Bounds::new(left, top, right, bottom)
}
