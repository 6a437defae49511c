mod common;

use common::{button, hierarchy, label, node};
use uitree_automation::screen::indexer::index;
use uitree_automation::screen::locator::{find, find_by_resource_id, find_exact, find_preferred, near};
use uitree_automation::state::identity::SpatialAnchor;
use uitree_automation::{LocatorQuery, Point, Snapshot};

fn sample() -> Snapshot {
    let raw = hierarchy(&[
        label("推荐", "[0,100][200,180]"),
        button("关注", "[850,300][1030,380]"),
        node("", "关注 按钮", true, "[850,500][1030,580]"),
        label("已关注", "[850,700][1030,780]"),
        button("Message", "[0,1800][200,1900]"),
        node("关注", "", true, ""),
    ]);
    index(&raw).unwrap()
}

#[test]
fn substring_match_covers_text_and_description_in_document_order() {
    let snapshot = sample();
    let matches = find(&snapshot, &LocatorQuery::new(["关注"]));

    let centers: Vec<Point> = matches.iter().map(|m| m.center).collect();
    assert_eq!(
        centers,
        vec![Point::new(940, 340), Point::new(940, 540), Point::new(940, 740)],
        "text, description and substring hits; the bounds-less node is excluded"
    );
}

#[test]
fn clickable_requirement_filters_matches() {
    let snapshot = sample();
    let matches = find(&snapshot, &LocatorQuery::new(["关注"]).clickable());
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.element.clickable));
}

#[test]
fn find_is_idempotent_on_the_same_snapshot() {
    let snapshot = sample();
    let query = LocatorQuery::new(["关注", "推荐"]);
    assert_eq!(find(&snapshot, &query), find(&snapshot, &query));
}

#[test]
fn matching_is_case_sensitive_unless_fallback_requested() {
    let snapshot = sample();
    assert!(find(&snapshot, &LocatorQuery::new(["message"])).is_empty());

    let fallback = find(&snapshot, &LocatorQuery::new(["message"]).with_case_fallback());
    assert_eq!(fallback.len(), 1);
    assert_eq!(fallback[0].element.text, "Message");
}

#[test]
fn case_fallback_is_not_used_when_exact_pass_finds_something() {
    let raw = hierarchy(&[button("OK", "[0,0][10,10]"), button("ok", "[20,0][30,10]")]);
    let snapshot = index(&raw).unwrap();
    let matches = find(&snapshot, &LocatorQuery::new(["OK"]).with_case_fallback());
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].element.text, "OK");
}

#[test]
fn empty_candidates_match_nothing() {
    let snapshot = sample();
    assert!(find(&snapshot, &LocatorQuery::new([""])).is_empty());
    assert!(find(&snapshot, &LocatorQuery::new(Vec::<String>::new())).is_empty());
}

#[test]
fn exact_lookup_does_not_match_substrings() {
    let snapshot = sample();
    let follow = find_exact(&snapshot, &["关注"], true);
    assert_eq!(follow.len(), 1, "'已关注' and the description must not count");
    assert_eq!(follow[0].center, Point::new(940, 340));
}

#[test]
fn resource_id_beats_text_match() {
    let raw = hierarchy(&[
        button("消息", "[0,0][100,100]"),
        r#"<node text="" resource-id="com.xingin.xhs:id/tab_message" class="android.widget.FrameLayout" content-desc="" clickable="true" bounds="[500,1800][600,1900]" />"#
            .to_string(),
    ]);
    let snapshot = index(&raw).unwrap();
    let query = LocatorQuery::new(["消息"]).clickable();

    assert_eq!(find_by_resource_id(&snapshot, "com.xingin.xhs:id/tab_message").len(), 1);

    let preferred = find_preferred(&snapshot, Some("com.xingin.xhs:id/tab_message"), &query).unwrap();
    assert_eq!(preferred.center, Point::new(550, 1850));

    let fallback = find_preferred(&snapshot, Some("com.xingin.xhs:id/missing"), &query).unwrap();
    assert_eq!(fallback.center, Point::new(50, 50));
}

// =========================================================================
// Spatial re-identification
// =========================================================================

#[test]
fn anchor_picks_nearest_match_inside_window() {
    let raw = hierarchy(&[
        button("已关注", "[850,300][1030,380]"),
        button("关注", "[850,340][1030,420]"),
        button("关注", "[850,700][1030,780]"),
    ]);
    let snapshot = index(&raw).unwrap();
    let matches = find(&snapshot, &LocatorQuery::new(["关注", "已关注"]));

    let anchor = SpatialAnchor::new(Point::new(940, 375), 50);
    let hit = anchor.reidentify(&matches).unwrap();
    assert_eq!(hit.center, Point::new(940, 380), "5px away beats 35px away");

    let far = SpatialAnchor::new(Point::new(100, 100), 50);
    assert!(far.reidentify(&matches).is_none());
}

#[test]
fn anchor_window_is_inclusive_on_both_axes() {
    let anchor = SpatialAnchor::new(Point::new(100, 100), 50);
    assert!(anchor.contains(Point::new(150, 50)));
    assert!(!anchor.contains(Point::new(151, 100)));
    assert!(!anchor.contains(Point::new(100, 49)));
}

#[test]
fn near_reidentifies_a_control_after_its_label_changes() {
    let after = index(&hierarchy(&[
        button("已关注", "[850,300][1030,380]"),
        button("关注", "[850,500][1030,580]"),
    ]))
    .unwrap();
    let query = LocatorQuery::new(["关注", "已关注"]);

    let control = near(&after, &query, Point::new(940, 340), 50).unwrap();
    assert_eq!(control.element.text, "已关注");
    assert!(near(&after, &query, Point::new(940, 440), 50).is_none());
}

#[test]
fn anchor_handles_coordinates_at_the_ends_of_the_range() {
    let anchor = SpatialAnchor::new(Point::new(i32::MIN + 1, i32::MIN + 1), 50);
    let far = Point::new(i32::MAX, i32::MAX);

    assert!(!anchor.contains(far));
    assert_eq!(anchor.distance(far), 2 * (u64::from(u32::MAX) - 1));

    let raw = hierarchy(&[button("关注", "[850,300][1030,380]")]);
    let matches = find(&index(&raw).unwrap(), &LocatorQuery::new(["关注"]));
    assert!(anchor.reidentify(&matches).is_none());
}

#[test]
fn negative_tolerance_matches_nothing() {
    let anchor = SpatialAnchor::new(Point::new(100, 100), -1);
    assert!(!anchor.contains(Point::new(100, 100)));
}
