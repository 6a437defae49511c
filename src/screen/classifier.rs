use serde::Serialize;

use crate::config::PageVocabulary;
use crate::screen::screen_model::Snapshot;
use crate::state::normalize::label_equals;

/// Coarse, heuristically inferred label for the screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageState {
    Home,
    MessageCenter,
    FollowRecommendation,
    PermissionDialog,
    /// Nothing matched. Proceed cautiously; this is not an error.
    Unknown,
}

/// One presence/count test over a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Heuristic {
    /// At least `min` clickable elements whose text is exactly one of `labels`
    ClickableLabelCount { labels: Vec<String>, min: usize },

    /// Any element mentions any of the labels
    AnyPresent(Vec<String>),

    /// Every group has at least one mentioned label
    AllGroupsPresent(Vec<Vec<String>>),

    /// At least `min` distinct indicators appear in the raw dump or element text
    IndicatorCount { indicators: Vec<String>, min: usize },
}

impl Heuristic {
    pub fn holds(&self, snapshot: &Snapshot) -> bool {
        match self {
            Heuristic::ClickableLabelCount { labels, min } => {
                let count = snapshot
                    .elements()
                    .iter()
                    .filter(|el| el.clickable && labels.iter().any(|l| label_equals(el, l)))
                    .count();
                count >= *min
            }

            Heuristic::AnyPresent(labels) => labels.iter().any(|l| snapshot.contains_text(l)),

            Heuristic::AllGroupsPresent(groups) => groups
                .iter()
                .all(|group| group.iter().any(|l| snapshot.contains_text(l))),

            Heuristic::IndicatorCount { indicators, min } => {
                let present = indicators
                    .iter()
                    .filter(|i| snapshot.mentions_anywhere(i))
                    .count();
                present >= *min
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierRule {
    pub name: &'static str,
    pub heuristic: Heuristic,
    pub state: PageState,
}

/// Ordered rule table; the first satisfied rule decides the page.
#[derive(Debug, Clone)]
pub struct PageClassifier {
    rules: Vec<ClassifierRule>,
}

impl PageClassifier {
    pub fn new(vocab: &PageVocabulary) -> Self {
        let rules = vec![
            ClassifierRule {
                name: "follow_toggles",
                heuristic: Heuristic::ClickableLabelCount {
                    labels: vec![vocab.follow_label.clone(), vocab.followed_label.clone()],
                    min: vocab.min_toggle_buttons,
                },
                state: PageState::FollowRecommendation,
            },
            ClassifierRule {
                name: "message_sections",
                heuristic: Heuristic::AnyPresent(vocab.message_sections.clone()),
                state: PageState::MessageCenter,
            },
            ClassifierRule {
                name: "home_navigation",
                heuristic: Heuristic::AllGroupsPresent(vec![
                    vocab.home_navigation.clone(),
                    vocab.messaging_entry.clone(),
                ]),
                state: PageState::Home,
            },
            ClassifierRule {
                name: "permission_indicators",
                heuristic: Heuristic::IndicatorCount {
                    indicators: vocab.permission_indicators.clone(),
                    min: vocab.permission_min_matches,
                },
                state: PageState::PermissionDialog,
            },
        ];

        Self { rules }
    }

    pub fn with_rules(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    pub fn classify(&self, snapshot: &Snapshot) -> PageState {
        self.matching_rule(snapshot)
            .map(|rule| rule.state)
            .unwrap_or(PageState::Unknown)
    }

    /// The rule that decided the classification, for diagnostics.
    pub fn matching_rule(&self, snapshot: &Snapshot) -> Option<&ClassifierRule> {
        self.rules.iter().find(|rule| rule.heuristic.holds(snapshot))
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new(&PageVocabulary::default())
    }
}

pub fn classify(snapshot: &Snapshot, vocab: &PageVocabulary) -> PageState {
    PageClassifier::new(vocab).classify(snapshot)
}
