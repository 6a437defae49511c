use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::screen::{classifier::PageState, screen_model::Point};

/// One executed action, as written to the JSONL trace file.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: u64,

    pub kind: String,

    pub x: Option<i32>,
    pub y: Option<i32>,

    pub page_state: Option<String>,
    pub verified: Option<bool>,
    pub polls: Option<u32>,

    pub fingerprint: Option<String>,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(step: u64, kind: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            step,
            kind: kind.to_string(),
            x: None,
            y: None,
            page_state: None,
            verified: None,
            polls: None,
            fingerprint: None,
            detail: None,
        }
    }

    pub fn with_point(mut self, point: Point) -> Self {
        self.x = Some(point.x);
        self.y = Some(point.y);
        self
    }

    pub fn with_page(mut self, state: PageState) -> Self {
        self.page_state = Some(format!("{:?}", state));
        self
    }

    pub fn with_verification(mut self, verified: bool, polls: u32) -> Self {
        self.verified = Some(verified);
        self.polls = Some(polls);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Option<&str>) -> Self {
        self.fingerprint = fingerprint.map(str::to_string);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
