//! MQTT topic helpers for the thing-update hierarchy.
//!
//! Topic structure:
//! ```text
//! thing-update/{thing_name}
//! thing-update/{thing_name}/{sub/path...}
//! ```

const PREFIX: &str = "thing-update";

/// Wildcard filter the device subscribes to.
pub const THING_UPDATE_FILTER: &str = "thing-update/#";

pub fn thing_update(thing_name: &str) -> String {
    format!("{PREFIX}/{thing_name}")
}

// ─── Topic parsing ───

/// Parsed thing-update topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTopic {
    pub thing_name: String,
    /// Remaining levels after the thing name, joined with `/`. Empty when absent.
    pub rest: String,
}

/// Parse a `thing-update/...` topic.
/// Returns `None` for other prefixes or when the thing name is missing.
pub fn parse_topic(topic: &str) -> Option<ParsedTopic> {
    let mut parts = topic.splitn(3, '/');

    if parts.next() != Some(PREFIX) {
        return None;
    }

    let thing_name = parts.next().filter(|s| !s.is_empty())?;
    let rest = parts.next().unwrap_or_default();

    Some(ParsedTopic {
        thing_name: thing_name.to_string(),
        rest: rest.to_string(),
    })
}

/// MQTT topic filter matching (`+` single level, `#` trailing multi level).
pub fn matches_filter(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
