//! Tolerant line-oriented log parser.
//!
//! Each non-blank line is one JSON event. A line that is not valid JSON or
//! lacks a required field is counted in [`ParseResult::skipped`] and parsing
//! carries on with the next line.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::event::Event;

/// Output of a parse pass.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Valid events in line order.
    pub events: Vec<Event>,
    /// Non-blank lines that failed to parse.
    pub skipped: usize,
    /// Wall time spent parsing.
    pub elapsed: Duration,
}

impl ParseResult {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Parses every line of `content`.
pub fn parse(content: &str) -> ParseResult {
    parse_filtered(content, |_| true)
}

/// Parses every line of `content`, keeping only events past the watermark.
///
/// The whole text is still parsed (a re-read file contains the old lines too),
/// so `skipped` counts malformed lines anywhere in the content.
pub fn parse_incremental(content: &str, since_log_seq: i64) -> ParseResult {
    parse_filtered(content, |event| event.log_seq > since_log_seq)
}

fn parse_filtered(content: &str, keep: impl Fn(&Event) -> bool) -> ParseResult {
    let started = Instant::now();
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Only objects are records; a bare array would otherwise deserialize positionally.
        if !line.starts_with('{') {
            skipped += 1;
            continue;
        }

        // Through `Value` first: a repeated key keeps its last value instead of failing.
        let parsed = serde_json::from_str::<Value>(line).and_then(serde_json::from_value::<Event>);
        match parsed {
            Ok(event) if keep(&event) => events.push(event),
            Ok(_) => {}
            Err(_) => skipped += 1,
        }
    }

    ParseResult {
        events,
        skipped,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    const GOOD_1: &str =
        r#"{"log_seq":1,"timestamp":"2025-01-15T09:00:00Z","agent":"dev","action":"START"}"#;
    const GOOD_2: &str =
        r#"{"log_seq":2,"timestamp":"2025-01-15T09:05:00Z","agent":"dev","action":"COMPLETE"}"#;
    const GOOD_3: &str =
        r#"{"log_seq":3,"timestamp":"2025-01-15T09:06:00Z","agent":"qa","action":"START"}"#;

    #[test]
    fn parses_valid_lines_in_order() {
        let content = format!("{GOOD_1}\n{GOOD_2}\n{GOOD_3}\n");
        let result = parse(&content);

        assert_eq!(result.skipped, 0);
        let seqs: Vec<i64> = result.events.iter().map(|e| e.log_seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn malformed_lines_are_counted_not_fatal() {
        let content = [
            GOOD_1,
            "not json at all",
            r#"{"log_seq":9,"timestamp":"t","agent":"dev"}"#,
            r#"{"log_seq":10,"timestamp":null,"agent":"dev","action":"START"}"#,
            "[1, 2, 3]",
            GOOD_2,
        ]
        .join("\n");
        let result = parse(&content);

        assert_eq!(result.skipped, 4);
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[1].log_seq, 2);
    }

    #[test]
    fn blank_lines_are_not_skips() {
        let content = format!("\n   \n{GOOD_1}\n\t\n\n{GOOD_2}\n\n");
        let result = parse(&content);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.events.len(), 2);
    }

    #[test]
    fn handles_crlf_and_missing_trailing_newline() {
        let content = format!("{GOOD_1}\r\n{GOOD_2}");
        let result = parse(&content);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.events.len(), 2);
    }

    #[test]
    fn incremental_keeps_only_past_watermark() {
        let content = format!("{GOOD_1}\n{GOOD_2}\n{GOOD_3}\n");
        let result = parse_incremental(&content, 1);
        let seqs: Vec<i64> = result.events.iter().map(|e| e.log_seq).collect();
        assert_eq!(seqs, vec![2, 3]);

        let none = parse_incremental(&content, 3);
        assert!(none.events.is_empty());
    }

    #[test]
    fn scalar_required_fields_are_kept_as_text() {
        let content = [
            r#"{"log_seq":1,"timestamp":1736931600000,"agent":"dev","action":"START"}"#,
            r#"{"log_seq":2,"timestamp":"2025-01-15T09:05:00Z","agent":7,"action":"COMPLETE"}"#,
        ]
        .join("\n");
        let result = parse(&content);

        assert_eq!(result.skipped, 0);
        assert_eq!(result.events[0].timestamp, "1736931600000");
        assert_eq!(result.events[1].agent, "7");
        assert_eq!(result.events[1].action, crate::action::Action::Complete);
    }

    #[test]
    fn null_agent_or_action_is_skipped() {
        let content = [
            r#"{"log_seq":1,"timestamp":"t","agent":null,"action":"START"}"#,
            r#"{"log_seq":2,"timestamp":"t","agent":"dev","action":null}"#,
        ]
        .join("\n");
        let result = parse(&content);
        assert_eq!(result.skipped, 2);
        assert!(result.events.is_empty());
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let line = r#"{"log_seq":1,"timestamp":"t","agent":"dev","action":"START","phase":"design","phase":"review"}"#;
        let result = parse(line);

        assert_eq!(result.skipped, 0);
        assert_eq!(result.events[0].phase, "review");
    }

    #[test]
    fn empty_content() {
        let result = parse("");
        assert!(result.events.is_empty());
        assert_eq!(result.skipped, 0);
    }

    fn arb_line() -> impl Strategy<Value = String> {
        prop_oneof![
            (0i64..50, "[a-c]").prop_map(|(seq, agent)| format!(
                r#"{{"log_seq":{seq},"timestamp":"2025-01-15T09:00:00Z","agent":"{agent}","action":"START"}}"#
            )),
            Just("{broken".to_string()),
            Just(r#"{"log_seq":1}"#.to_string()),
            Just("   ".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_skip_count_matches_bad_lines(lines in prop::collection::vec(arb_line(), 0..40)) {
            let content = lines.join("\n");
            let result = parse(&content);
            let blank = lines.iter().filter(|l| l.trim().is_empty()).count();
            prop_assert_eq!(result.events.len() + result.skipped + blank, lines.len());
        }

        #[test]
        fn prop_incremental_is_filtered_full_parse(
            lines in prop::collection::vec(arb_line(), 0..40),
            watermark in -1i64..55,
        ) {
            let content = lines.join("\n");
            let full: Vec<Event> = parse(&content)
                .events
                .into_iter()
                .filter(|e| e.log_seq > watermark)
                .collect();
            prop_assert_eq!(parse_incremental(&content, watermark).events, full);
        }
    }
}
