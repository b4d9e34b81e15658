use crate::entities::FrictionPayload;
use crate::value_objects::{clamp_severity, SEVERITY_MAX};

/// Deterministic friction severity heuristic. Base score from the event
/// type, additive modifiers for fatal error messages and form/submit
/// selectors, clamped to [0,100]. Pure so it can be tested by table.
pub fn score(payload: &FrictionPayload) -> u8 {
    let mut total = base_score(&payload.event_type);

    if let Some(message) = &payload.error_message {
        let lowered = message.to_lowercase();
        if lowered.contains("fatal") || lowered.contains("critical") {
            total += 20;
        }
    }

    if let Some(selector) = &payload.element_selector {
        if is_form_selector(selector) {
            total += 15;
        }
    }

    clamp_severity(total.min(SEVERITY_MAX))
}

fn base_score(event_type: &str) -> u32 {
    match event_type {
        "error" => 80,
        "timeout" => 70,
        "failed_validation" => 60,
        "multiple_attempts" => 50,
        "slow_response" => 40,
        "confusion" => 30,
        "hesitation" => 20,
        _ => 10,
    }
}

/// Matches selectors pointing at submit buttons or form controls, where
/// friction hurts conversion the most.
fn is_form_selector(selector: &str) -> bool {
    let lowered = selector.to_lowercase();
    lowered.contains("submit") || lowered.contains("form") || lowered.contains("button[type=")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(
        event_type: &str,
        error_message: Option<&str>,
        element_selector: Option<&str>,
    ) -> FrictionPayload {
        FrictionPayload {
            event_type: event_type.to_string(),
            error_message: error_message.map(ToString::to_string),
            element_selector: element_selector.map(ToString::to_string),
            ..FrictionPayload::default()
        }
    }

    #[test]
    fn base_table_scores_without_modifiers() {
        let cases = [
            ("error", 80),
            ("timeout", 70),
            ("failed_validation", 60),
            ("multiple_attempts", 50),
            ("slow_response", 40),
            ("confusion", 30),
            ("hesitation", 20),
            ("unheard_of", 10),
        ];
        for (event_type, expected) in cases {
            assert_eq!(score(&payload(event_type, None, None)), expected);
        }
    }

    #[test]
    fn fatal_or_critical_error_message_adds_twenty() {
        assert_eq!(score(&payload("timeout", Some("FATAL failure"), None)), 90);
        assert_eq!(
            score(&payload("hesitation", Some("critical path blocked"), None)),
            40
        );
        assert_eq!(score(&payload("timeout", Some("mild hiccup"), None)), 70);
    }

    #[test]
    fn form_selector_adds_fifteen() {
        assert_eq!(
            score(&payload("confusion", None, Some("form#signup input"))),
            45
        );
        assert_eq!(
            score(&payload("confusion", None, Some("div.sidebar a"))),
            30
        );
    }

    #[test]
    fn stacked_modifiers_clamp_at_one_hundred() {
        let scored = score(&payload(
            "error",
            Some("FATAL failure"),
            Some("form#checkout button[type=submit]"),
        ));
        assert_eq!(scored, 100);
    }
}
