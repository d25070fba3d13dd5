//! Tests for response parsing

use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn chat_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

const FULL_RESULT: &str = r#"{
    "summary": "Hash join dominates.",
    "planQuality": {"rating": "critical", "rationale": ["stale stats"]},
    "findings": [{"title": "Skew", "severity": "warn", "detail": "5400 vs 2400", "evidence": "Hash Join"}],
    "recommendations": [{"action": "ANALYZE orders", "rationale": "refresh stats", "impact": "high"}],
    "indexHints": [{"table": "orders", "columns": ["customer_id"], "reason": "join key"}],
    "followUps": ["Check work_mem"],
    "sources": [{"title": "Tuning", "url": "https://example.com", "reason": "guide"}]
}"#;

mod extraction_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_object() {
        let object = extract_json_object(r#" {"summary": "ok"} "#).expect("object");
        assert_eq!(object.get("summary"), Some(&Value::from("ok")));
    }

    #[test]
    fn test_object_inside_prose_and_fences() {
        let content = indoc! {r#"
            Here is the analysis:
            ```json
            {"summary": "wrapped", "followUps": ["a"]}
            ```
            Let me know if you need more. {not json}
        "#};

        let object = extract_json_object(content).expect("object");
        assert_eq!(object.get("summary"), Some(&Value::from("wrapped")));
    }

    #[test]
    fn test_skips_broken_leading_braces() {
        let content = r#"{oops} then {"summary": "second"}"#;
        let object = extract_json_object(content).expect("object");
        assert_eq!(object.get("summary"), Some(&Value::from("second")));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_json_object(""), None);
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("[1, 2, 3]"), None);
    }
}

mod normalization_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_result() {
        let result = parse_chat_response(&chat_body(FULL_RESULT)).expect("parse");

        assert_eq!(result.summary, "Hash join dominates.");
        assert_eq!(result.plan_quality.rating, PlanQualityRating::Critical);
        assert_eq!(result.plan_quality.rationale, vec!["stale stats".to_string()]);
        assert_eq!(
            result.findings,
            vec![AiFinding {
                title: "Skew".into(),
                severity: InsightSeverity::Warn,
                detail: "5400 vs 2400".into(),
                evidence: Some("Hash Join".into()),
            }]
        );
        assert_eq!(result.recommendations[0].impact.as_deref(), Some("high"));
        assert_eq!(result.index_hints[0].columns, vec!["customer_id".to_string()]);
        assert_eq!(result.follow_ups, vec!["Check work_mem".to_string()]);
        assert_eq!(result.sources[0].url, "https://example.com");
    }

    #[test]
    fn test_gaps_get_defaults() {
        let content = r#"{
            "planQuality": {"rating": "excellent", "rationale": "not a list"},
            "findings": [{"severity": "fatal"}, "not an object"],
            "indexHints": [{"columns": "customer_id"}],
            "followUps": null
        }"#;

        let result = parse_insight_content(content).expect("parse");

        assert_eq!(result.summary, "");
        assert_eq!(result.plan_quality.rating, PlanQualityRating::NeedsAttention);
        assert!(result.plan_quality.rationale.is_empty());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].title, "Insight");
        assert_eq!(result.findings[0].severity, InsightSeverity::Info);
        assert_eq!(result.findings[0].evidence, None);
        assert!(result.index_hints[0].columns.is_empty());
        assert_eq!(result.index_hints[0].table, None);
        assert!(result.follow_ups.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_rating_names_match_serialized_form() {
        for rating in [
            PlanQualityRating::Good,
            PlanQualityRating::NeedsAttention,
            PlanQualityRating::Critical,
        ] {
            assert_eq!(serde_json::to_value(rating).unwrap(), rating.as_str());
            assert_eq!(PlanQualityRating::parse(rating.as_str()), rating);
        }
        assert_eq!(PlanQualityRating::NeedsAttention.as_str(), "needs_attention");
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(parse_insight_content("{}"), Ok(AiInsightResult::default()));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = parse_insight_content(FULL_RESULT).expect("parse");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["planQuality"]["rating"], "critical");
        assert_eq!(json["indexHints"][0]["table"], "orders");
        assert_eq!(json["followUps"][0], "Check work_mem");
        assert_eq!(json["findings"][0]["severity"], "warn");
    }
}

mod envelope_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_streamed_delta_content() {
        let body = r#"{"choices": [{"delta": {"content": "{\"summary\": \"streamed\"}"}}]}"#;
        let result = parse_chat_response(body).expect("parse");
        assert_eq!(result.summary, "streamed");
    }

    #[test]
    fn test_missing_content() {
        assert_eq!(
            parse_chat_response(r#"{"choices": []}"#),
            Err(AssistantError::MissingContent)
        );
        assert_eq!(
            parse_chat_response(&chat_body("   ")),
            Err(AssistantError::MissingContent)
        );
    }

    #[test]
    fn test_invalid_bodies() {
        assert!(matches!(
            parse_chat_response("<html>502</html>"),
            Err(AssistantError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_chat_response(&chat_body("I cannot help with that.")),
            Err(AssistantError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_message_content_prefers_message() {
        let body = r#"{"choices": [{"message": {"content": "full"}, "delta": {"content": "part"}}]}"#;
        assert_eq!(message_content(body).as_deref(), Ok("full"));
    }
}
