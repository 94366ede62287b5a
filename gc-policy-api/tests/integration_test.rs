use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gc_policy_admin::InMemoryAdmin;
use gc_policy_api::{create_router, AppState};
use rstest::rstest;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

const FAMILY_URI: &str = "/api/instances/prod/tables/events/column-families/cf1/gc-policy";

fn app() -> Router {
    let admin = InMemoryAdmin::new();
    admin.create_table("prod", "events", ["cf1", "cf2"]).unwrap();
    create_router(Arc::new(AppState::with_admin(Arc::new(admin))))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, body)
}

mod api_health {
    use super::*;

    #[tokio::test]
    async fn it_returns_healthy_status() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}

mod build {
    use super::*;

    #[tokio::test]
    async fn it_renders_a_structured_union() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/build",
            Some(json!({
                "mode": "UNION",
                "max_age": { "days": 7 },
                "max_version": [{ "number": 3 }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rendered"], "(age() > 168h0m0s || versions() > 3)");
        assert_eq!(body["policy"]["combinator"]["mode"], "UNION");
    }

    #[tokio::test]
    async fn it_builds_from_gc_rules() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/build",
            Some(json!({
                "gc_rules": r#"{"rules":[{"max_age":"1h"},{"max_version":1}]}"#
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rendered"], "age() > 1h0m0s");
    }

    #[tokio::test]
    async fn it_rejects_two_rules_without_mode() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/build",
            Some(json!({
                "max_age": { "duration": "1h" },
                "max_version": [{ "number": 3 }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "config_error");
    }

    #[tokio::test]
    async fn it_rejects_malformed_durations() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/build",
            Some(json!({ "gc_rules": r#"{"rules":[{"max_age":"notaduration"}]}"# })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "parse_error");
        assert!(body["message"].as_str().unwrap().contains("notaduration"));
    }

    #[tokio::test]
    async fn it_rejects_gc_rules_mixed_with_structured_fields() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/build",
            Some(json!({ "mode": "UNION", "gc_rules": "{}" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "config_error");
    }

    #[rstest]
    #[case::both_age_forms(json!({ "max_age": { "days": 1, "duration": "24h" } }), "config_error")]
    #[case::gc_rules_with_max_age(
        json!({ "max_age": { "days": 1 }, "gc_rules": "{}" }),
        "config_error"
    )]
    #[case::unparseable_gc_rules(json!({ "gc_rules": "{not json" }), "parse_error")]
    #[case::empty_array_document(json!({ "gc_rules": "[]" }), "parse_error")]
    #[case::positional_document(
        json!({ "gc_rules": r#"[[{"max_version":1},{"max_version":2}],"union"]"# }),
        "parse_error"
    )]
    #[case::positional_rule_element(
        json!({ "gc_rules": r#"{"mode":"union","rules":[[null,null,"1h"]]}"# }),
        "parse_error"
    )]
    #[case::negative_version(json!({ "gc_rules": r#"{"rules":[{"max_version":-1}]}"# }), "parse_error")]
    #[case::bad_duration_literal(json!({ "max_age": { "duration": "7d" } }), "parse_error")]
    #[tokio::test]
    async fn it_rejects_invalid_configurations(#[case] request: Value, #[case] error: &str) {
        let (status, body) = send(&app(), "POST", "/api/gc-policies/build", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], error);
    }

    #[tokio::test]
    async fn it_builds_no_policy_from_a_null_document() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/build",
            Some(json!({ "gc_rules": "null" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["policy"], "no_policy");
    }
}

mod plan {
    use super::*;

    #[tokio::test]
    async fn it_suppresses_equal_days_to_duration_migration() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/plan",
            Some(json!({
                "days": { "old": 7, "new": 7 },
                "duration": { "old": "", "new": "168h" }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], json!(["days", "duration"]));
        assert_eq!(body["changed"], false);
    }

    #[tokio::test]
    async fn it_reports_a_real_change() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-policies/plan",
            Some(json!({
                "days": { "old": 7, "new": 7 },
                "duration": { "old": "", "new": "1h" }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], json!([]));
        assert_eq!(body["changed"], true);
    }
}

mod compare {
    use super::*;

    #[tokio::test]
    async fn it_treats_reformatted_rules_as_equivalent() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/gc-rules/compare",
            Some(json!({
                "old": r#"{"mode":"union","rules":[{"max_version":1}]}"#,
                "new": r#"{ "rules": [ { "max_version": 1 } ], "mode": "union" }"#
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["equivalent"], true);
        assert_eq!(body["normalized"], r#"{"mode":"union","rules":[{"max_version":1}]}"#);
    }
}

mod gc_policy_lifecycle {
    use super::*;

    #[tokio::test]
    async fn it_applies_reads_and_clears_a_policy() {
        let app = app();

        let (status, body) = send(
            &app,
            "PUT",
            FAMILY_URI,
            Some(json!({
                "mode": "INTERSECTION",
                "max_age": { "duration": "10h" },
                "max_version": [{ "number": 2 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "(age() > 10h0m0s && versions() > 2)");
        assert_eq!(body["instance_name"], "prod");
        assert_eq!(body["column_family"], "cf1");

        let (status, body) = send(&app, "GET", FAMILY_URI, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "(age() > 10h0m0s && versions() > 2)");

        let (status, _) = send(&app, "DELETE", FAMILY_URI, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", FAMILY_URI, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "");
    }

    #[tokio::test]
    async fn it_accepts_instance_self_links() {
        let (status, body) = send(
            &app(),
            "PUT",
            "/api/instances/projects%2Fp%2Finstances%2Fprod/tables/events/column-families/cf2/gc-policy",
            Some(json!({ "max_version": [{ "number": 5 }] })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["instance_name"], "prod");
        assert_eq!(body["id"], "versions() > 5");
    }

    #[tokio::test]
    async fn it_reports_missing_tables() {
        let (status, body) = send(
            &app(),
            "GET",
            "/api/instances/prod/tables/missing/column-families/cf1/gc-policy",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn it_does_not_apply_invalid_configurations() {
        let app = app();
        let (status, _) = send(
            &app,
            "PUT",
            FAMILY_URI,
            Some(json!({ "max_age": { "duration": "7d" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "GET", FAMILY_URI, None).await;
        assert_eq!(body["id"], "");
    }
}
