mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gate_audit::MemoryAuditLog;
use gate_bridge::testing::{TestServer, json_response, text_response};
use gate_kernel::GatewayBuilder;
use gate_policy::{CheckRequest, SecurityCheck, SecurityGate, codes};
use gate_primitives::{Secret, Skill, SkillId, SkillKind, SkillStatus};
use gate_registry::InMemoryRegistry;
use gate_tools::{InvocationContext, TurnCancellation};
use hyper::{Body, Response};
use serde_json::{Value, json};

use common::{assembler, loopback_config, server, skill, template_skill, tools_list};

struct DenyEverything;

#[async_trait]
impl SecurityGate for DenyEverything {
    async fn check(&self, _request: &CheckRequest) -> SecurityCheck {
        SecurityCheck::deny(codes::DOMAIN_BLOCKED, "domain not allowed")
    }
}

#[tokio::test]
async fn denied_call_never_reaches_upstream() {
    let upstream = TestServer::start(|_| async { text_response(200, "should not happen") });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(skill(SkillKind::Webhook, "notify", json!({"url": upstream.url("/hook")})))
        .await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = GatewayBuilder::new(loopback_config(), registry)
        .gate(Arc::new(DenyEverything))
        .audit(audit.clone())
        .build()
        .await
        .unwrap()
        .assemble(None)
        .await
        .unwrap();

    let out = tools
        .invoke("notify", &InvocationContext::new(), json!({"input": "ping"}))
        .await
        .unwrap();
    assert_eq!(out, json!({"error": "domain not allowed"}));
    assert!(upstream.requests().is_empty());

    let records = audit.invocations().await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_success());
    assert_eq!(records[0].security_check_result(), codes::DOMAIN_BLOCKED);
    assert_eq!(records[0].skill_type(), "webhook");
}

#[tokio::test]
async fn webhook_reply_is_capped_to_max_response_size() {
    let upstream = TestServer::start(|_| async { text_response(200, &"é".repeat(1_100)) });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(skill(
            SkillKind::Webhook,
            "long reply",
            json!({"url": upstream.url("/hook"), "maxResponseSize": 100}),
        ))
        .await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();
    let out = tools
        .invoke("long_reply", &InvocationContext::new(), json!({"input": "hello"}))
        .await
        .unwrap();
    assert_eq!(out, Value::String(format!("{}...[truncated]", "é".repeat(100))));

    let request = &upstream.requests()[0];
    assert_eq!(request.method, hyper::Method::POST);
    assert_eq!(request.headers.get("content-type").unwrap(), "application/json");
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({"input": "hello"}));

    let record = &audit.invocations().await[0];
    assert!(record.is_success());
    assert_eq!(record.skill_name(), "long reply");
    assert!(record.output().unwrap().ends_with("...[truncated]"));
}

#[tokio::test]
async fn secret_headers_are_substituted_before_dispatch() {
    let upstream = TestServer::start(|_| async { text_response(200, "ok") });
    let registry = Arc::new(InMemoryRegistry::new());
    let hook = skill(
        SkillKind::Webhook,
        "secured",
        json!({
            "url": upstream.url("/hook"),
            "headers": {"X-Key": "secret:apiKey", "Content-Type": "application/vnd.test+json"},
        }),
    );
    registry.put_secret(Secret::new(hook.id(), "apiKey", "abc123")).await;
    registry.upsert_skill(hook.clone()).await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();
    let out = tools
        .invoke("secured", &InvocationContext::new(), json!({"input": "x"}))
        .await
        .unwrap();
    assert_eq!(out, json!("ok"));

    let request = &upstream.requests()[0];
    assert_eq!(request.headers.get("x-key").unwrap(), "abc123");
    assert_eq!(
        request.headers.get("content-type").unwrap(),
        "application/vnd.test+json"
    );
    let sent: String = request
        .headers
        .values()
        .map(|value| value.to_str().unwrap_or_default().to_owned())
        .collect();
    assert!(!sent.contains("secret:"));
    assert!(!audit.invocations().await[0].input().contains("abc123"));
}

#[tokio::test]
async fn missing_secret_never_sends_placeholder() {
    let upstream = TestServer::start(|_| async { text_response(200, "ok") });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(skill(
            SkillKind::Webhook,
            "unsecured",
            json!({"url": upstream.url("/hook"), "headers": {"X-Key": "secret:absent"}}),
        ))
        .await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let out = tools
        .invoke("unsecured", &InvocationContext::new(), json!({"input": "x"}))
        .await
        .unwrap();
    assert!(out["error"].as_str().unwrap().contains("absent"));
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn redirects_fail_closed() {
    let target = TestServer::start(|_| async { text_response(200, "followed") });
    let location = target.url("/elsewhere");
    let upstream = TestServer::start(move |_| {
        let location = location.clone();
        async move {
            Response::builder()
                .status(302)
                .header("location", location)
                .body(Body::empty())
                .unwrap()
        }
    });

    let registry = Arc::new(InMemoryRegistry::new());
    let scraper = Skill::builder(SkillId::random(), SkillKind::Template)
        .name("scraper")
        .unwrap()
        .status(SkillStatus::Active)
        .approved(chrono::Utc::now())
        .template_id("web-scraper")
        .config(json!({"url": upstream.url("/page")}))
        .unwrap()
        .build()
        .unwrap();
    registry.upsert_skill(scraper).await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();
    let out = tools
        .invoke("scraper", &InvocationContext::new(), json!({"input": ""}))
        .await
        .unwrap();
    assert!(out["error"].is_string());
    assert!(target.requests().is_empty());
    assert!(!audit.invocations().await[0].is_success());
}

#[tokio::test]
async fn non_success_webhook_status_is_reported() {
    let upstream = TestServer::start(|_| async { text_response(502, "bad gateway") });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(skill(SkillKind::Webhook, "flaky", json!({"url": upstream.url("/")})))
        .await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let out = tools
        .invoke("flaky", &InvocationContext::new(), json!({"input": "x"}))
        .await
        .unwrap();
    assert_eq!(out, json!({"error": "webhook failed: 502"}));
}

#[tokio::test]
async fn skill_timeout_becomes_deadline() {
    let upstream = TestServer::start(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        text_response(200, "late")
    });
    let registry = Arc::new(InMemoryRegistry::new());
    let slow = Skill::builder(SkillId::random(), SkillKind::Webhook)
        .name("slow")
        .unwrap()
        .status(SkillStatus::Active)
        .approved(chrono::Utc::now())
        .timeout_ms(100)
        .config(json!({"url": upstream.url("/")}))
        .unwrap()
        .build()
        .unwrap();
    registry.upsert_skill(slow).await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let started = std::time::Instant::now();
    let out = tools
        .invoke("slow", &InvocationContext::new(), json!({"input": "x"}))
        .await
        .unwrap();
    assert!(out["error"].is_string());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn cancelled_turn_aborts_remote_call() {
    let upstream = TestServer::start(|request| async move {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        if body["method"] == "tools/list" {
            return json_response(200, &tools_list(&["slow_tool"]));
        }
        tokio::time::sleep(Duration::from_secs(10)).await;
        json_response(200, &json!({"result": "late"}))
    });
    let registry = Arc::new(InMemoryRegistry::new());
    registry.upsert_server(server("slow", &upstream.url("/"))).await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();

    let turn = TurnCancellation::new();
    let context = InvocationContext::new().with_cancel(turn.token());
    let call = tools.invoke("slow_tool", &context, json!({}));
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        turn.cancel();
    };
    let (out, ()) = tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(call, cancel) })
        .await
        .expect("cancellation is prompt");

    assert_eq!(out.unwrap(), json!({"error": "invocation cancelled"}));
    let records = audit.invocations().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].skill_type(), "mcp");
}

#[tokio::test]
async fn remote_calls_return_result_member() {
    let upstream = TestServer::start(|request| async move {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        match body["method"].as_str() {
            Some("tools/list") => json_response(200, &tools_list(&["lookup"])),
            _ => json_response(
                200,
                &json!({"jsonrpc": "2.0", "id": 1, "result": {"echo": body["params"]}}),
            ),
        }
    });
    let registry = Arc::new(InMemoryRegistry::new());
    registry.upsert_server(server("kb", &upstream.url("/rpc"))).await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let out = tools
        .invoke("lookup", &InvocationContext::new(), json!({"q": "rust"}))
        .await
        .unwrap();
    assert_eq!(
        out,
        json!({"echo": {"name": "lookup", "arguments": {"q": "rust"}}})
    );
}

#[tokio::test]
async fn rate_budget_applies_per_skill() {
    let registry = Arc::new(InMemoryRegistry::new());
    let limited = Skill::builder(SkillId::random(), SkillKind::Code)
        .name("limited")
        .unwrap()
        .status(SkillStatus::Active)
        .approved(chrono::Utc::now())
        .rate_limit_per_minute(1)
        .build()
        .unwrap();
    registry.upsert_skill(limited).await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();
    let context = InvocationContext::new();

    let first = tools.invoke("limited", &context, json!({"query": "a"})).await.unwrap();
    assert!(first.get("result").is_some());
    let second = tools.invoke("limited", &context, json!({"query": "b"})).await.unwrap();
    assert!(second.get("error").is_some());

    let records = audit.invocations().await;
    assert_eq!(records[1].security_check_result(), codes::RATE_LIMITED);
}

#[tokio::test]
async fn unknown_template_is_audited_as_failure() {
    let registry = Arc::new(InMemoryRegistry::new());
    let odd = Skill::builder(SkillId::random(), SkillKind::Template)
        .name("odd")
        .unwrap()
        .status(SkillStatus::Active)
        .approved(chrono::Utc::now())
        .template_id("teleporter")
        .build()
        .unwrap();
    registry.upsert_skill(odd).await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();
    let out = tools
        .invoke("odd", &InvocationContext::new(), json!({"input": "x"}))
        .await
        .unwrap();
    assert_eq!(out, json!({"error": "Unknown template: teleporter"}));
    let record = &audit.invocations().await[0];
    assert_eq!(record.security_check_result(), codes::PASSED);
    assert_eq!(record.error_message(), Some("Unknown template: teleporter"));
}

#[tokio::test]
async fn api_caller_defaults_to_get_with_resolved_headers() {
    let upstream = TestServer::start(|_| async { text_response(200, "sunny") });
    let registry = Arc::new(InMemoryRegistry::new());
    let weather = template_skill(
        "weather",
        "api-caller",
        json!({"url": upstream.url("/forecast?city=oslo"), "headers": {"Authorization": "secret:token"}}),
    );
    registry.put_secret(Secret::new(weather.id(), "token", "Bearer t0k")).await;
    registry.upsert_skill(weather).await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let out = tools
        .invoke("weather", &InvocationContext::new(), json!({"input": "ignored for GET"}))
        .await
        .unwrap();
    assert_eq!(out, json!("sunny"));

    let request = &upstream.requests()[0];
    assert_eq!(request.method, hyper::Method::GET);
    assert_eq!(request.path, "/forecast?city=oslo");
    assert_eq!(request.headers.get("authorization").unwrap(), "Bearer t0k");
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn api_caller_posts_raw_input() {
    let upstream = TestServer::start(|_| async { text_response(201, "stored") });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(template_skill(
            "store",
            "api-caller",
            json!({"url": upstream.url("/items"), "method": "post"}),
        ))
        .await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let out = tools
        .invoke("store", &InvocationContext::new(), json!({"input": "name=widget&qty=3"}))
        .await
        .unwrap();
    assert_eq!(out, json!("stored"));

    let request = &upstream.requests()[0];
    assert_eq!(request.method, hyper::Method::POST);
    assert_eq!(&request.body[..], b"name=widget&qty=3");
}

#[tokio::test]
async fn template_fetch_failures_name_the_routine() {
    let upstream = TestServer::start(|_| async { text_response(404, "missing") });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(template_skill("api", "api-caller", json!({"url": upstream.url("/a")})))
        .await;
    registry
        .upsert_skill(template_skill("feed", "rss-fetcher", json!({"url": upstream.url("/rss")})))
        .await;

    let audit = Arc::new(MemoryAuditLog::new());
    let tools = assembler(registry, audit.clone()).await.assemble(None).await.unwrap();
    let context = InvocationContext::new();

    let api = tools.invoke("api", &context, json!({"input": "x"})).await.unwrap();
    assert_eq!(api, json!({"error": "API call failed: 404"}));
    let feed = tools.invoke("feed", &context, json!({"input": "x"})).await.unwrap();
    assert_eq!(feed, json!({"error": "RSS fetch failed: 404"}));

    let records = audit.invocations().await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| !record.is_success()));
}

#[tokio::test]
async fn rss_fetcher_gets_feed_capped_to_template_limit() {
    let upstream = TestServer::start(|_| async { text_response(200, &"<item/>".repeat(2_000)) });
    let registry = Arc::new(InMemoryRegistry::new());
    registry
        .upsert_skill(template_skill("news", "rss-fetcher", json!({"url": upstream.url("/feed.xml")})))
        .await;

    let tools = assembler(registry, Arc::new(MemoryAuditLog::new()))
        .await
        .assemble(None)
        .await
        .unwrap();
    let out = tools
        .invoke("news", &InvocationContext::new(), json!({"input": "latest"}))
        .await
        .unwrap();

    let text = out.as_str().unwrap();
    assert!(text.ends_with("...[truncated]"));
    assert_eq!(text.chars().count(), 10_000 + "...[truncated]".len());
    let request = &upstream.requests()[0];
    assert_eq!(request.method, hyper::Method::GET);
    assert_eq!(request.path, "/feed.xml");
}
