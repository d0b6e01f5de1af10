/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (store client, authorizer) → Router 組み立て
 * - axum::serve() で起動
 */
use anyhow::Result;
use axum::{Router, routing::get};
use std::{panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::{Config, StoreConfig};
use crate::middleware;
use crate::repos::user_repo::UserRepo;
use crate::services::authorizer::Authorizer;
use crate::services::cache::{CacheError, ValkeyClient};
use crate::state::AppState;

pub fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,api_authorizer=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        table = %config.store.user_table,
        "starting authorizer in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config.store)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the process-wide authorizer. The store connection is opened on the first lookup.
pub fn build_state(store: &StoreConfig) -> Result<AppState, CacheError> {
    let client = ValkeyClient::new(&store.valkey_url)?;
    let users = UserRepo::new(client, store.user_table.clone());
    tracing::debug!(backend = users.backend_name(), "user store configured");
    let authorizer = Authorizer::new(Arc::new(users));

    Ok(AppState::new(Arc::new(authorizer)))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderValue, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::services::authorizer::credential::encode_basic;
    use crate::services::cache::memory::MemoryClient;

    const RESOURCE: &str = "arn:aws:execute-api:eu-west-1:123456789012:api/prod/GET/nodes";

    fn app() -> (MemoryClient, Router) {
        let cache = MemoryClient::new();
        let users = UserRepo::new(cache.clone(), "users");
        let state = AppState::new(Arc::new(Authorizer::new(Arc::new(users))));
        cache.seed(
            "users:user1",
            r#"{"id":"user1","secret_keys":["{\"value\":\"secret\",\"disabled\":false}","{\"value\":\"old\",\"disabled\":true}"],"credits":5}"#,
        );
        (cache, build_router(state))
    }

    async fn call(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = router.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn authorize_event(event: Value) -> Request<Body> {
        Request::post("/api/v1/authorize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(event.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_, router) = app();
        let (status, body) = call(
            router,
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn authorize_allows_valid_credentials() {
        let (_, router) = app();
        let (status, body) = call(
            router,
            authorize_event(json!({
                "httpMethod": "GET",
                "path": "/nodes",
                "resourceIdentifier": RESOURCE,
                "headers": {"authorization": "Basic dXNlcjE6c2VjcmV0"}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "principalId": "user",
                "policy": {"effect": "Allow", "action": "execute-api:Invoke", "resource": RESOURCE},
                "context": {"user_id": "user1", "credits": 5}
            })
        );
    }

    #[tokio::test]
    async fn authorize_allows_anonymous_preflight_without_context() {
        let (_, router) = app();
        let (status, body) = call(
            router,
            authorize_event(json!({
                "httpMethod": "OPTIONS",
                "path": "/nodes",
                "methodArn": RESOURCE
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["policy"]["resource"], RESOURCE);
        assert_eq!(body["context"], json!({}));
    }

    #[tokio::test]
    async fn every_deny_looks_the_same() {
        let expected = json!({"error": {"code": "UNAUTHORIZED", "message": "Unauthorized"}});
        let cases = [
            json!({}),
            json!({"Authorization": "Bearer abc"}),
            json!({"Authorization": "Basic !!!"}),
            json!({"Authorization": encode_basic("ghost", "secret")}),
            json!({"Authorization": encode_basic("user1", "wrong")}),
            json!({"Authorization": encode_basic("user1", "old")}),
        ];

        for headers in cases {
            let (_, router) = app();
            let (status, body) = call(
                router,
                authorize_event(json!({
                    "httpMethod": "GET",
                    "path": "/nodes",
                    "resourceIdentifier": RESOURCE,
                    "headers": headers.clone()
                })),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{headers}");
            assert_eq!(body, expected, "{headers}");
        }
    }

    #[tokio::test]
    async fn store_outage_is_a_deny_not_a_server_error() {
        let (cache, router) = app();
        cache.fail_with("connection refused");

        let (status, _) = call(
            router,
            authorize_event(json!({
                "httpMethod": "GET",
                "path": "/nodes",
                "resourceIdentifier": RESOURCE,
                "headers": {"Authorization": "Basic dXNlcjE6c2VjcmV0"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_event_is_a_bad_request() {
        let (_, router) = app();
        let (status, body) = call(router, authorize_event(json!({"path": "/nodes"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_AUTHORIZER_EVENT");
    }

    #[tokio::test]
    async fn me_returns_the_caller_context() {
        let (_, router) = app();
        let (status, body) = call(
            router,
            Request::get("/api/v1/me")
                .header("AUTHORIZATION", "Basic dXNlcjE6c2VjcmV0")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"user_id": "user1", "credits": 5}));
    }

    #[tokio::test]
    async fn me_rejects_missing_credentials() {
        let (_, router) = app();
        let (status, body) = call(
            router,
            Request::get("/api/v1/me").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn anonymous_preflight_passes_the_middleware() {
        let (_, router) = app();
        let res = router
            .oneshot(
                Request::options("/api/v1/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn preflight_with_bad_credentials_is_denied() {
        let cases = [
            HeaderValue::from_static("Bearer abc"),
            HeaderValue::from_bytes(b"Basic \xffdXNlcjE6c2VjcmV0").unwrap(),
        ];

        for value in cases {
            let (_, router) = app();
            let (status, body) = call(
                router,
                Request::options("/api/v1/me")
                    .header(header::AUTHORIZATION, value.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{value:?}");
            assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn duplicate_authorization_keys_use_the_first_in_the_event() {
        // Raw body so the key order reaches the handler untouched.
        let event = |headers: &str| {
            Request::post("/api/v1/authorize")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"httpMethod":"GET","path":"/nodes","resourceIdentifier":"{RESOURCE}","headers":{headers}}}"#
                )))
                .unwrap()
        };

        for _ in 0..20 {
            let (_, router) = app();
            let (status, body) = call(
                router,
                event(r#"{"Authorization":"Basic dXNlcjE6c2VjcmV0","authorization":"Bearer junk"}"#),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["context"]["user_id"], "user1");

            let (_, router) = app();
            let (status, _) = call(
                router,
                event(r#"{"authorization":"Bearer junk","Authorization":"Basic dXNlcjE6c2VjcmV0"}"#),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn body_limit_is_one_mebibyte() {
        let (_, router) = app();
        let padded = json!({
            "httpMethod": "GET",
            "path": "/nodes",
            "resourceIdentifier": RESOURCE,
            "headers": {"Authorization": "Basic dXNlcjE6c2VjcmV0", "X-Pad": "a".repeat(200 * 1024)}
        });
        let (status, _) = call(router, authorize_event(padded)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, router) = app();
        let oversized = vec![b' '; 1024 * 1024 + 1];
        let res = router
            .oneshot(
                Request::post("/api/v1/authorize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, oversized.len())
                    .body(Body::from(oversized))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let (_, router) = app();
        let res = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }
}
