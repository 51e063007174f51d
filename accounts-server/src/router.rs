use crate::handlers;
use crate::state::State;
use accounts_core::api::{login, register};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::AUTHORIZATION, StatusCode},
    routing::{get, post},
    Router,
};
use std::{iter::once, time::Duration};
use tower_http::{compression, decompression, limit, sensitive_headers, timeout, trace};

/// Build the app: routes, then the middleware that wraps all of them.
pub fn app(state: State, body_limit: usize, request_timeout: Duration) -> Router {
    Router::new()
        // ROUTES
        .route("/health", get(handlers::health::handler))
        .route(
            register::PATH,
            post(handlers::register::create).get(handlers::register::fetch),
        )
        .route(login::PATH, post(handlers::login::handler))
        // MIDDLEWARE
        .layer(timeout::TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        // axum's own 2 MiB extractor limit would otherwise win over ours
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(limit::RequestBodyLimitLayer::new(body_limit))
        .layer(decompression::RequestDecompressionLayer::new())
        .layer(compression::CompressionLayer::new())
        .layer(sensitive_headers::SetSensitiveHeadersLayer::new(once(
            AUTHORIZATION,
        )))
        .layer(trace::TraceLayer::new_for_http())
        // STATE
        .with_state(state)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repo::MemoryRepository;
    use accounts_core::api::{self, Envelope};
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tower::ServiceExt; // for `oneshot`

    /// "not very secret", base64 encoded
    const SECRET: &str = "bm90IHZlcnkgc2VjcmV0";

    const MIB: usize = 1024 * 1024;

    fn app_with_limit(body_limit: usize) -> Router {
        let state = State::new(
            Arc::new(MemoryRepository::default()),
            SECRET,
            chrono::Duration::days(1),
        )
        .unwrap();

        app(state, body_limit, Duration::from_secs(5))
    }

    fn test_app() -> Router {
        app_with_limit(MIB)
    }

    /// A valid registration padded out to roughly `size` bytes with a field
    /// the validator ignores.
    fn padded_registration(size: usize) -> String {
        json!({
            "email": "a@x.com",
            "password": "p1",
            "password2": "p1",
            "padding": "x".repeat(size),
        })
        .to_string()
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::post(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn envelope(resp: Response) -> (StatusCode, Envelope) {
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test_log::test(tokio::test)]
    async fn test_register_twice() {
        let app = test_app();
        let body = r#"{"email":"a@x.com","password":"p1","password2":"p1"}"#;

        let (status, first) =
            envelope(app.clone().oneshot(post_json(register::PATH, body)).await.unwrap()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first.status, 201);
        assert_eq!(first.message, "User registered successfully");
        assert_eq!(first.data["email"], "a@x.com");
        assert!(first.data["date_joined"].is_string());
        assert_eq!(first.data.as_object().unwrap().len(), 2);

        let (status, second) =
            envelope(app.oneshot(post_json(register::PATH, body)).await.unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            second,
            Envelope::new(
                400,
                "Validation error",
                json!({"message": "Email already exists"})
            )
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_register_field_errors() {
        let (status, resp) = envelope(
            test_app()
                .oneshot(post_json(register::PATH, r#"{"email":"a@x.com"}"#))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.message, "Registration failed");
        assert_eq!(
            resp.data,
            json!({
                "password": ["This field is required."],
                "password2": ["This field is required."],
            })
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_register_unparseable_body() {
        let (status, resp) = envelope(
            test_app()
                .oneshot(post_json(register::PATH, "{not json"))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.message, "Registration failed");
        assert!(resp.data["non_field_errors"][0]
            .as_str()
            .unwrap()
            .starts_with("JSON parse error"));
    }

    #[test_log::test(tokio::test)]
    async fn test_register_body_over_limit() {
        let (status, resp) = envelope(
            test_app()
                .oneshot(post_json(register::PATH, &padded_registration(2 * MIB)))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(resp.status, 413);
        assert!(resp.data.get("non_field_errors").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_register_body_limit_above_axum_default() {
        let (status, resp) = envelope(
            app_with_limit(5 * MIB)
                .oneshot(post_json(register::PATH, &padded_registration(3 * MIB)))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resp.data["email"], "a@x.com");
    }

    #[test_log::test(tokio::test)]
    async fn test_register_without_content_type() {
        let req = Request::post(register::PATH)
            .body(Body::from(padded_registration(0)))
            .unwrap();

        let (status, resp) = envelope(test_app().oneshot(req).await.unwrap()).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(resp.status, 415);
        assert_eq!(resp.data, json!({}));
    }

    #[test_log::test(tokio::test)]
    async fn test_fetch_not_authenticated() {
        let (status, resp) = envelope(
            test_app()
                .oneshot(Request::get(register::PATH).body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(resp, Envelope::empty(403, "Not Authenticated!"));
    }

    #[test_log::test(tokio::test)]
    async fn test_fetch_garbage_token() {
        let req = Request::get(register::PATH)
            .header(AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();

        let (_, resp) = envelope(test_app().oneshot(req).await.unwrap()).await;

        assert_eq!(resp.status, 403);
        assert_eq!(resp.data, json!({}));
    }

    #[test_log::test(tokio::test)]
    async fn test_health() {
        let resp = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_client_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, test_app()).await });

        let http = reqwest::Client::new();
        let mut client = api::Client::new(format!("http://{address}"));

        let registered = client
            .register(
                &http,
                &register::Req {
                    email: "a@x.com".to_string(),
                    password: "p1".to_string(),
                    password2: "p1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(registered.email, "a@x.com");

        let mismatch = client
            .register(
                &http,
                &register::Req {
                    email: "b@x.com".to_string(),
                    password: "p1".to_string(),
                    password2: "p2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            mismatch,
            api::Error::Client { status: 400, ref data, .. }
                if *data == json!({"password": "Password mismatch"})
        ));

        client
            .login(
                &http,
                &login::Req {
                    email: "a@x.com".to_string(),
                    password: "p1".to_string(),
                },
            )
            .await
            .unwrap();

        let account = client.account(&http).await.unwrap();
        assert_eq!(account, registered);
    }
}
