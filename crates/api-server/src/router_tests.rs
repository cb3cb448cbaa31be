#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::directory::{
        InMemoryDirectory, Role, User, DEMO_PASSWORD, DEMO_PATIENT_EMAIL,
    };
    use crate::password::PasswordHash;
    use crate::{build_router, AppState};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        test_app_with(ServerConfig::default())
    }

    fn test_app_with(config: ServerConfig) -> Router {
        let state = AppState::new(config, Arc::new(InMemoryDirectory::with_demo_data()));
        build_router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            post_json(
                "/api/login",
                json!({"email": DEMO_PATIENT_EMAIL, "password": DEMO_PASSWORD}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn scenario_body() -> Value {
        json!({
            "age": 65, "sex": 1, "cp": 0, "trestbps": 150, "chol": 260, "fbs": 1,
            "restecg": 2, "thalach": 90, "exang": 1, "oldpeak": 3.5, "slope": 0,
            "ca": 2, "thal": 3
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_login_then_predict() {
        let app = test_app();
        let token = login(&app).await;

        let (status, body) = send(&app, post_json("/api/predict", scenario_body(), Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "High Risk");
        assert_eq!(body["probability"], 93);
        assert_eq!(body["riskScore"], 135);
        assert_eq!(body["factors"]["sex"], "Male");
        assert_eq!(body["factors"]["chestPainType"], "Typical Angina");
        assert_eq!(body["keyRiskFactors"].as_array().unwrap().len(), 7);
        assert_eq!(
            body["message"],
            "Based on the provided data, the patient has high risk of heart disease."
        );
    }

    #[tokio::test]
    async fn test_predict_accepts_form_strings() {
        let app = test_app();
        let token = login(&app).await;
        let body = json!({
            "age": "45", "sex": "1", "cp": "2", "trestbps": "130", "chol": "210",
            "fbs": "0", "restecg": "0", "thalach": "160", "exang": "0",
            "oldpeak": "0.5", "slope": "2", "ca": "0", "thal": "0"
        });

        let (status, body) = send(&app, post_json("/api/predict", body, Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Low Risk");
        assert_eq!(body["probability"], 33);
        assert_eq!(body["keyRiskFactors"][0], "No major risk factors identified");
    }

    #[tokio::test]
    async fn test_predict_requires_token() {
        let app = test_app();
        let (status, body) = send(&app, post_json("/api/predict", scenario_body(), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access denied. No token provided.");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_predict_rejects_unknown_token() {
        let app = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/predict", scenario_body(), Some("forged-token-value")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid token.");
    }

    #[tokio::test]
    async fn test_predict_rejects_missing_field() {
        let app = test_app();
        let token = login(&app).await;
        let mut body = scenario_body();
        body.as_object_mut().unwrap().remove("oldpeak");

        let (status, body) = send(&app, post_json("/api/predict", body, Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: oldpeak is required");
    }

    #[tokio::test]
    async fn test_predict_rejects_non_numeric_field() {
        let app = test_app();
        let token = login(&app).await;
        let mut body = scenario_body();
        body["chol"] = json!("high");

        let (status, body) = send(&app, post_json("/api/predict", body, Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: chol must be a number");
    }

    #[tokio::test]
    async fn test_predict_rejects_malformed_json() {
        let app = test_app();
        let token = login(&app).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = test_app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/login",
                json!({"email": DEMO_PATIENT_EMAIL, "password": "nope"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = test_app();
        let (status, body) = send(&app, post_json("/api/login", json!({"email": ""}), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and password are required.");
    }

    #[tokio::test]
    async fn test_repeated_failed_logins_lock_out() {
        let app = test_app_with(ServerConfig {
            auth_max_failures: 2,
            ..ServerConfig::default()
        });
        let bad = json!({"email": DEMO_PATIENT_EMAIL, "password": "nope"});
        for _ in 0..2 {
            let (status, _) = send(&app, post_json("/api/login", bad.clone(), None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let good = json!({"email": DEMO_PATIENT_EMAIL, "password": DEMO_PASSWORD});
        let (status, _) = send(&app, post_json("/api/login", good, None)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_valid_token_does_not_reset_login_failures() {
        let app = test_app_with(ServerConfig {
            auth_max_failures: 2,
            ..ServerConfig::default()
        });
        let token = login(&app).await;
        let bad = json!({"email": DEMO_PATIENT_EMAIL, "password": "nope"});

        let (status, _) = send(&app, post_json("/api/login", bad.clone(), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/user", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, post_json("/api/login", bad, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let good = json!({"email": DEMO_PATIENT_EMAIL, "password": DEMO_PASSWORD});
        let (status, body) = send(&app, post_json("/api/login", good, None)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_current_user_missing_account() {
        let state = AppState::new(
            ServerConfig::default(),
            Arc::new(InMemoryDirectory::with_demo_data()),
        );
        let ghost = User {
            id: 999,
            name: "Ghost".to_string(),
            email: "ghost@example.com".to_string(),
            password: PasswordHash::new("pw"),
            role: Role::Patient,
        };
        let token = state.sessions.issue(&ghost);
        let app = build_router(state);

        let (status, body) = send(&app, get("/api/user", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found.");
    }

    #[tokio::test]
    async fn test_signup_and_login_new_account() {
        let app = test_app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/signup",
                json!({"name": "Alice", "email": "alice@example.com", "password": "pw12345", "role": "employee"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Signup successful!");
        assert_eq!(body["user"]["id"], 3);
        assert_eq!(body["user"]["role"], "employee");
        assert!(body["user"].get("password").is_none());

        let (status, body) = send(
            &app,
            post_json(
                "/api/login",
                json!({"email": "alice@example.com", "password": "pw12345"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful!");
        assert_eq!(body["user"]["name"], "Alice");
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let app = test_app();

        let (status, body) = send(
            &app,
            post_json("/api/signup", json!({"name": "Alice", "email": "a@b.c"}), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required.");

        let (status, body) = send(
            &app,
            post_json(
                "/api/signup",
                json!({"name": "Alice", "email": "a@b.c", "password": "pw", "role": "admin"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], r#"Role must be either "patient" or "employee"."#);

        let (status, body) = send(
            &app,
            post_json(
                "/api/signup",
                json!({"name": "Dup", "email": DEMO_PATIENT_EMAIL, "password": "pw", "role": "patient"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User with this email already exists.");
    }

    #[tokio::test]
    async fn test_current_user_and_listings() {
        let app = test_app();
        let token = login(&app).await;

        let (status, body) = send(&app, get("/api/user", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], DEMO_PATIENT_EMAIL);
        assert_eq!(body["role"], "patient");

        let (status, body) = send(&app, get("/api/patients", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[1]["diagnosis"], "High Risk");

        let (status, body) = send(&app, get("/api/employees", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[2]["name"], "Nurse Sarah");

        let (status, _) = send(&app, get("/api/patients", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = test_app();
        let token = login(&app).await;

        let (status, _) = send(&app, post_json("/api/logout", json!({}), Some(&token))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, get("/api/user", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let app = test_app_with(ServerConfig {
            session_ttl: chrono::Duration::seconds(-1),
            ..ServerConfig::default()
        });
        let token = login(&app).await;
        let (status, _) = send(&app, get("/api/user", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_static_index_and_headers() {
        let app = test_app();
        let response = app.clone().oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert_eq!(
            headers["content-security-policy"],
            "default-src 'self'; frame-ancestors 'none'"
        );
        assert!(headers.get("x-request-id").is_some());
        assert!(headers.get("cache-control").is_none());
    }

    #[tokio::test]
    async fn test_api_headers() {
        let app = test_app_with(ServerConfig {
            enable_hsts: true,
            ..ServerConfig::default()
        });
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-123");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().get("strict-transport-security").is_some());

        let response = app.clone().oneshot(get("/api/patients", None)).await.unwrap();
        assert_eq!(response.headers()["cache-control"], "no-store");
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let app = test_app();
        let (status, body) = send(&app, get("/missing.html", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found.");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_predict() {
        let app = test_app();
        let (status, body) = send(&app, get("/api-docs/openapi.json", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/predict").is_some());
        assert!(body["components"]["securitySchemes"].get("bearer").is_some());
    }
}
