//! End-to-end tests driving the router with in-memory storage.

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HOST, SET_COOKIE};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use quire_auth::token::encode_claims;
use quire_auth::{AccessTokenClaims, AuthConfig};
use quire_core::tenant::TenancyMode;
use quire_db::{AdminSeed, DbConfig, Provisioning, TenantResolver};
use quire_server::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "password";

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "api-test-secret".into(),
        ..Default::default()
    }
}

async fn app(mode: TenancyMode) -> Router {
    let provisioning = Provisioning {
        admin: Some(AdminSeed::default()),
        pepper: None,
    };
    let resolver = TenantResolver::connect(mode, DbConfig::default(), provisioning)
        .await
        .unwrap();
    build_router(AppState::new(resolver, auth_config()))
}

struct Call {
    method: &'static str,
    uri: String,
    body: Option<Value>,
    headers: Vec<(axum::http::HeaderName, String)>,
}

impl Call {
    fn new(method: &'static str, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn bearer(mut self, token: &str) -> Self {
        self.headers.push((AUTHORIZATION, format!("Bearer {token}")));
        self
    }

    fn tenant(mut self, tenant: &str) -> Self {
        self.headers.push((
            axum::http::HeaderName::from_static("x-tenant-id"),
            tenant.to_string(),
        ));
        self
    }

    fn header(mut self, name: axum::http::HeaderName, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    async fn send(self, app: &Router) -> (StatusCode, Value) {
        let (status, _, body) = self.send_full(app).await;
        (status, body)
    }

    async fn send_full(self, app: &Router) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = match self.body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }
}

/// Log in and return the token carried by the session cookie.
async fn login(app: &Router, tenant: Option<&str>, email: &str, password: &str) -> String {
    let mut call =
        Call::new("POST", "/api/auth/login").json(json!({ "email": email, "password": password }));
    if let Some(tenant) = tenant {
        call = call.tenant(tenant);
    }
    let (status, headers, body) = call.send_full(app).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    let cookie = headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let pair = cookie.split(';').next().unwrap();
    pair.strip_prefix("auth_token=").unwrap().to_string()
}

async fn admin_token(app: &Router) -> String {
    login(app, None, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

// ---------------------------------------------------------------------------
// Health & authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_edition() {
    let app = app(TenancyMode::Single).await;
    let (status, body) = Call::new("GET", "/health").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["edition"], "Community");
    assert_eq!(body["database"], "surrealdb");
    assert_eq!(body["multi_tenant"], false);

    let app = self::app(TenancyMode::Multi).await;
    let (_, body) = Call::new("GET", "/health").send(&app).await;
    assert_eq!(body["edition"], "Enterprise");
    assert_eq!(body["multi_tenant"], true);
}

#[tokio::test]
async fn protected_routes_reject_missing_expired_and_malformed_credentials() {
    let app = app(TenancyMode::Single).await;

    let (status, body) = Call::new("GET", "/api/v1/pages").send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) = Call::new("GET", "/api/v1/pages")
        .bearer("not-a-jwt")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = Call::new("GET", "/api/auth/me")
        .header(COOKIE, "auth_token=garbage.token.value")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let config = auth_config();
    let now = Utc::now().timestamp();
    let expired = encode_claims(
        &AccessTokenClaims {
            sub: Uuid::new_v4().to_string(),
            email: ADMIN_EMAIL.into(),
            role: "admin".into(),
            tenant_id: String::new(),
            iss: config.jwt_issuer.clone(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        },
        &config,
    )
    .unwrap();
    let (status, body) = Call::new("GET", "/api/v1/pages")
        .bearer(&expired)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token has expired");
}

#[tokio::test]
async fn login_sets_cookie_and_identifies_caller() {
    let app = app(TenancyMode::Single).await;

    let (status, headers, body) = Call::new("POST", "/api/auth/login")
        .json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send_full(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());

    let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();
    let token = pair.strip_prefix("auth_token=").unwrap().to_string();

    let (status, body) = Call::new("GET", "/api/auth/me")
        .header(COOKIE, &pair)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);

    let (status, body) = Call::new("GET", "/api/auth/me")
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Admin");
}

#[tokio::test]
async fn bad_login_is_unauthorized_with_generic_message() {
    let app = app(TenancyMode::Single).await;

    for (email, password) in [(ADMIN_EMAIL, "wrong"), ("nobody@example.com", "password")] {
        let (status, body) = Call::new("POST", "/api/auth/login")
            .json(json!({ "email": email, "password": password }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid email or password");
    }
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = app(TenancyMode::Single).await;
    let (status, headers, body) = Call::new("POST", "/api/auth/logout").send_full(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("auth_token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_create_invalid_update_then_publish() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    let (status, page) = Call::new("POST", "/api/v1/pages")
        .bearer(&token)
        .json(json!({
            "slug": "about/team",
            "title": "Our team",
            "blocks": [
                { "id": "b1", "type": "hero", "data": { "title": "Hello" } },
                { "id": "b2", "type": "text", "data": { "content": "<p>Hi</p>" } }
            ]
        }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(page["status"], "draft");
    assert!(page["published_at"].is_null());
    assert_eq!(page["blocks"].as_array().unwrap().len(), 2);
    let id = page["id"].as_str().unwrap().to_string();

    let (status, body) = Call::new("PUT", format!("/api/v1/pages/{id}"))
        .bearer(&token)
        .json(json!({ "status": "invalid" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = Call::new("GET", "/api/public/pages/about/team")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, published) = Call::new("POST", format!("/api/v1/pages/{id}/publish"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["status"], "published");

    let (status, fetched) = Call::new("GET", format!("/api/v1/pages/{id}"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "published");
    assert!(fetched["published_at"].is_string());
    assert_eq!(fetched["title"], "Our team");

    let (status, public) = Call::new("GET", "/api/public/pages/about/team")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["id"], id.as_str());
    assert_eq!(public["blocks"][0]["type"], "hero");

    let (status, draft) = Call::new("POST", format!("/api/v1/pages/{id}/unpublish"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["status"], "draft");
    assert!(draft["published_at"].is_null());
}

#[tokio::test]
async fn page_requests_are_validated() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    let (status, body) = Call::new("POST", "/api/v1/pages")
        .bearer(&token)
        .json(json!({ "slug": "", "title": "Untitled" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "slug is required");

    let (status, _) = Call::new("POST", "/api/v1/pages")
        .bearer(&token)
        .json(json!({ "slug": "x", "title": "X", "status": "live" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = Call::new("GET", "/api/v1/pages/not-a-uuid")
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = Call::new("GET", "/api/v1/pages?limit=abc")
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = Call::new("GET", format!("/api/v1/pages/{}", Uuid::new_v4()))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = Call::new("POST", "/api/v1/pages")
        .bearer(&token)
        .json(json!({ "slug": "home", "title": "Home" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = Call::new("POST", "/api/v1/pages")
        .bearer(&token)
        .json(json!({ "slug": "home", "title": "Home again" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
}

#[tokio::test]
async fn page_list_filters_and_delete() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    let mut ids = Vec::new();
    for (slug, status) in [("a", "draft"), ("b", "published"), ("c", "published")] {
        let (code, page) = Call::new("POST", "/api/v1/pages")
            .bearer(&token)
            .json(json!({ "slug": slug, "title": slug.to_uppercase(), "status": status }))
            .send(&app)
            .await;
        assert_eq!(code, StatusCode::CREATED);
        ids.push(page["id"].as_str().unwrap().to_string());
    }

    let (_, all) = Call::new("GET", "/api/v1/pages")
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(all["total"], 3);

    let (_, published) = Call::new("GET", "/api/v1/pages?status=published&limit=1")
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(published["total"], 2);
    assert_eq!(published["items"].as_array().unwrap().len(), 1);

    let (status, _) = Call::new("DELETE", format!("/api/v1/pages/{}", ids[0]))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = Call::new("GET", format!("/api/v1/pages/{}", ids[0]))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = Call::new("GET", "/api/v1/dashboard/stats")
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(stats["pages"], 2);
    assert_eq!(stats["users"], 1);
}

// ---------------------------------------------------------------------------
// Posts, categories, menus, settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn posts_are_authored_by_caller_and_public_sees_published_only() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    let (status, category) = Call::new("POST", "/api/v1/categories")
        .bearer(&token)
        .json(json!({ "name": "News", "slug": "news" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, post) = Call::new("POST", "/api/v1/posts")
        .bearer(&token)
        .json(json!({
            "title": "Launch",
            "slug": "launch",
            "content": "We launched.",
            "status": "published",
            "category_ids": [category_id]
        }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(post["published_at"].is_string());
    assert_eq!(post["categories"][0]["slug"], "news");

    let (_, me) = Call::new("GET", "/api/auth/me").bearer(&token).send(&app).await;
    assert_eq!(post["author_id"], me["user"]["id"]);

    let (status, _) = Call::new("POST", "/api/v1/posts")
        .bearer(&token)
        .json(json!({ "title": "Draft", "slug": "draft" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, public) = Call::new("GET", "/api/public/posts").send(&app).await;
    assert_eq!(public["total"], 1);
    assert_eq!(public["items"][0]["slug"], "launch");

    let (status, _) = Call::new("GET", "/api/public/posts/draft").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = Call::new("GET", "/api/public/posts/launch").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Launch");

    let (_, categories) = Call::new("GET", "/api/public/categories").send(&app).await;
    assert_eq!(categories.as_array().unwrap().len(), 1);

    let (status, _) = Call::new("DELETE", format!("/api/v1/categories/{category_id}"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, post) = Call::new("GET", "/api/public/posts/launch").send(&app).await;
    assert!(post["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn supplied_ids_are_honored_for_posts_categories_and_menus() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    for (path, body) in [
        ("/api/v1/categories", json!({ "name": "News", "slug": "news" })),
        ("/api/v1/posts", json!({ "title": "Hello", "slug": "hello" })),
        ("/api/v1/menus", json!({ "name": "Main", "items": [{ "label": "Home" }] })),
    ] {
        let id = Uuid::new_v4();
        let mut body = body;
        body["id"] = json!(id);

        let (status, created) = Call::new("POST", path)
            .bearer(&token)
            .json(body.clone())
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED, "{path}: {created}");
        assert_eq!(created["id"], json!(id));

        body["slug"] = json!(format!("other-{id}"));
        let (status, err) = Call::new("POST", path)
            .bearer(&token)
            .json(body)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "{path}: {err}");
        assert_eq!(err["code"], 409);
    }

    let (_, menus) = Call::new("GET", "/api/v1/menus").bearer(&token).send(&app).await;
    assert_eq!(menus["items"][0]["items"][0]["url"], "");
}

#[tokio::test]
async fn menus_and_settings_round_trip() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    let (_, defaults) = Call::new("GET", "/api/public/settings").send(&app).await;
    assert_eq!(defaults["site_name"], "Quire CMS");

    let (status, menu) = Call::new("POST", "/api/v1/menus")
        .bearer(&token)
        .json(json!({
            "name": "Main",
            "items": [
                { "label": "Home", "url": "/" },
                { "label": "Docs", "url": "/docs", "children": [
                    { "label": "API", "url": "/docs/api", "target": "_blank" }
                ] }
            ]
        }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let menu_id = menu["id"].as_str().unwrap().to_string();

    let (status, public_menu) = Call::new("GET", format!("/api/public/menus/{menu_id}"))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public_menu["items"][1]["children"][0]["target"], "_blank");

    let (status, saved) = Call::new("PUT", "/api/v1/settings")
        .bearer(&token)
        .json(json!({ "site_name": "Acme", "header_menu_id": menu_id }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["site_name"], "Acme");

    let (_, public) = Call::new("GET", "/api/public/settings").send(&app).await;
    assert_eq!(public["site_name"], "Acme");
    assert_eq!(public["header_menu_id"], menu_id.as_str());

    let (status, _) = Call::new("DELETE", format!("/api/v1/menus/{menu_id}"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = Call::new("GET", format!("/api/public/menus/{menu_id}"))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = app(TenancyMode::Single).await;
    let token = admin_token(&app).await;

    let (status, editor) = Call::new("POST", "/api/v1/users")
        .bearer(&token)
        .json(json!({
            "name": "Eddie",
            "email": "eddie@example.com",
            "password": "hunter22",
            "role": "editor"
        }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(editor["role"], "editor");

    let editor_token = login(&app, None, "eddie@example.com", "hunter22").await;
    let (status, body) = Call::new("GET", "/api/v1/users")
        .bearer(&editor_token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    // Editors still manage content.
    let (status, _) = Call::new("POST", "/api/v1/pages")
        .bearer(&editor_token)
        .json(json!({ "slug": "by-editor", "title": "By editor" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, me) = Call::new("GET", "/api/auth/me").bearer(&token).send(&app).await;
    let admin_id = me["user"]["id"].as_str().unwrap().to_string();
    let (status, body) = Call::new("DELETE", format!("/api/v1/users/{admin_id}"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "you cannot delete your own account");

    let editor_id = editor["id"].as_str().unwrap();
    let (status, _) = Call::new("DELETE", format!("/api/v1/users/{editor_id}"))
        .bearer(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The editor's token outlives the account but no longer resolves.
    let (status, _) = Call::new("GET", "/api/auth/me")
        .bearer(&editor_token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Multi-tenancy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tenants_are_isolated() {
    let app = app(TenancyMode::Multi).await;
    let acme = login(&app, Some("acme"), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let globex = login(&app, Some("globex"), ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = Call::new("POST", "/api/v1/pages")
        .tenant("acme")
        .bearer(&acme)
        .json(json!({ "slug": "home", "title": "Acme home" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = Call::new("GET", "/api/v1/pages")
        .tenant("globex")
        .bearer(&globex)
        .send(&app)
        .await;
    assert_eq!(list["total"], 0);

    // The same slug is free in another tenant.
    let (status, _) = Call::new("POST", "/api/v1/pages")
        .tenant("globex")
        .bearer(&globex)
        .json(json!({ "slug": "home", "title": "Globex home" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Subdomain resolution reaches the same tenant as the header.
    let (status, list) = Call::new("GET", "/api/v1/pages")
        .header(HOST, "acme.example.com")
        .bearer(&acme)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"][0]["title"], "Acme home");
}

#[tokio::test]
async fn token_from_another_tenant_is_rejected() {
    let app = app(TenancyMode::Multi).await;
    let acme = login(&app, Some("acme"), ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = Call::new("GET", "/api/v1/pages")
        .tenant("globex")
        .bearer(&acme)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token was issued for another tenant");

    let (status, _) = Call::new("GET", "/api/v1/pages")
        .tenant("bad tenant!")
        .bearer(&acme)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
