mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use songswiper::{
    management::{SESSION_COOKIE, Session, TokenCache},
    server::build_router,
};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header as header_eq, method, path, path_regex, query_param},
};

use common::{seed_session, test_state, test_token};

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn track(name: &str, album: &str, artists: &[&str]) -> Value {
    json!({
        "track": {
            "name": name,
            "album": { "name": album },
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
        }
    })
}

fn page(items: Vec<Value>, offset: u32) -> Value {
    json!({ "items": items, "limit": 50, "offset": offset, "total": null })
}

/// Fails the test if any Spotify resource endpoint is called.
async fn forbid_api_calls(server: &MockServer) {
    Mock::given(path_regex("^/v1/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_anonymous_requests_create_no_session() {
    let state = test_state("http://127.0.0.1:9");
    let app = build_router(state.clone());

    for uri in ["/health", "/login", "/logout"] {
        for _ in 0..5 {
            let response = send(&app, get(uri, None)).await;
            let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
            assert!(cookies.len() <= 1, "{}", uri);
            assert!(
                cookies
                    .iter()
                    .all(|c| c.to_str().unwrap().contains("Max-Age=0")),
                "{}",
                uri
            );
        }
    }

    let response = send(&app, get("/", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(state.sessions.len().await, 0);

    let body = body_text(response).await;
    assert!(body.contains("Welcome to Song Swiper!"));
    assert!(body.contains("href='/login'"));
}

#[tokio::test]
async fn test_existing_session_is_resumed() {
    let state = test_state("http://127.0.0.1:9");
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, None).await;

    let response = send(&app, get("/", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_login_redirects_to_authorize_url() {
    let state = test_state("http://accounts.test");
    let app = build_router(state.clone());

    let response = send(&app, get("/login", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), state.oauth.get_authorize_url());
    assert!(location(&response).starts_with("http://accounts.test/authorize?"));
}

#[tokio::test]
async fn test_protected_routes_redirect_anonymous_users() {
    let server = MockServer::start().await;
    forbid_api_calls(&server).await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, None).await;

    for request in [
        get("/dashboard", None),
        get("/select_playlist", None),
        get("/dashboard", Some(&cookie)),
        post_form("/select_playlist", &cookie, "playlist_id=liked"),
    ] {
        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), state.oauth.get_authorize_url());
    }
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once_before_rendering() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "playlist-read-private user-library-read"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header_eq("authorization", "Bearer access-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "ada", "display_name": "Ada"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (id, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", -30))).await;

    let response = send(&app, get("/dashboard", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Welcome, Ada!"));
    assert!(body.contains("href='/select_playlist'"));
    assert!(body.contains("href='/logout'"));

    let stored = state.sessions.token(&id).await.unwrap();
    assert_eq!(stored.access_token, "access-2");
    assert_eq!(stored.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_dashboard_falls_back_to_generic_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x", "display_name": null})))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let body = body_text(send(&app, get("/dashboard", Some(&cookie))).await).await;

    assert!(body.contains("Welcome, user!"));
}

#[tokio::test]
async fn test_callback_stores_token_and_redirects_to_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("code=good-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
            "scope": "playlist-read-private user-library-read"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (id, cookie) = seed_session(&state, None).await;

    let response = send(&app, get("/callback?code=good-code", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let stored = state.sessions.token(&id).await.unwrap();
    assert_eq!(stored.access_token, "access-1");
}

#[tokio::test]
async fn test_callback_without_cookie_issues_session_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header_eq("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "display_name": "Ada" })))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());

    let response = send(&app, get("/callback?code=good-code", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.sessions.len().await, 1);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let body = body_text(send(&app, get("/dashboard", Some(&cookie))).await).await;
    assert!(body.contains("Welcome, Ada!"));
}

#[tokio::test]
async fn test_callback_errors_are_error_pages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());

    for uri in [
        "/callback",
        "/callback?code=",
        "/callback?error=access_denied",
        "/callback?code=expired-code",
    ] {
        let response = send(&app, get(uri, None)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body = body_text(response).await;
        assert!(body.contains("Login failed."));
        assert!(body.contains("href='/login'"));
    }
}

#[tokio::test]
async fn test_select_playlist_lists_all_pages() {
    let server = MockServer::start().await;
    let first: Vec<Value> = (0..50)
        .map(|i| json!({"id": format!("pl{}", i), "name": format!("List {}", i)}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(first, 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![json!({"id": "pl50", "name": "Road <Trip>"})],
            50,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 100)))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let response = send(&app, get("/select_playlist", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("action='/select_playlist'"));
    assert!(body.contains("value='liked' required> Liked Songs"));
    assert!(body.contains("value='pl0' required> List 0"));
    assert!(body.contains("value='pl50' required> Road &lt;Trip&gt;"));
    assert_eq!(body.matches("type='radio'").count(), 52);
    assert!(body.find("Liked Songs").unwrap() < body.find("List 0").unwrap());
}

#[tokio::test]
async fn test_selected_playlist_renders_ordered_tracks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/roadtrip1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Road Trip"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/roadtrip1/tracks"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                track("A", "X", &["Arist1"]),
                json!({ "track": null }),
                track("B", "Y", &["Arist2", "Arist3"]),
            ],
            0,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/roadtrip1/tracks"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 50)))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let response = send(
        &app,
        post_form("/select_playlist", &cookie, "playlist_id=roadtrip1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Playlist: Road Trip</h1>"));
    assert!(body.contains("<ol"));

    let a = body.find("<li>A  |  X  |  Arist1</li>").unwrap();
    let b = body.find("<li>B  |  Y  |  Arist2, Arist3</li>").unwrap();
    assert!(a < b);
    assert_eq!(body.matches("<li>").count(), 2);
}

#[tokio::test]
async fn test_liked_songs_use_saved_tracks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/tracks"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![track("Song", "Album", &["Someone"])],
            0,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/tracks"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 50)))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let response = send(
        &app,
        post_form("/select_playlist", &cookie, "playlist_id=liked"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Playlist: Liked Songs</h1>"));
    assert!(body.contains("<li>Song  |  Album  |  Someone</li>"));
}

#[tokio::test]
async fn test_selected_playlist_rejects_bad_input() {
    let server = MockServer::start().await;
    forbid_api_calls(&server).await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    for body in ["", "playlist_id=", "playlist_id=..%2Fme"] {
        let response = send(&app, post_form("/select_playlist", &cookie, body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{:?}", body);
    }
}

#[tokio::test]
async fn test_remote_failure_renders_error_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let response = send(&app, get("/dashboard", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_text(response).await;
    assert!(body.contains("Something went wrong."));
    assert!(!body.contains("<h1>Welcome"));
}

#[tokio::test]
async fn test_rejected_access_token_redirects_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let app = build_router(state.clone());
    let (_, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let response = send(&app, get("/dashboard", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let state = test_state("http://127.0.0.1:9");
    let app = build_router(state.clone());
    let (id, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;

    let response = send(&app, get("/logout", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let expired = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(expired.contains("Max-Age=0"));
    assert!(state.sessions.token(&id).await.is_none());

    // The old cookie no longer grants access
    let response = send(&app, get("/dashboard", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), state.oauth.get_authorize_url());
}

#[tokio::test]
async fn test_token_saved_after_logout_is_dropped() {
    let state = test_state("http://127.0.0.1:9");
    let app = build_router(state.clone());
    let (id, cookie) = seed_session(&state, Some(test_token("access-1", "refresh-1", 3600))).await;
    let in_flight = TokenCache::new(Session::new(id.clone(), state.sessions.clone()));

    send(&app, get("/logout", Some(&cookie))).await;
    in_flight.save(test_token("access-2", "refresh-2", 3600)).await;

    assert!(state.sessions.token(&id).await.is_none());
    let response = send(&app, get("/dashboard", Some(&cookie))).await;
    assert_eq!(location(&response), state.oauth.get_authorize_url());
}

#[tokio::test]
async fn test_health() {
    let state = test_state("http://127.0.0.1:9");
    let app = build_router(state);

    let response = send(&app, get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "songswiper");
    assert_eq!(json["sessions"], 0);
}
