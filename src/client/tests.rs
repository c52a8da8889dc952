//! Tests for the client session layer

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::auth::models::{AuthResponse, PublicProfile, RegisterRequest, UpdateProfileRequest};
    use crate::auth::password::PasswordHasher;
    use crate::auth::repository::UserRepository;
    use crate::auth::token::TokenService;
    use crate::auth::AuthService;
    use crate::common::{migrations::run_migrations, AppState};
    use crate::create_router;
    use crate::services::{FederatedClaims, IdentityProvider, ProviderAuthError};

    use async_trait::async_trait;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ============================================================================
    // Fixtures
    // ============================================================================

    struct RejectingProvider;

    #[async_trait]
    impl IdentityProvider for RejectingProvider {
        fn name(&self) -> &'static str {
            "google"
        }

        async fn fetch_claims(&self, _: &str) -> Result<FederatedClaims, ProviderAuthError> {
            Err(ProviderAuthError::Rejected(401))
        }
    }

    /// Serves the real router on an ephemeral port and returns its base URL
    async fn spawn_server() -> String {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool, false).await.unwrap();

        let hasher = PasswordHasher::new(4);
        let auth = AuthService::new(
            UserRepository::new(pool, hasher.clone()),
            hasher,
            TokenService::new("client_test_secret"),
            Arc::new(RejectingProvider),
        );
        let app = create_router(AppState::new(auth), &[]);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn profile(id: &str) -> PublicProfile {
        PublicProfile {
            id: id.to_string(),
            fname: "A".to_string(),
            lname: "B".to_string(),
            email: "a@b.com".to_string(),
            phone: "".to_string(),
            city: "Prayagraj".to_string(),
            country: "India".to_string(),
            image: "profile.jpg".to_string(),
        }
    }

    fn signed_in(token: &str) -> SessionContext {
        let session = SessionContext::in_memory();
        session
            .set_credentials(AuthResponse {
                user: profile("U_TEST000001"),
                token: token.to_string(),
            })
            .unwrap();
        session
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            fname: "A".to_string(),
            lname: "B".to_string(),
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
            phone: None,
            city: None,
            country: None,
            image: None,
        }
    }

    // ============================================================================
    // Route Guard Tests
    // ============================================================================

    #[test]
    fn test_guard_redirects_signed_out_navigation() {
        let guard = RouteGuard::new();
        let session = SessionContext::in_memory();

        assert_eq!(
            guard.check("/water-usage", &session),
            Navigation::Redirect("/login?redirect=%2Fwater-usage".to_string())
        );
        assert_eq!(guard.check("/", &session), Navigation::Admit);
        assert_eq!(guard.check("/login", &session), Navigation::Admit);
        assert_eq!(guard.check("/register", &session), Navigation::Admit);
    }

    #[test]
    fn test_guard_admits_signed_in_navigation() {
        let guard = RouteGuard::new();
        let session = signed_in("token");

        assert_eq!(guard.check("/water-usage", &session), Navigation::Admit);
        assert_eq!(guard.check("/dashboard", &session), Navigation::Admit);
    }

    #[test]
    fn test_login_redirect_shapes() {
        let guard = RouteGuard::new();

        assert_eq!(guard.login_redirect("/dashboard"), "/login?redirect=%2Fdashboard");
        assert_eq!(
            guard.login_redirect("/reports?year=2024"),
            "/login?redirect=%2Freports%3Fyear%3D2024"
        );
        assert_eq!(guard.login_redirect("/login"), "/login");
        assert_eq!(guard.login_redirect("https://evil.com"), "/login");
    }

    #[test]
    fn test_post_login_target() {
        let guard = RouteGuard::new();

        assert_eq!(guard.post_login_target(Some("%2Fwater-usage")), "/water-usage");
        assert_eq!(guard.post_login_target(Some("/energy")), "/energy");
        assert_eq!(
            guard.post_login_target(Some("%2Freports%3Fyear%3D2024")),
            "/reports?year=2024"
        );
        assert_eq!(guard.post_login_target(None), "/dashboard");
        assert_eq!(guard.post_login_target(Some("")), "/dashboard");
        assert_eq!(guard.post_login_target(Some("//evil.com")), "/dashboard");
        assert_eq!(guard.post_login_target(Some("%2F%2Fevil.com")), "/dashboard");
        assert_eq!(guard.post_login_target(Some("https://evil.com")), "/dashboard");
        assert_eq!(guard.post_login_target(Some("%2Flogin")), "/dashboard");
    }

    #[test]
    fn test_redirect_param() {
        assert_eq!(
            RouteGuard::redirect_param("/login?redirect=%2Fwater-usage"),
            Some("%2Fwater-usage")
        );
        assert_eq!(
            RouteGuard::redirect_param("/login?x=1&redirect=%2Fa#top"),
            Some("%2Fa")
        );
        assert_eq!(RouteGuard::redirect_param("/login"), None);
    }

    // ============================================================================
    // Session Store Tests
    // ============================================================================

    #[test]
    fn test_memory_session_lifecycle() {
        let session = SessionContext::in_memory();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());

        session
            .set_credentials(AuthResponse {
                user: profile("U_1"),
                token: "jwt".to_string(),
            })
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("jwt"));
        assert_eq!(session.user().unwrap().id, "U_1");

        session.clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_file_session_survives_reload() {
        let dir = TempDir::new().unwrap();
        let first = SessionContext::new(Arc::new(FileSessionStore::new(dir.path())));
        first
            .set_credentials(AuthResponse {
                user: profile("U_1"),
                token: "jwt".to_string(),
            })
            .unwrap();

        let store = FileSessionStore::new(dir.path());
        assert!(store.path().ends_with("userInfoCarbonLens.json"));

        let reloaded = SessionContext::new(Arc::new(store));
        let stored = reloaded.current().unwrap();
        assert_eq!(stored.token, "jwt");
        assert_eq!(stored.user, profile("U_1"));

        reloaded.clear().unwrap();
        assert!(!first.is_authenticated());
        // clearing twice is fine
        reloaded.clear().unwrap();
    }

    #[test]
    fn test_file_session_discards_corrupt_record() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());
    }

    // ============================================================================
    // API Client Tests
    // ============================================================================

    #[tokio::test]
    async fn test_register_persists_session() {
        let base = spawn_server().await;
        let client = ApiClient::new(&base, SessionContext::in_memory());

        let resp = client.register(&register_request()).await.unwrap();

        assert_eq!(client.session().token(), Some(resp.token.clone()));
        assert_eq!(client.session().user(), Some(resp.user.clone()));

        let me = client.me("/profile").await.unwrap();
        assert_eq!(me, resp.user);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_empty() {
        let base = spawn_server().await;
        let client = ApiClient::new(&base, SessionContext::in_memory());
        client.register(&register_request()).await.unwrap();
        client.session().clear().unwrap();

        let err = client.login("a@b.com", "wrong").await.unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Email or Password");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_google_failure_surfaces_message() {
        let base = spawn_server().await;
        let client = ApiClient::new(&base, SessionContext::in_memory());

        let err = client.login_with_google("ya29.revoked").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api { status: 400, ref message } if message == "Google authentication failed"
        ));
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_token_clears_session() {
        let base = spawn_server().await;
        let client = ApiClient::new(&base, signed_in("not-a-real-token"));

        let err = client.me("/water-usage").await.unwrap_err();

        assert!(matches!(err, ClientError::SessionExpired { .. }));
        assert_eq!(err.redirect_to(), Some("/login?redirect=%2Fwater-usage"));
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_protected_call_without_session() {
        let client = ApiClient::new("http://127.0.0.1:9", SessionContext::in_memory());

        let err = client.me("/energy").await.unwrap_err();

        assert!(matches!(err, ClientError::NotAuthenticated { .. }));
        assert_eq!(err.redirect_to(), Some("/login?redirect=%2Fenergy"));
    }

    #[tokio::test]
    async fn test_put_protected_updates_profile() {
        let base = spawn_server().await;
        let client = ApiClient::new(&base, SessionContext::in_memory());
        client.register(&register_request()).await.unwrap();

        let update = UpdateProfileRequest {
            city: Some("Lucknow".to_string()),
            ..Default::default()
        };
        let updated: PublicProfile = client
            .put_protected("auth/profile", &update, "/profile")
            .await
            .unwrap();

        assert_eq!(updated.city, "Lucknow");
    }

    #[tokio::test]
    async fn test_incomplete_auth_response_is_not_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "U_1", "fname": "A", "lname": "B", "email": "a@b.com",
                "phone": "", "city": "Prayagraj", "country": "India",
                "image": "profile.jpg", "token": ""
            })))
            .mount(&server)
            .await;
        let client = ApiClient::new(server.uri(), SessionContext::in_memory());

        let err = client.login("a@b.com", "secret").await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidResponse(_)));
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_non_json_error_body_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        let client = ApiClient::new(server.uri(), SessionContext::in_memory());

        let err = client.login("a@b.com", "secret").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn test_message_only_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "User already exists" })),
            )
            .mount(&server)
            .await;
        let client = ApiClient::new(server.uri(), SessionContext::in_memory());

        let err = client.register(&register_request()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api { status: 400, ref message } if message == "User already exists"
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_server_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{}", addr), signed_in("jwt"));
        client.logout().await.unwrap();

        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let client = ApiClient::new(server.uri(), signed_in("jwt"));

        client.logout().await.unwrap();

        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_deep_link_round_trip_through_login() {
        let base = spawn_server().await;
        let dir = TempDir::new().unwrap();
        let client = ApiClient::new(
            &base,
            SessionContext::new(Arc::new(FileSessionStore::new(dir.path()))),
        );
        client.register(&register_request()).await.unwrap();
        client.logout().await.unwrap();

        // signed out user opens a protected view
        let login_url = match client.guard().check("/water-usage", client.session()) {
            Navigation::Redirect(url) => url,
            Navigation::Admit => panic!("signed out navigation was admitted"),
        };
        assert_eq!(login_url, "/login?redirect=%2Fwater-usage");

        client.login("a@b.com", "secret").await.unwrap();
        let target = client
            .guard()
            .post_login_target(RouteGuard::redirect_param(&login_url));
        assert_eq!(target, "/water-usage");
        assert_eq!(
            client.guard().check(&target, client.session()),
            Navigation::Admit
        );

        // a fresh context over the same directory sees the session
        let reloaded = SessionContext::new(Arc::new(FileSessionStore::new(dir.path())));
        assert!(reloaded.is_authenticated());
    }
}
