use serde_json::json;

use crate::common::{TestApp, TestResponse, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_player_can_register_with_valid_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "ali@example.com", "name": "Ali", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["email"], "ali@example.com");
        assert_eq!(res.body["role"], "PLAYER");
        assert_eq!(res.body["plan"], "FREE");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn email_is_stored_lowercased_and_trimmed() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "  Ali@Example.COM ", "name": "Ali", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["email"], "ali@example.com");
    }

    #[tokio::test]
    async fn admin_role_can_be_requested_at_registration() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "kaptan@example.com",
                    "name": "Kaptan",
                    "password": "securepass",
                    "role": "ADMIN",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["role"], "ADMIN");
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_email() {
        let app = TestApp::spawn().await;
        let body = json!({"email": "ali@example.com", "name": "Ali", "password": "securepass"});

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201, "First registration failed: {}", first.text);

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "ALI@example.com", "name": "Other", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "ali@example.com", "name": "Ali", "password": "short"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_a_malformed_email() {
        let app = TestApp::spawn().await;

        for email in ["not-an-email", "ali@", "@example.com", "ali@localhost"] {
            let res = app
                .post_without_token(
                    routes::REGISTER,
                    &json!({"email": email, "name": "Ali", "password": "securepass"}),
                )
                .await;

            assert_eq!(res.status, 400, "email {email:?} was accepted");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn cannot_register_with_a_blank_name() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "ali@example.com", "name": "   ", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    async fn register(app: &TestApp) {
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"email": "ali@example.com", "name": "Ali", "password": "securepass"}),
            )
            .await;
        assert_eq!(res.status, 201, "Registration failed: {}", res.text);
    }

    #[tokio::test]
    async fn registered_user_receives_a_token_and_a_cookie() {
        let app = TestApp::spawn().await;
        register(&app).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ali@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["user"]["email"], "ali@example.com");

        let cookie = res
            .set_cookies
            .iter()
            .find(|c| c.starts_with("token="))
            .expect("login should set the token cookie");
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn login_email_is_case_insensitive() {
        let app = TestApp::spawn().await;
        register(&app).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ALI@EXAMPLE.COM", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        register(&app).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ali@example.com", "password": "wrongpass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_email_gets_the_same_error_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod authenticated_access {
    use super::*;

    #[tokio::test]
    async fn me_returns_the_current_user_with_a_bearer_token() {
        let app = TestApp::spawn().await;
        let ali = app.create_player("ali@example.com").await;

        let res = app.get_with_token(routes::ME, &ali.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], ali.id);
        assert_eq!(res.body["email"], "ali@example.com");
    }

    #[tokio::test]
    async fn me_without_credentials_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn cookie_session_survives_until_logout() {
        let app = TestApp::spawn().await;
        app.create_player("ali@example.com").await;

        let browser = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap();

        let login = browser
            .post(app.url(routes::LOGIN))
            .json(&json!({"email": "ali@example.com", "password": "securepass"}))
            .send()
            .await
            .unwrap();
        assert_eq!(login.status().as_u16(), 200);

        let me = TestResponse::from_response(
            browser.get(app.url(routes::ME)).send().await.unwrap(),
        )
        .await;
        assert_eq!(me.status, 200, "cookie was not accepted: {}", me.text);
        assert_eq!(me.body["email"], "ali@example.com");

        let logout = browser.post(app.url(routes::LOGOUT)).send().await.unwrap();
        assert_eq!(logout.status().as_u16(), 204);

        let after = TestResponse::from_response(
            browser.get(app.url(routes::ME)).send().await.unwrap(),
        )
        .await;
        assert_eq!(after.status, 401);
        assert_eq!(after.body["code"], "TOKEN_MISSING");
    }
}
