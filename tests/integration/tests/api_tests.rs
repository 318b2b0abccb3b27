//! API Integration Tests
//!
//! Each test starts the real Axum application on an ephemeral port, backed by
//! the in-memory credential store and a capturing mail dispatcher, so no
//! external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;

/// Register and verify a fresh account, returning its login
async fn verified_account(server: &TestServer) -> (RegisterRequest, LoginResponse) {
    let request = RegisterRequest::unique();
    let response = server.post("/api/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let code = server.registration_code(&request.email).unwrap();
    let response = server
        .post("/api/auth/verify-otp", &VerifyCodeRequest::new(&request.email, &code))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let login: LoginResponse = assert_json(response, StatusCode::OK).await.unwrap();
    (request, login)
}

fn wrong_code(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["store"], "healthy");
}

// ============================================================================
// Registration and Login
// ============================================================================

#[tokio::test]
async fn test_registration_scenario() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let response = server.post("/api/auth/register", &request).await.unwrap();
    let body: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(
        body.message,
        "User registered successfully. Please verify OTP sent to your email."
    );
    assert_eq!(body.notification_delivered, Some(true));

    // Unverified accounts cannot log in
    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");

    let otp = server.registration_code(&request.email).unwrap();
    let response = server
        .post(
            "/api/auth/verify-otp",
            &VerifyCodeRequest::new(&request.email, wrong_code(&otp)),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_CODE");

    let response = server
        .post("/api/auth/verify-otp", &VerifyCodeRequest::new(&request.email, &otp))
        .await
        .unwrap();
    let body: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.message, "OTP verified successfully. Your account is now active.");

    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let login: LoginResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!login.token.is_empty());
    assert_eq!(login.token_type, "Bearer");
    assert_eq!(login.expires_in, 604_800);
    assert_eq!(login.account.email, request.email);
    assert_eq!(login.account.mobile_number, request.mobile_number);
    assert!(login.account.is_verified);

    let response = server
        .post(
            "/api/auth/login",
            &LoginRequest {
                email: request.email.clone(),
                password: "wrong".to_string(),
            },
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_response_hides_credentials() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();
    server.post("/api/auth/register", &request).await.unwrap();
    let otp = server.registration_code(&request.email).unwrap();
    server
        .post("/api/auth/verify-otp", &VerifyCodeRequest::new(&request.email, &otp))
        .await
        .unwrap();

    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    let account = body["account"].as_object().unwrap();
    assert!(!account.contains_key("password"));
    assert!(!account.contains_key("passwordHash"));
    assert!(!account.contains_key("otp"));
    assert!(!account.contains_key("otpExpires"));
}

#[tokio::test]
async fn test_register_duplicate_identity() {
    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let response = server.post("/api/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    // Same email, different mobile
    let mut same_email = RegisterRequest::unique();
    same_email.email = request.email.to_uppercase();
    let response = server.post("/api/auth/register", &same_email).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    // Same mobile, different email
    let mut same_mobile = RegisterRequest::unique();
    same_mobile.mobile_number = request.mobile_number.clone();
    let response = server.post("/api/auth/register", &same_mobile).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    assert_eq!(server.mail.count(), 1);
}

#[tokio::test]
async fn test_register_validation() {
    let server = TestServer::start().await.expect("Failed to start server");

    let mut request = RegisterRequest::unique();
    request.email = "not-an-email".to_string();
    let response = server.post("/api/auth/register", &request).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");

    let mut request = RegisterRequest::unique();
    request.password = "short".to_string();
    let response = server.post("/api/auth/register", &request).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "WEAK_PASSWORD");

    let response = server
        .post("/api/auth/register", &serde_json::json!({ "email": "x@y.com" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_REQUEST");
}

#[tokio::test]
async fn test_login_unknown_account() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post(
            "/api/auth/login",
            &LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "Secr3t!".to_string(),
            },
        )
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["message"], "Invalid email or password");
}

// ============================================================================
// Password Reset
// ============================================================================

#[tokio::test]
async fn test_password_reset_scenario() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (request, _) = verified_account(&server).await;

    let response = server
        .post(
            "/api/auth/forgot-password",
            &ForgotPasswordRequest {
                email: request.email.clone(),
            },
        )
        .await
        .unwrap();
    let body: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.notification_delivered, Some(true));

    let code = server.reset_code(&request.email).unwrap();

    let response = server
        .post(
            "/api/auth/verify-reset-otp",
            &VerifyCodeRequest::new(&request.email, &code),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let reset = ResetPasswordRequest {
        email: request.email.clone(),
        otp: code.clone(),
        new_password: "N3wpassword".to_string(),
    };
    let response = server.post("/api/auth/reset-password", &reset).await.unwrap();
    let body: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.message, "Password reset successfully.");

    // The code is spent
    let again = ResetPasswordRequest {
        email: request.email.clone(),
        otp: code,
        new_password: "An0therpass".to_string(),
    };
    let response = server.post("/api/auth/reset-password", &again).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_CODE");

    // Old password no longer works, new one does
    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post(
            "/api/auth/login",
            &LoginRequest {
                email: request.email.clone(),
                password: "N3wpassword".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post(
            "/api/auth/forgot-password",
            &ForgotPasswordRequest {
                email: "nobody@example.com".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Authenticated Profile Operations
// ============================================================================

#[tokio::test]
async fn test_profile_routes_require_token() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .put("/api/auth/update-profile", &UpdateProfileRequest::default())
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTH");

    let response = server
        .put_auth(
            "/api/auth/update-profile",
            "not.a.token",
            &UpdateProfileRequest::default(),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_update_profile() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, login) = verified_account(&server).await;

    let update = UpdateProfileRequest {
        first_name: Some("Grace".to_string()),
        mobile_number: Some("+1 (555) 010-9999".to_string()),
        date_of_birth: Some("1906-12-09".to_string()),
        ..UpdateProfileRequest::default()
    };
    let response = server
        .put_auth("/api/auth/update-profile", &login.token, &update)
        .await
        .unwrap();
    let account: AccountResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(account.id, login.account.id);
    assert_eq!(account.first_name, "Grace");
    assert_eq!(account.last_name, login.account.last_name);
    assert_eq!(account.mobile_number, "+15550109999");
    assert_eq!(account.date_of_birth.as_deref(), Some("1906-12-09"));
    assert_eq!(account.gender, "female");
}

#[tokio::test]
async fn test_upload_profile_picture() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (_, login) = verified_account(&server).await;

    let response = server
        .upload_auth(
            "/api/auth/upload-profile-pic",
            &login.token,
            "profilePic",
            vec![0x89, b'P', b'N', b'G'],
            "image/png",
        )
        .await
        .unwrap();
    let account: AccountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let reference = account.profile_pic.expect("picture stored");
    assert!(reference.ends_with(".png"));
    assert!(server.upload_dir.join(&reference).is_file());

    let response = server
        .upload_auth(
            "/api/auth/upload-profile-pic",
            &login.token,
            "profilePic",
            b"hello".to_vec(),
            "text/plain",
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_REQUEST");

    let response = server
        .upload_auth(
            "/api/auth/upload-profile-pic",
            &login.token,
            "avatar",
            vec![1, 2, 3],
            "image/png",
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_delete_account() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (request, login) = verified_account(&server).await;

    let response = server
        .delete_auth("/api/auth/delete-account", &login.token)
        .await
        .unwrap();
    let body: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.message, "Account deleted successfully.");

    // The token is still well-formed, but the account is gone
    let response = server
        .delete_auth("/api/auth/delete-account", &login.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .post("/api/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // The email and mobile number are free again
    let response = server.post("/api/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post("/api/auth/login", &serde_json::json!({}))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_rate_limit() {
    let server = TestServer::start_with(&[
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1"),
        ("RATE_LIMIT_BURST", "2"),
    ])
    .await
    .expect("Failed to start server");

    let mut limited = false;
    for _ in 0..5 {
        let response = server
            .post(
                "/api/auth/forgot-password",
                &ForgotPasswordRequest {
                    email: "nobody@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = true;
            break;
        }
    }
    assert!(limited);

    // Health probes are outside the limiter
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}
