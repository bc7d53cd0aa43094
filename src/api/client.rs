//! reqwest client for the account portal backend
//!
//! Mutating calls follow the CSRF pattern: `GET` the page first, read the
//! `X-CSRF-Token` header, then send the form with the token attached. The
//! session lives in the client's cookie store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::ApiError;
use super::traits::AccountApi;
use crate::state::{
    ApiMessage, AppDeletion, AppRegistration, AuthorizeRequest, BasicInfo, ImageUpload,
    JoinRequest, LoginOutcome, LoginRequest, PasswordChange, PasswordResetUpdate, PaymentMethod,
    Profile, ProfileUpdate, Redirect, RegisteredApp, UploadedImage,
};

/// Default backend address
pub const DEFAULT_API_ADDRESS: &str = "http://127.0.0.1:8080/web";

const CSRF_HEADER: &str = "X-CSRF-Token";
const JSON: &str = "application/json";

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the account backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch the page at `path` and return its CSRF token
    async fn csrf_token(&self, path: &str) -> Result<String, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        let token = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        token.ok_or_else(|| ApiError::MissingCsrfToken {
            path: path.to_string(),
        })
    }

    /// Send a url-encoded form to `path` with a fresh CSRF token
    async fn send_form(
        &self,
        method: Method,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<Response, ApiError> {
        let token = self.csrf_token(path).await?;
        tracing::debug!("{} {}", method, path);
        let response = self
            .http
            .request(method, self.url(path))
            .header(CSRF_HEADER, token)
            .header(ACCEPT, JSON)
            .form(form)
            .send()
            .await?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .header(ACCEPT, JSON)
            .send()
            .await?;
        let response = check_status(response).await?;
        decode(response).await
    }
}

/// Map error statuses to `ApiError`, passing successes and redirects through
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }
    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) if status.is_client_error() || status.is_server_error() => {
            tracing::debug!("backend rejected request ({}): {}", code, err.error);
            Err(ApiError::Rejected {
                status: code,
                message: err.error,
            })
        }
        _ => Err(ApiError::UnexpectedStatus { status: code }),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode a `{message, status}` body, tolerating an empty one
async fn decode_message(response: Response) -> Result<ApiMessage, ApiError> {
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiMessage {
            message: String::new(),
            status: Some(status),
        });
    }
    let mut message: ApiMessage =
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
    message.status.get_or_insert(status);
    Ok(message)
}

fn redirect_of(response: &Response) -> Option<Redirect> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|location| Redirect {
            location: location.to_string(),
        })
}

#[async_trait]
impl AccountApi for ApiClient {
    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ApiError> {
        let form = [("email", request.email), ("password", request.password)];
        let response = self.send_form(Method::POST, "/login", &form).await?;
        let response = check_status(response).await?;
        Ok(match redirect_of(&response) {
            Some(redirect) => LoginOutcome::Redirected(redirect),
            None => LoginOutcome::Authenticated,
        })
    }

    async fn join(&self, request: JoinRequest) -> Result<ApiMessage, ApiError> {
        let form = [
            ("email", request.email),
            ("login", request.login),
            ("password", request.password),
            ("display_name", request.display_name),
        ];
        let response = self.send_form(Method::POST, "/join", &form).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn authorize(&self, request: AuthorizeRequest) -> Result<Redirect, ApiError> {
        // The backend reads the OAuth parameters from the URL, so both the
        // token fetch and the answer go to the original request.
        let form = if request.allow {
            vec![("allow", "Allow".to_string()), ("continue", "true".to_string())]
        } else {
            vec![("deny", "Deny".to_string())]
        };
        let path = format!("/authorize?{}", request.query);
        let response = self.send_form(Method::POST, &path, &form).await?;
        let response = check_status(response).await?;
        let status = response.status().as_u16();
        redirect_of(&response).ok_or(ApiError::UnexpectedStatus { status })
    }

    async fn request_password_reset(&self, email: String) -> Result<ApiMessage, ApiError> {
        let form = [("email", email)];
        let response = self
            .send_form(Method::POST, "/password-reset", &form)
            .await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn complete_password_reset(
        &self,
        update: PasswordResetUpdate,
    ) -> Result<ApiMessage, ApiError> {
        let form = [
            ("token", update.token),
            ("password_new", update.password_new),
            ("password_confirm", update.password_confirm),
        ];
        let response = self
            .send_form(Method::PUT, "/password-reset", &form)
            .await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        let envelope: DataEnvelope<Profile> = self.get_json("/profile").await?;
        Ok(envelope.data)
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<ApiMessage, ApiError> {
        let form = update.form_pairs();
        let response = self.send_form(Method::PUT, "/profile", &form).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn update_basic_info(&self, info: BasicInfo) -> Result<ApiMessage, ApiError> {
        let form = [
            ("nickname", info.nickname),
            ("city", info.city),
            ("bio", info.bio),
        ];
        let response = self.send_form(Method::PUT, "/profile", &form).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn update_password(&self, change: PasswordChange) -> Result<ApiMessage, ApiError> {
        let form = [
            ("password", change.password),
            ("password_new", change.password_new),
            ("password_confirm", change.password_confirm),
        ];
        let response = self.send_form(Method::PUT, "/password", &form).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn delete_account(&self) -> Result<ApiMessage, ApiError> {
        let response = self.send_form(Method::DELETE, "/profile", &[]).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn list_apps(&self) -> Result<Vec<RegisteredApp>, ApiError> {
        let envelope: DataEnvelope<Option<Vec<RegisteredApp>>> = self.get_json("/apps").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn register_app(&self, app: AppRegistration) -> Result<RegisteredApp, ApiError> {
        let form = [
            ("application_name", app.application_name),
            ("redirect_uri", app.redirect_uri),
            ("application_url", app.application_url),
            ("application_hostname", app.application_hostname),
        ];
        let response = self.send_form(Method::POST, "/apps", &form).await?;
        let response = check_status(response).await?;
        let envelope: DataEnvelope<RegisteredApp> = decode(response).await?;
        Ok(envelope.data)
    }

    async fn delete_app(&self, request: AppDeletion) -> Result<ApiMessage, ApiError> {
        let form = [
            ("client_id", request.client_id),
            ("application_name", request.application_name),
        ];
        let response = self.send_form(Method::DELETE, "/apps", &form).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage, ApiError> {
        // The upload endpoint has no page of its own; the profile page hands out the token.
        let token = self.csrf_token("/profile").await?;
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)?;
        let form = Form::new().part("uploads", part);
        let response = self
            .http
            .post(self.url("/upload"))
            .header(CSRF_HEADER, token)
            .header(ACCEPT, JSON)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let envelope: DataEnvelope<UploadedImage> = decode(response).await?;
        Ok(envelope.data)
    }

    async fn save_payment_method(&self, card: PaymentMethod) -> Result<ApiMessage, ApiError> {
        let form = [
            ("name", card.name),
            ("number", card.number),
            ("expiration", card.expiration),
            ("cvc", card.cvc),
        ];
        let response = self.send_form(Method::POST, "/checkout", &form).await?;
        let response = check_status(response).await?;
        decode_message(response).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self.http.get(self.url("/logout")).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Form as AxumForm, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::{IntoResponse, Json};
    use axum::routing::get;
    use axum::Router;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const TOKEN: &str = "test-token";

    async fn page() -> impl IntoResponse {
        ([(CSRF_HEADER, TOKEN)], "")
    }

    async fn page_without_token() -> impl IntoResponse {
        ""
    }

    fn has_token(headers: &HeaderMap) -> bool {
        headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok()) == Some(TOKEN)
    }

    async fn join(
        headers: HeaderMap,
        AxumForm(form): AxumForm<HashMap<String, String>>,
    ) -> impl IntoResponse {
        if !has_token(&headers) {
            return (
                AxumStatus::FORBIDDEN,
                Json(serde_json::json!({"error": "Invalid CSRF token"})),
            );
        }
        if form.get("email").map(String::as_str) == Some("taken@example.org") {
            return (
                AxumStatus::BAD_REQUEST,
                Json(serde_json::json!({"error": "Email already taken"})),
            );
        }
        (
            AxumStatus::CREATED,
            Json(serde_json::json!({"message": "Account created", "status": 201})),
        )
    }

    async fn login(headers: HeaderMap) -> impl IntoResponse {
        if !has_token(&headers) {
            return AxumStatus::FORBIDDEN.into_response();
        }
        (AxumStatus::FOUND, [(LOCATION.as_str(), "/web/account")]).into_response()
    }

    async fn profile() -> impl IntoResponse {
        (
            [(CSRF_HEADER, TOKEN)],
            Json(serde_json::json!({
                "data": {"id": 7, "email": "ada@example.org", "displayName": "Ada"}
            })),
        )
    }

    async fn update_basic_info(
        headers: HeaderMap,
        AxumForm(form): AxumForm<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let complete = ["nickname", "city", "bio"]
            .iter()
            .all(|key| form.contains_key(*key));
        if !has_token(&headers) || !complete {
            return AxumStatus::BAD_REQUEST.into_response();
        }
        Json(serde_json::json!({"message": "Account updated", "status": 200})).into_response()
    }

    /// Hands out a token only when the OAuth request came along
    async fn authorize_page(Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
        if query.contains_key("client_id") {
            ([(CSRF_HEADER, TOKEN)], "").into_response()
        } else {
            AxumStatus::BAD_REQUEST.into_response()
        }
    }

    async fn authorize(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        AxumForm(form): AxumForm<HashMap<String, String>>,
    ) -> impl IntoResponse {
        if !has_token(&headers) {
            return AxumStatus::FORBIDDEN.into_response();
        }
        if query.get("scope").map(String::as_str) != Some("read_write") {
            return AxumStatus::BAD_REQUEST.into_response();
        }
        let state = query.get("state").cloned().unwrap_or_default();
        let location = if form.contains_key("continue") {
            format!("https://app.example.org/cb?code=abc123&state={state}")
        } else {
            format!("https://app.example.org/cb?error=access_denied&state={state}")
        };
        (AxumStatus::FOUND, [(LOCATION.as_str(), location)]).into_response()
    }

    async fn reset_password(AxumForm(form): AxumForm<HashMap<String, String>>) -> impl IntoResponse {
        if form.get("token").map(String::as_str) != Some("d2f9c1") {
            return (
                AxumStatus::BAD_REQUEST,
                Json(serde_json::json!({"error": "Token expired"})),
            );
        }
        (
            AxumStatus::ACCEPTED,
            Json(serde_json::json!({
                "message": "Your password was updated successfully. A confirmation email has been sent.",
                "status": 202
            })),
        )
    }

    async fn teapot() -> impl IntoResponse {
        (AxumStatus::IM_A_TEAPOT, "short and stout")
    }

    async fn serve() -> ApiClient {
        let app = Router::new()
            .route("/web/join", get(page).post(join))
            .route("/web/login", get(page).post(login))
            .route("/web/authorize", get(authorize_page).post(authorize))
            .route("/web/profile", get(profile).put(update_basic_info))
            .route(
                "/web/password-reset",
                get(page).post(teapot).put(reset_password),
            )
            .route("/web/checkout", get(page_without_token).post(teapot));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        ApiClient::new(format!("http://{addr}/web"), Duration::from_secs(5)).unwrap()
    }

    fn join_request(email: &str) -> JoinRequest {
        JoinRequest {
            email: email.to_string(),
            login: "ada".to_string(),
            password: "correct horse battery".to_string(),
            display_name: "Ada".to_string(),
        }
    }

    mod csrf {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_join_sends_token_and_reads_message() {
            let client = serve().await;
            let message = client.join(join_request("ada@example.org")).await.unwrap();
            assert_eq!(message.message, "Account created");
            assert_eq!(message.status, Some(201));
        }

        #[tokio::test]
        async fn test_missing_token_is_reported() {
            let client = serve().await;
            let card = PaymentMethod {
                name: "Ada".to_string(),
                number: "4242424242424242".to_string(),
                expiration: "12/30".to_string(),
                cvc: "123".to_string(),
            };
            let err = client.save_payment_method(card).await.unwrap_err();
            assert!(matches!(err, ApiError::MissingCsrfToken { .. }));
        }

        #[tokio::test]
        async fn test_basic_info_put_on_profile() {
            let client = serve().await;
            let message = client
                .update_basic_info(BasicInfo {
                    nickname: "Ada".to_string(),
                    city: "Ghent".to_string(),
                    bio: String::new(),
                })
                .await
                .unwrap();
            assert_eq!(message.message, "Account updated");
        }
    }

    mod responses {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_error_body_becomes_rejected() {
            let client = serve().await;
            let err = client
                .join(join_request("taken@example.org"))
                .await
                .unwrap_err();
            match err {
                ApiError::Rejected { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "Email already taken");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_non_json_error_is_unexpected_status() {
            let client = serve().await;
            let err = client
                .request_password_reset("ada@example.org".to_string())
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(418));
            assert!(matches!(err, ApiError::UnexpectedStatus { status: 418 }));
        }

        #[tokio::test]
        async fn test_login_redirect_is_surfaced() {
            let client = serve().await;
            let outcome = client
                .login(LoginRequest {
                    email: "ada@example.org".to_string(),
                    password: "hunter2hunter2".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(
                outcome,
                LoginOutcome::Redirected(Redirect {
                    location: "/web/account".to_string()
                })
            );
        }

        #[tokio::test]
        async fn test_fetch_profile_unwraps_data() {
            let client = serve().await;
            let profile = client.fetch_profile().await.unwrap();
            assert_eq!(profile.id, 7);
            assert_eq!(profile.display_name, "Ada");
        }
    }

    mod password_reset {
        use super::*;
        use pretty_assertions::assert_eq;

        fn update(token: &str) -> PasswordResetUpdate {
            PasswordResetUpdate {
                token: token.to_string(),
                password_new: "new-password-1".to_string(),
                password_confirm: "new-password-1".to_string(),
            }
        }

        #[tokio::test]
        async fn test_completion_reads_accepted_message() {
            let client = serve().await;
            let message = client.complete_password_reset(update("d2f9c1")).await.unwrap();
            assert_eq!(message.status, Some(202));
            assert!(message.message.starts_with("Your password was updated successfully"));
        }

        #[tokio::test]
        async fn test_bad_token_is_rejected() {
            let client = serve().await;
            let err = client
                .complete_password_reset(update("stale"))
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(400));
            assert_eq!(err.to_string(), "Token expired");
        }
    }

    mod authorize {
        use super::*;
        use pretty_assertions::assert_eq;

        const QUERY: &str = "client_id=player&redirect_uri=https%3A%2F%2Fapp.example.org%2Fcb\
                             &response_type=code&state=xyz123&scope=read_write";

        #[tokio::test]
        async fn test_allow_keeps_oauth_parameters() {
            let client = serve().await;
            let redirect = client
                .authorize(AuthorizeRequest {
                    query: QUERY.to_string(),
                    allow: true,
                })
                .await
                .unwrap();
            assert_eq!(redirect.query_param("code").as_deref(), Some("abc123"));
            assert_eq!(redirect.query_param("state").as_deref(), Some("xyz123"));
        }

        #[tokio::test]
        async fn test_deny_redirects_with_access_denied() {
            let client = serve().await;
            let redirect = client
                .authorize(AuthorizeRequest {
                    query: QUERY.to_string(),
                    allow: false,
                })
                .await
                .unwrap();
            assert_eq!(
                redirect.query_param("error").as_deref(),
                Some("access_denied")
            );
            assert_eq!(redirect.query_param("state").as_deref(), Some("xyz123"));
        }

        #[tokio::test]
        async fn test_missing_query_gets_no_token() {
            let client = serve().await;
            let err = client
                .authorize(AuthorizeRequest {
                    query: String::new(),
                    allow: true,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::MissingCsrfToken { .. }));
        }
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8080/web/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/login"), "http://localhost:8080/web/login");
        assert_eq!(client.base_url(), "http://localhost:8080/web/");
    }
}
