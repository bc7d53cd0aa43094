//! Trait abstraction for the account backend to enable mocking in tests

use async_trait::async_trait;

use super::error::ApiError;
use crate::state::{
    ApiMessage, AppDeletion, AppRegistration, AuthorizeRequest, BasicInfo, ImageUpload,
    JoinRequest, LoginOutcome, LoginRequest, PasswordChange, PasswordResetUpdate, PaymentMethod,
    Profile, ProfileUpdate, Redirect, RegisteredApp, UploadedImage,
};

/// Account backend operations, one per portal endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Sign in with email and password
    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ApiError>;

    /// Create an account
    async fn join(&self, request: JoinRequest) -> Result<ApiMessage, ApiError>;

    /// Answer an OAuth consent prompt, posting back the pending request
    async fn authorize(&self, request: AuthorizeRequest) -> Result<Redirect, ApiError>;

    async fn request_password_reset(&self, email: String) -> Result<ApiMessage, ApiError>;

    /// Set a new password with the token from the reset e-mail
    async fn complete_password_reset(
        &self,
        update: PasswordResetUpdate,
    ) -> Result<ApiMessage, ApiError>;

    async fn fetch_profile(&self) -> Result<Profile, ApiError>;

    /// Update the non-empty fields of the signed-in account
    async fn update_profile(&self, update: ProfileUpdate) -> Result<ApiMessage, ApiError>;

    /// Store the onboarding basic info on the profile
    async fn update_basic_info(&self, info: BasicInfo) -> Result<ApiMessage, ApiError>;

    async fn update_password(&self, change: PasswordChange) -> Result<ApiMessage, ApiError>;

    /// Schedule the signed-in account for deletion
    async fn delete_account(&self) -> Result<ApiMessage, ApiError>;

    async fn list_apps(&self) -> Result<Vec<RegisteredApp>, ApiError>;

    /// Register an OAuth client. The returned app carries its secret.
    async fn register_app(&self, app: AppRegistration) -> Result<RegisteredApp, ApiError>;

    async fn delete_app(&self, request: AppDeletion) -> Result<ApiMessage, ApiError>;

    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage, ApiError>;

    async fn save_payment_method(&self, card: PaymentMethod) -> Result<ApiMessage, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}
