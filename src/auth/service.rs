use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{generate_otp_code, hash_password, verify_password};
use crate::auth::{
    AuthError, AuthResponse, ChangePasswordRequest, JwtService, LoginRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenResponse, UserInfo, UserRole,
    UserSession, VerifyOtpRequest,
};
use crate::services::{EmailService, SystemLogService};

/// User row as stored, including credentials
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserRecord {
    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or(UserRole::Member)
    }

    pub fn into_user_info(self) -> UserInfo {
        let role = self.role();
        UserInfo {
            id: self.id,
            email: self.email,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const OTP_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
    email: EmailService,
    audit: SystemLogService,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str, email: EmailService) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret),
            audit: SystemLogService::new(db.clone()),
            db,
            email,
        }
    }

    /// Register a new user. The account starts inactive; an activation OTP is
    /// issued and emailed.
    pub async fn register(&self, request: RegisterRequest) -> Result<MessageResponse, AuthError> {
        if !is_valid_email(&request.email) {
            return Err(AuthError::EmailValidation(
                "Invalid email address".to_string(),
            ));
        }

        if self.get_user_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        // Everyone registers as a member; admins promote via the role endpoint.
        let password_hash = hash_password(&request.password)?;
        let role = UserRole::Member;
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, password_hash, role, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, false, $5, $5)
             RETURNING id, email, password_hash, role, is_active, created_at, updated_at",
        )
        .bind(user_id)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(AuthError::Database)?;

        self.issue_otp(user.id, "activation").await?;

        self.audit
            .record("info", "auth.registered", &user.email, Some(user.id))
            .await;

        Ok(MessageResponse {
            message: "Account created. Check your email for the activation code.".to_string(),
        })
    }

    /// Activate an account with the emailed OTP. Verification is delegated to
    /// the `verify_account_otp` stored function; its comparison semantics are
    /// an external contract.
    pub async fn activate(&self, request: VerifyOtpRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .get_user_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        if !self.verify_otp(user.id, "activation", &request.code).await? {
            return Err(AuthError::InvalidOtp);
        }

        sqlx::query("UPDATE users SET is_active = true, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        self.audit
            .record("info", "auth.activated", &user.email, Some(user.id))
            .await;

        self.issue_session(UserRecord {
            is_active: true,
            ..user
        })
        .await
    }

    /// Login user
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .get_user_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountNotActivated);
        }

        self.audit
            .record("info", "auth.login", &user.email, Some(user.id))
            .await;

        self.issue_session(user).await
    }

    /// Refresh access token
    pub async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> Result<TokenResponse, AuthError> {
        let claims = self.jwt_service.validate_token(&request.refresh_token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        if !self
            .is_refresh_token_valid(user_id, &request.refresh_token)
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        let access_token =
            self.jwt_service
                .create_access_token(user_id, &claims.email, claims.role)?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
        })
    }

    /// Logout user (blacklist token, revoke refresh tokens)
    pub async fn logout(&self, token: &str) -> Result<MessageResponse, AuthError> {
        let claims = self.jwt_service.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        self.blacklist_token(&claims.jti, claims.exp as i64).await?;
        self.revoke_user_refresh_tokens(user_id).await?;

        self.audit
            .record("info", "auth.logout", &claims.email, Some(user_id))
            .await;

        Ok(MessageResponse {
            message: "Successfully logged out".to_string(),
        })
    }

    /// Start a password reset. The response is identical whether or not the
    /// email is registered.
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, AuthError> {
        if let Some(user) = self.get_user_by_email(email).await? {
            self.issue_otp(user.id, "password_reset").await?;
        }

        Ok(MessageResponse {
            message: "If an account with that email exists, a reset code has been sent."
                .to_string(),
        })
    }

    /// Complete a password reset with the emailed OTP.
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let user = self
            .get_user_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        if !self
            .verify_otp(user.id, "password_reset", &request.code)
            .await?
        {
            return Err(AuthError::InvalidOtp);
        }

        let password_hash = hash_password(&request.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(&password_hash)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        self.revoke_user_refresh_tokens(user.id).await?;

        self.audit
            .record("info", "auth.password_reset", &user.email, Some(user.id))
            .await;

        Ok(MessageResponse {
            message: "Password reset successfully".to_string(),
        })
    }

    /// Change password for an authenticated user.
    pub async fn change_password(
        &self,
        session: &UserSession,
        request: ChangePasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let user = self
            .get_user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(&request.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(&password_hash)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        self.revoke_user_refresh_tokens(user.id).await?;

        Ok(MessageResponse {
            message: "Password changed successfully".to_string(),
        })
    }

    /// Current user profile
    pub async fn current_user(&self, session: &UserSession) -> Result<UserInfo, AuthError> {
        let user = self
            .get_user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(user.into_user_info())
    }

    /// Check if token is blacklisted
    pub async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        let result =
            sqlx::query("SELECT 1 FROM token_blacklist WHERE jti = $1 AND expires_at > NOW()")
                .bind(jti)
                .fetch_optional(&self.db)
                .await
                .map_err(AuthError::Database)?;

        Ok(result.is_some())
    }

    /// Validate user session from token
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let session = self.jwt_service.extract_user_session(token)?;

        if self.is_token_blacklisted(&session.jti).await? {
            return Err(AuthError::InvalidToken);
        }

        Ok(session)
    }

    // Private helper methods

    async fn issue_session(&self, user: UserRecord) -> Result<AuthResponse, AuthError> {
        let role = user.role();
        let (access_token, refresh_token) =
            self.jwt_service.create_token_pair(user.id, &user.email, role)?;

        self.store_refresh_token(user.id, &refresh_token).await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
            user: user.into_user_info(),
        })
    }

    async fn issue_otp(&self, user_id: Uuid, purpose: &str) -> Result<(), AuthError> {
        let code = generate_otp_code();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        sqlx::query(
            "INSERT INTO account_otps (id, user_id, purpose, code_hash, expires_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(purpose)
        .bind(format!("{:x}", md5::compute(&code)))
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        let user = self
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Delivery failure is logged, not surfaced; the code can be re-requested.
        if let Err(err) = self.email.send_otp_code(&user.email, purpose, &code).await {
            tracing::warn!("failed to send OTP email to {}: {}", user.email, err);
        }

        Ok(())
    }

    async fn verify_otp(
        &self,
        user_id: Uuid,
        purpose: &str,
        code: &str,
    ) -> Result<bool, AuthError> {
        let verified = sqlx::query_scalar::<_, bool>("SELECT verify_account_otp($1, $2, $3)")
            .bind(user_id)
            .bind(purpose)
            .bind(format!("{:x}", md5::compute(code)))
            .fetch_one(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(verified)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, role, is_active, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, AuthError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, role, is_active, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(user)
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let claims = self.jwt_service.validate_token(refresh_token)?;
        let expires_at = chrono::DateTime::from_timestamp(claims.exp as i64, 0)
            .ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(format!("{:x}", md5::compute(refresh_token)))
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(())
    }

    async fn is_refresh_token_valid(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<bool, AuthError> {
        let token_hash = format!("{:x}", md5::compute(refresh_token));

        let result = sqlx::query(
            "SELECT 1 FROM refresh_tokens
             WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW() AND NOT revoked",
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(result.is_some())
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    async fn blacklist_token(&self, jti: &str, exp: i64) -> Result<(), AuthError> {
        let expires_at =
            chrono::DateTime::from_timestamp(exp, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(())
    }
}

/// Minimal email shape check; full validation is the mail server's problem.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        let valid_emails = [
            "user@example.com",
            "test.user@domain.co.uk",
            "member123@gmail.com",
            "coach@training.center",
        ];

        let invalid_emails = ["invalid-email", "@domain.com", "user@", "", "user@domain"];

        for email in valid_emails {
            assert!(is_valid_email(email), "Should accept valid email: {}", email);
        }

        for email in invalid_emails {
            assert!(
                !is_valid_email(email),
                "Should reject invalid email: {}",
                email
            );
        }
    }

    #[test]
    fn test_user_record_role_fallback() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            password_hash: String::new(),
            role: "gardener".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // Unknown role strings degrade to the least-privileged role.
        assert_eq!(record.role(), UserRole::Member);
    }
}
