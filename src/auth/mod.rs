pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod service;

pub use errors::AuthError;
pub use jwt::{extract_bearer_token, JwtService};
pub use middleware::{
    admin_only_middleware, cors_layer, extract_user_session, jwt_auth_middleware,
    security_headers_layer,
};
pub use models::{
    AuthResponse, ChangePasswordRequest, Claims, ForgotPasswordRequest, LoginRequest,
    MessageResponse, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenResponse,
    UserInfo, UserRole, UserSession, VerifyOtpRequest,
};
pub use policy::{access_granted, visible_disciplines, AccessControl, AssignmentState, Discipline};
pub use service::AuthService;
