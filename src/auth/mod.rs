use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web::Data, Error as ActixError, FromRequest,
    HttpRequest,
};
use anyhow::{anyhow, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Role, User, UserInfo, UserStatus};
use crate::store::state::AppData;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.to_string()
    }

    pub fn is_manager_or_admin(&self) -> bool {
        self.is_admin() || self.role == Role::Manager.to_string()
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Managers and admins only; staff get a 403.
    pub fn require_manager_or_admin(&self) -> Result<(), AppError> {
        if self.is_manager_or_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(
                "Chỉ Quản lý hoặc Admin mới có quyền thực hiện thao tác này.".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(
                "Chỉ Admin mới có quyền thực hiện thao tác này.".to_string(),
            ))
        }
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        match decode::<Claims>(
                            token,
                            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                            &Validation::new(Algorithm::HS256),
                        ) {
                            Ok(token_data) => {
                                return ready(Ok(token_data.claims));
                            }
                            Err(_) => {
                                return ready(Err(ErrorUnauthorized("Invalid token")));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Clone)]
pub struct AuthService {
    config: Config,
}

impl AuthService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn login(&self, data: &AppData, request: LoginRequest) -> Result<AuthResponse> {
        let user = {
            let users = data.users.read().await;
            users
                .iter()
                .find(|u| u.username == request.username)
                .cloned()
                .ok_or_else(|| anyhow!("Tên đăng nhập hoặc mật khẩu không đúng."))?
        };

        if user.status == UserStatus::Resigned {
            return Err(anyhow!("Tài khoản đã ngừng hoạt động."));
        }

        if !verify(&request.password, &user.password_hash)? {
            return Err(anyhow!("Tên đăng nhập hoặc mật khẩu không đúng."));
        }

        let token = self.generate_token(&user)?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Successful change also clears the first-login flag, which is what
    /// releases the forced password-change gate on the client.
    pub async fn change_password(
        &self,
        data: &AppData,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> Result<UserInfo, AppError> {
        let mut user = {
            let users = data.users.read().await;
            users
                .iter()
                .find(|u| u.id == user_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Không tìm thấy người dùng.".to_string()))?
        };

        let matches = verify(&request.current_password, &user.password_hash)
            .map_err(|e| AppError::InternalServerError(Some(e.to_string())))?;
        if !matches {
            return Err(AppError::BadRequest(
                "Mật khẩu hiện tại không đúng.".to_string(),
            ));
        }
        if request.new_password.len() < 3 {
            return Err(AppError::BadRequest("Mật khẩu mới quá ngắn.".to_string()));
        }

        user.password_hash = hash(&request.new_password, DEFAULT_COST)
            .map_err(|e| AppError::InternalServerError(Some(e.to_string())))?;
        user.is_first_login = false;
        data.upsert_user(user.clone()).await;
        Ok(user.into())
    }

    pub fn generate_token(&self, user: &User) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(self.config.jwt_expiration_days))
            .ok_or_else(|| anyhow!("Invalid expiration timestamp"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role.to_string(),
            branch_id: user.branch_id.clone(),
            exp: expiration,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}
