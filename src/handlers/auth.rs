use actix_web::{web, HttpResponse, Result};

use crate::auth::{AuthService, ChangePasswordRequest, Claims, LoginRequest};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::models::UserInfo;
use crate::store::state::AppData;

pub async fn login(
    data: web::Data<AppData>,
    auth: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let response = auth
        .login(&data, request.into_inner())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn me(data: web::Data<AppData>, claims: Claims) -> Result<HttpResponse> {
    let users = data.users.read().await;
    let user = users
        .iter()
        .find(|u| u.id == claims.sub)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Không tìm thấy người dùng.".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

pub async fn change_password(
    data: web::Data<AppData>,
    auth: web::Data<AuthService>,
    claims: Claims,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    let info = auth
        .change_password(&data, &claims.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(info),
        "Đổi mật khẩu thành công!",
    )))
}
