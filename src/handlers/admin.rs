use actix_web::{web, HttpResponse, Result};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Local;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;
use crate::handlers::attendance::current_user;
use crate::handlers::shared::ApiResponse;
use crate::models::{AppNotification, Branch, Role, User, UserInfo, UserStatus};
use crate::store::state::AppData;

const DEFAULT_PASSWORD: &str = "123";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub branch_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub branch_id: Option<String>,
    pub status: Option<UserStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRegulationRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub title: String,
    pub content: String,
    pub branch_id: Option<String>,
}

// ---- Branches ----

pub async fn get_branches(data: web::Data<AppData>, _claims: Claims) -> Result<HttpResponse> {
    let branches = data.branches.read().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(branches.clone())))
}

pub async fn create_branch(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<Branch>,
) -> Result<HttpResponse> {
    claims.require_admin()?;
    let mut branch = request.into_inner();
    if branch.id.is_empty() {
        branch.id = Uuid::new_v4().to_string();
    }
    if branch.radius <= 0.0 {
        return Err(
            AppError::BadRequest("Bán kính chấm công phải lớn hơn 0.".to_string()).into(),
        );
    }

    data.upsert_branch(branch.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(branch)))
}

pub async fn update_branch(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
    request: web::Json<Branch>,
) -> Result<HttpResponse> {
    claims.require_admin()?;
    let id = path.into_inner();
    {
        let branches = data.branches.read().await;
        if !branches.iter().any(|b| b.id == id) {
            return Err(AppError::NotFound(format!("Không tìm thấy chi nhánh {}.", id)).into());
        }
    }

    let mut branch = request.into_inner();
    branch.id = id;
    data.upsert_branch(branch.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(branch)))
}

// ---- Users ----

pub async fn get_users(data: web::Data<AppData>, claims: Claims) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let users = data.users.read().await;
    let infos: Vec<UserInfo> = users.iter().cloned().map(UserInfo::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(infos)))
}

/// New accounts start with the default password and the first-login flag
/// set, which forces a password change on first sign-in.
pub async fn create_user(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    claims.require_admin()?;
    let request = request.into_inner();

    {
        let users = data.users.read().await;
        if users.iter().any(|u| u.username == request.username) {
            return Err(
                AppError::BadRequest("Tên đăng nhập đã tồn tại.".to_string()).into(),
            );
        }
    }

    let password_hash = hash(DEFAULT_PASSWORD, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(Some(e.to_string())))?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        avatar: format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            request.username
        ),
        username: request.username,
        name: request.name,
        email: request.email,
        password_hash,
        is_first_login: true,
        role: request.role,
        status: UserStatus::Working,
        branch_id: request.branch_id,
        notes: request.notes,
        confirmed_regulations: Vec::new(),
    };

    data.upsert_user(user.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

pub async fn update_user(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    claims.require_admin()?;
    let id = path.into_inner();
    let request = request.into_inner();

    let mut user = {
        let users = data.users.read().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy người dùng {}.", id)))?
    };

    if let Some(name) = request.name {
        user.name = name;
    }
    if let Some(email) = request.email {
        user.email = email;
    }
    if let Some(role) = request.role {
        user.role = role;
    }
    if let Some(status) = request.status {
        user.status = status;
    }
    if request.branch_id.is_some() {
        user.branch_id = request.branch_id;
    }
    if request.notes.is_some() {
        user.notes = request.notes;
    }

    data.upsert_user(user.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

/// Accounts are never hard-deleted; their records stay attributable. The
/// user is marked resigned and can no longer sign in.
pub async fn delete_user(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    claims.require_admin()?;
    let id = path.into_inner();

    let mut user = {
        let users = data.users.read().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy người dùng {}.", id)))?
    };
    user.status = UserStatus::Resigned;
    data.upsert_user(user.clone()).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(UserInfo::from(user)),
        "Nhân viên đã được chuyển sang trạng thái nghỉ việc.",
    )))
}

// ---- Regulations ----

pub async fn get_regulations(data: web::Data<AppData>, _claims: Claims) -> Result<HttpResponse> {
    let regulations = data.regulations.read().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(regulations.clone())))
}

pub async fn update_regulation(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
    request: web::Json<UpdateRegulationRequest>,
) -> Result<HttpResponse> {
    claims.require_admin()?;
    let id = path.into_inner();
    let request = request.into_inner();

    let mut regulations = data.regulations.write().await;
    let regulation = regulations
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy nội quy {}.", id)))?;
    regulation.title = request.title;
    regulation.content = request.content;
    regulation.updated_at = Local::now().date_naive();

    Ok(HttpResponse::Ok().json(ApiResponse::success(regulation.clone())))
}

/// Any signed-in user acknowledges a regulation; repeat acks are no-ops.
pub async fn acknowledge_regulation(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    {
        let regulations = data.regulations.read().await;
        if !regulations.iter().any(|r| r.id == id) {
            return Err(AppError::NotFound(format!("Không tìm thấy nội quy {}.", id)).into());
        }
    }

    let mut user = current_user(&data, &claims).await?;
    if !user.confirmed_regulations.contains(&id) {
        user.confirmed_regulations.push(id);
        data.upsert_user(user.clone()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

// ---- Notifications ----

pub async fn get_notifications(data: web::Data<AppData>, claims: Claims) -> Result<HttpResponse> {
    let user = current_user(&data, &claims).await?;
    let notifications = data.notifications.read().await;
    let visible: Vec<AppNotification> = notifications
        .iter()
        .filter(|n| n.branch_id.is_none() || n.branch_id == user.branch_id)
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(visible)))
}

pub async fn create_notification(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<CreateNotificationRequest>,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let author = current_user(&data, &claims).await?;
    let request = request.into_inner();

    let notification = AppNotification {
        id: Uuid::new_v4().to_string(),
        title: request.title,
        content: request.content,
        date: Local::now().date_naive(),
        author_name: author.name,
        branch_id: request.branch_id,
    };
    {
        let mut notifications = data.notifications.write().await;
        notifications.insert(0, notification.clone());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(notification)))
}
