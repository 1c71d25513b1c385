use actix_web::{web, HttpResponse, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;
use crate::handlers::attendance::current_user;
use crate::handlers::shared::ApiResponse;
use crate::models::{LeaveRequest, LeaveStatus, LeaveType};
use crate::store::state::AppData;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub reason: String,
    pub shift_type: Option<String>,
}

fn day_of_week_label(date: NaiveDate) -> String {
    match date.weekday() {
        Weekday::Mon => "Thứ 2",
        Weekday::Tue => "Thứ 3",
        Weekday::Wed => "Thứ 4",
        Weekday::Thu => "Thứ 5",
        Weekday::Fri => "Thứ 6",
        Weekday::Sat => "Thứ 7",
        Weekday::Sun => "Chủ nhật",
    }
    .to_string()
}

pub async fn create(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<CreateLeaveRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&data, &claims).await?;
    let request = request.into_inner();

    if request.reason.trim().is_empty() {
        return Err(AppError::BadRequest("Vui lòng nhập lý do.".to_string()).into());
    }

    let leave = LeaveRequest {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        user_name: Some(user.name.clone()),
        user_avatar: Some(user.avatar.clone()),
        date: request.date,
        day_of_week: Some(day_of_week_label(request.date)),
        leave_type: request.leave_type,
        reason: request.reason,
        status: LeaveStatus::Pending,
        shift_type: request.shift_type,
        branch_id: user.branch_id.clone(),
    };

    data.upsert_leave_request(leave.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(leave)))
}

pub async fn list(data: web::Data<AppData>, claims: Claims) -> Result<HttpResponse> {
    let requests = data.leave_requests.read().await;
    let visible: Vec<LeaveRequest> = requests
        .iter()
        .filter(|r| claims.is_manager_or_admin() || r.user_id == claims.sub)
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(visible)))
}

pub async fn approve(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    decide(data, claims, path.into_inner(), LeaveStatus::Approved).await
}

pub async fn reject(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    decide(data, claims, path.into_inner(), LeaveStatus::Rejected).await
}

/// Decisions are terminal: a request already approved or rejected cannot
/// flip.
async fn decide(
    data: web::Data<AppData>,
    claims: Claims,
    id: String,
    status: LeaveStatus,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;

    let mut request = {
        let requests = data.leave_requests.read().await;
        requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy yêu cầu {}.", id)))?
    };

    if request.is_decided() {
        return Err(
            AppError::BadRequest("Yêu cầu này đã được xử lý trước đó.".to_string()).into(),
        );
    }

    request.status = status;
    data.upsert_leave_request(request.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}
