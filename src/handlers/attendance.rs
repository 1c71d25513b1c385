use std::time::Duration;

use actix_web::{web, HttpResponse, Result};
use chrono::Local;
use serde::Deserialize;

use crate::auth::Claims;
use crate::config::Config;
use crate::domain::capture::{
    CaptureSession, ReportedPosition, SimulatedVerifier, SubmittedFrame,
};
use crate::domain::geo::Coordinate;
use crate::domain::lifecycle::{self, RecordKey};
use crate::domain::status;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::models::{Branch, Direction, ShiftClosingData, ShiftRecord, User};
use crate::store::state::AppData;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub shift_type: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingRequest {
    pub shift_type: String,
    pub data: ShiftClosingData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipClosingRequest {
    pub shift_type: String,
}

pub(crate) async fn current_user(data: &AppData, claims: &Claims) -> Result<User, AppError> {
    let users = data.users.read().await;
    users
        .iter()
        .find(|u| u.id == claims.sub)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Không tìm thấy người dùng.".to_string()))
}

/// The user's assigned branch, falling back to the first configured branch
/// for accounts without one.
pub(crate) async fn branch_for_user(data: &AppData, user: &User) -> Result<Branch, AppError> {
    let branches = data.branches.read().await;
    user.branch_id
        .as_ref()
        .and_then(|id| branches.iter().find(|b| &b.id == id))
        .or_else(|| branches.first())
        .cloned()
        .ok_or_else(|| AppError::NotFound("Chưa có chi nhánh nào được cấu hình.".to_string()))
}

/// Today's shifts for the caller: every assignment merged with its stored
/// record, or a transient PENDING one where none exists yet.
pub async fn today(data: web::Data<AppData>, claims: Claims) -> Result<HttpResponse> {
    let user = current_user(&data, &claims).await?;
    let today = Local::now().date_naive();

    let shift_types: Vec<String> = {
        let assignments = data.assignments.read().await;
        assignments
            .iter()
            .filter(|a| a.user_id == user.id && a.date == today)
            .map(|a| a.shift_type.clone())
            .collect()
    };

    let records = data.records.read().await;
    let shifts: Vec<ShiftRecord> = shift_types
        .iter()
        .map(|shift_type| {
            let key = RecordKey::new(today, &user.id, shift_type);
            lifecycle::materialize(&key, &records, &user)
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(shifts)))
}

pub async fn check_in(
    data: web::Data<AppData>,
    config: web::Data<Config>,
    claims: Claims,
    request: web::Json<CheckRequest>,
) -> Result<HttpResponse> {
    check(data, config, claims, request.into_inner(), Direction::CheckIn).await
}

pub async fn check_out(
    data: web::Data<AppData>,
    config: web::Data<Config>,
    claims: Claims,
    request: web::Json<CheckRequest>,
) -> Result<HttpResponse> {
    check(data, config, claims, request.into_inner(), Direction::CheckOut).await
}

async fn check(
    data: web::Data<AppData>,
    config: web::Data<Config>,
    claims: Claims,
    request: CheckRequest,
    direction: Direction,
) -> Result<HttpResponse> {
    let user = current_user(&data, &claims).await?;
    let branch = branch_for_user(&data, &user).await?;
    let shift_config = branch
        .shift_config(&request.shift_type)
        .cloned()
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Chi nhánh {} không có ca trực {}.",
                branch.name, request.shift_type
            ))
        })?;

    let position = match (request.lat, request.lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
        _ => None,
    };
    let now = Local::now();

    let mut session = CaptureSession::new(direction, &branch);
    let shot = session
        .run(
            &ReportedPosition { position },
            &SubmittedFrame {
                photo: request.photo.clone(),
            },
            &SimulatedVerifier::new(Duration::from_millis(config.verification_delay_ms)),
            now.time(),
        )
        .await
        .map_err(AppError::Capture)?;

    let attendance_status = status::classify(shot.taken_at, &shift_config, direction);

    let key = RecordKey::new(now.date_naive(), &user.id, &request.shift_type);
    let mut record = {
        let records = data.records.read().await;
        lifecycle::materialize(&key, &records, &user)
    };
    match direction {
        Direction::CheckIn => lifecycle::apply_check_in(&mut record, shot, Some(attendance_status)),
        Direction::CheckOut => {
            lifecycle::apply_check_out(&mut record, shot, Some(attendance_status))
        }
    }
    .map_err(AppError::Lifecycle)?;

    data.upsert_record(record.clone()).await;
    log::info!(
        "Attendance {:?} recorded for {} ({})",
        direction,
        user.username,
        record.id
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn submit_closing(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<ClosingRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let user = current_user(&data, &claims).await?;
    let key = RecordKey::new(Local::now().date_naive(), &user.id, &request.shift_type);

    let mut record = {
        let records = data.records.read().await;
        lifecycle::materialize(&key, &records, &user)
    };
    lifecycle::submit_closing(&mut record, request.data).map_err(AppError::Lifecycle)?;

    data.upsert_record(record.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn skip_closing(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<SkipClosingRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&data, &claims).await?;
    let key = RecordKey::new(Local::now().date_naive(), &user.id, &request.shift_type);

    let mut record = {
        let records = data.records.read().await;
        lifecycle::materialize(&key, &records, &user)
    };
    lifecycle::skip_closing(&mut record);

    data.upsert_record(record.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}
