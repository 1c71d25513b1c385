use actix_web::{web, HttpResponse, Result};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::auth::Claims;
use crate::domain::schedule as roster;
use crate::error::AppError;
use crate::handlers::attendance::{branch_for_user, current_user};
use crate::handlers::shared::ApiResponse;
use crate::models::Assignment;
use crate::store::state::AppData;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub user_id: String,
    pub date: NaiveDate,
    pub shift_type: String,
}

/// The roster is visible to everyone signed in; staff need it to see who
/// they share a shift with.
pub async fn list(
    data: web::Data<AppData>,
    _claims: Claims,
    query: web::Query<ScheduleQuery>,
) -> Result<HttpResponse> {
    let assignments = data.assignments.read().await;
    let filtered: Vec<Assignment> = assignments
        .iter()
        .filter(|a| query.from.is_none_or(|from| a.date >= from))
        .filter(|a| query.to.is_none_or(|to| a.date <= to))
        .filter(|a| query.user_id.as_ref().is_none_or(|id| &a.user_id == id))
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(filtered)))
}

pub async fn toggle(
    data: web::Data<AppData>,
    claims: Claims,
    request: web::Json<ToggleRequest>,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let editor = current_user(&data, &claims).await?;
    let request = request.into_inner();

    let staff = {
        let users = data.users.read().await;
        users
            .iter()
            .find(|u| u.id == request.user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Không tìm thấy nhân viên.".to_string()))?
    };
    let shift_name = branch_for_user(&data, &staff)
        .await?
        .shift_name(&request.shift_type);

    let outcome = {
        let mut assignments = data.assignments.write().await;
        roster::toggle_assignment(
            &mut assignments,
            &request.user_id,
            request.date,
            &request.shift_type,
            &editor.id,
            Local::now().date_naive(),
        )
        .map_err(AppError::Schedule)?
    };

    let entry = roster::log_entry(outcome, &editor.name, &staff.name, &shift_name, request.date);
    log::info!("Schedule change by {}: {}", editor.username, entry.action);
    {
        let mut logs = data.schedule_logs.write().await;
        logs.insert(0, entry.clone());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn logs(data: web::Data<AppData>, claims: Claims) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let logs = data.schedule_logs.read().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(logs.clone())))
}
