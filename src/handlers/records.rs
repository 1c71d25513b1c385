use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::Claims;
use crate::domain::lifecycle;
use crate::domain::reconcile;
use crate::error::AppError;
use crate::handlers::attendance::current_user;
use crate::handlers::shared::ApiResponse;
use crate::models::{ShiftClosingData, ShiftRecord};
use crate::store::state::AppData;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub branch_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerClosingRequest {
    pub data: ShiftClosingData,
}

/// Reconciliation input. The adjusted amounts arrive as free text exactly
/// as the manager typed them ("1.500.000 đ") and are sanitized here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub adjusted_cash: Option<String>,
    pub adjusted_transfer: Option<String>,
    pub comment: Option<String>,
}

/// Staff see their own records; managers see their branch; admins see all.
fn visible_to(claims: &Claims, record: &ShiftRecord) -> bool {
    if claims.is_admin() {
        return true;
    }
    if claims.is_manager_or_admin() {
        return claims.branch_id == record.branch_id;
    }
    record.user_id == claims.sub
}

pub async fn list(
    data: web::Data<AppData>,
    claims: Claims,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse> {
    let records = data.records.read().await;
    let filtered: Vec<ShiftRecord> = records
        .iter()
        .filter(|r| visible_to(&claims, r))
        .filter(|r| query.from.is_none_or(|from| r.date >= from))
        .filter(|r| query.to.is_none_or(|to| r.date <= to))
        .filter(|r| {
            query
                .branch_id
                .as_ref()
                .is_none_or(|id| r.branch_id.as_ref() == Some(id))
        })
        .filter(|r| query.user_id.as_ref().is_none_or(|id| &r.user_id == id))
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(filtered)))
}

pub async fn get(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let records = data.records.read().await;
    let record = records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy ca trực {}.", id)))?;

    if !visible_to(&claims, record) {
        return Err(AppError::PermissionDenied(
            "Bạn không có quyền xem ca trực này.".to_string(),
        )
        .into());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(record.clone())))
}

/// Manager-assisted late closing for a shift whose staff skipped the
/// report. Leaves an audit entry naming the manager.
pub async fn manager_closing(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
    request: web::Json<ManagerClosingRequest>,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let manager = current_user(&data, &claims).await?;

    let id = path.into_inner();
    let mut record = {
        let records = data.records.read().await;
        records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy ca trực {}.", id)))?
    };

    lifecycle::manager_attach_closing(&mut record, request.into_inner().data, &manager.name)
        .map_err(AppError::Lifecycle)?;

    data.upsert_record(record.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

/// Reconcile-and-approve. Approving again later only grows the audit
/// trail; the original confirmation is never rewritten.
pub async fn approve(
    data: web::Data<AppData>,
    claims: Claims,
    path: web::Path<String>,
    request: web::Json<ApproveRequest>,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let manager = current_user(&data, &claims).await?;
    let request = request.into_inner();

    let id = path.into_inner();
    let mut record = {
        let records = data.records.read().await;
        records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy ca trực {}.", id)))?
    };
    if record.closing_data.is_none() {
        return Err(AppError::BadRequest(
            "Ca trực chưa có dữ liệu chốt ca để đối soát.".to_string(),
        )
        .into());
    }

    let adjusted_cash = request
        .adjusted_cash
        .as_deref()
        .map(reconcile::parse_currency);
    let adjusted_transfer = request
        .adjusted_transfer
        .as_deref()
        .map(reconcile::parse_currency);
    let comment = request.comment.filter(|c| !c.trim().is_empty());

    reconcile::approve(
        &mut record,
        &manager.name,
        adjusted_cash,
        adjusted_transfer,
        comment,
    );

    data.upsert_record(record.clone()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}
