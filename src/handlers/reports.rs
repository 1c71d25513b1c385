use actix_web::{web, HttpResponse, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::auth::Claims;
use crate::domain::reconcile::{self, FinanceTotals};
use crate::domain::report::{self, AttendanceRow};
use crate::error::AppError;
use crate::handlers::records::RecordsQuery;
use crate::handlers::shared::ApiResponse;
use crate::models::{Assignment, Branch, ShiftRecord, User};
use crate::store::state::AppData;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub totals: FinanceTotals,
    pub rows: Vec<FinanceRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRow {
    pub record_id: String,
    pub user_name: Option<String>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub shift_type: String,
    pub cash: i64,
    pub transfer: i64,
    pub discounts: i64,
    pub is_confirmed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReportRow {
    pub user_name: String,
    pub date: NaiveDate,
    pub shift_name: String,
    #[serde(with = "crate::models::time_hm_opt")]
    pub check_in: Option<NaiveTime>,
    #[serde(with = "crate::models::time_hm_opt")]
    pub check_out: Option<NaiveTime>,
    pub working_hours: f64,
    pub status: String,
}

fn in_range(date: NaiveDate, query: &RecordsQuery) -> bool {
    query.from.is_none_or(|from| date >= from) && query.to.is_none_or(|to| date <= to)
}

fn record_matches(record: &ShiftRecord, query: &RecordsQuery) -> bool {
    in_range(record.date, query)
        && query
            .branch_id
            .as_ref()
            .is_none_or(|id| record.branch_id.as_ref() == Some(id))
}

/// Confirmed revenue over a date range. Manager and admin only; managers
/// are implicitly scoped to their branch.
pub async fn finance(
    data: web::Data<AppData>,
    claims: Claims,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let mut query = query.into_inner();
    if !claims.is_admin() && query.branch_id.is_none() {
        query.branch_id = claims.branch_id.clone();
    }

    let records = data.records.read().await;
    let selected: Vec<&ShiftRecord> = records
        .iter()
        .filter(|r| r.closing_data.is_some() || r.adjusted_closing_data.is_some())
        .filter(|r| record_matches(r, &query))
        .collect();

    let totals = reconcile::aggregate(selected.iter().copied());
    let rows = selected
        .iter()
        .map(|r| FinanceRow {
            record_id: r.id.clone(),
            user_name: r.user_name.clone(),
            date: r.date,
            shift_type: r.shift_type.clone(),
            cash: reconcile::confirmed_cash(r),
            transfer: reconcile::confirmed_transfer(r),
            discounts: r.closing_data.as_ref().map_or(0, |c| c.total_discounts),
            is_confirmed: r.is_confirmed,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(FinanceReport { totals, rows })))
}

/// One row per assignment in range: the stored record where one exists,
/// a derived Absent/Pending status where none does.
async fn attendance_rows(
    data: &AppData,
    claims: &Claims,
    query: &RecordsQuery,
) -> Result<Vec<AttendanceRow>, AppError> {
    let as_of = Local::now().date_naive();
    let assignments = data.assignments.read().await;
    let records = data.records.read().await;
    let users = data.users.read().await;
    let branches = data.branches.read().await;

    let scoped: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| in_range(a.date, query))
        .filter(|a| {
            if claims.is_manager_or_admin() {
                query.user_id.as_ref().is_none_or(|id| &a.user_id == id)
            } else {
                a.user_id == claims.sub
            }
        })
        .collect();

    let mut rows = Vec::with_capacity(scoped.len());
    for assignment in scoped {
        let user: Option<&User> = users.iter().find(|u| u.id == assignment.user_id);
        let Some(user) = user else {
            continue;
        };
        let branch: Option<&Branch> = user
            .branch_id
            .as_ref()
            .and_then(|id| branches.iter().find(|b| &b.id == id))
            .or_else(|| branches.first());

        let key = crate::domain::lifecycle::RecordKey::for_assignment(assignment);
        let record = records.iter().find(|r| r.id == key.record_id());
        let status = report::derive_display_status(record, assignment.date, as_of);

        rows.push(AttendanceRow {
            user_name: user.name.clone(),
            date: assignment.date,
            shift_name: branch
                .map(|b| b.shift_name(&assignment.shift_type))
                .unwrap_or_else(|| assignment.shift_type.clone()),
            check_in: record.and_then(|r| r.check_in_time),
            check_out: record.and_then(|r| r.check_out_time),
            status,
        });
    }
    Ok(rows)
}

pub async fn attendance(
    data: web::Data<AppData>,
    claims: Claims,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse> {
    let rows = attendance_rows(&data, &claims, &query).await?;
    let rows: Vec<AttendanceReportRow> = rows
        .into_iter()
        .map(|row| AttendanceReportRow {
            working_hours: report::working_hours(row.check_in, row.check_out),
            user_name: row.user_name,
            date: row.date,
            shift_name: row.shift_name,
            check_in: row.check_in,
            check_out: row.check_out,
            status: row.status.label().to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(rows)))
}

pub async fn attendance_export(
    data: web::Data<AppData>,
    claims: Claims,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse> {
    claims.require_manager_or_admin()?;
    let rows = attendance_rows(&data, &claims, &query).await?;
    let csv = report::export_csv(&rows);

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"bao-cao-cham-cong.csv\"",
        ))
        .body(csv))
}
