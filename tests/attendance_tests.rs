use actix_web::{http::StatusCode, test, App};
use pretty_assertions::assert_eq;
use serde_json::json;

use lapoza_be::routes;

mod common;

macro_rules! app {
    ($data:expr, $auth:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data($data.clone())
                .app_data($auth.clone())
                .app_data($config.clone())
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn today_lists_assigned_shifts_as_pending() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/attendance/today")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let shifts = body["data"].as_array().expect("array of shifts");
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0]["type"], "SHIFT_1");
    assert_eq!(shifts[0]["status"], "PENDING");
    assert!(shifts[0]["id"].as_str().unwrap().starts_with("s-"));
}

#[actix_web::test]
async fn check_in_inside_fence_records_photo_and_status() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(common::check_body("SHIFT_1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let record = &body["data"];
    assert_eq!(record["status"], "PENDING");
    assert_eq!(record["checkInPhoto"], common::PHOTO);
    assert!(record["checkInTime"].as_str().is_some());
    assert!(matches!(
        record["checkInStatus"].as_str(),
        Some("ON_TIME") | Some("LATE")
    ));

    // Second check-in on the same shift conflicts.
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(common::check_body("SHIFT_1"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );
}

#[actix_web::test]
async fn check_in_outside_fence_is_rejected_with_distance() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "shiftType": "SHIFT_1",
            "lat": common::BRANCH_LAT + 0.01,
            "lng": common::BRANCH_LNG,
            "photo": common::PHOTO,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("cách chi nhánh"));

    // Nothing was persisted.
    assert!(data.records.read().await.is_empty());
}

#[actix_web::test]
async fn check_in_without_coordinates_is_rejected() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "shiftType": "SHIFT_1", "photo": common::PHOTO }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn check_out_completes_the_shift() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    // Check-out before check-in is a conflict.
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-out")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(common::check_body("SHIFT_1"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(common::check_body("SHIFT_1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-out")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(common::check_body("SHIFT_1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert!(body["data"]["checkOutTime"].as_str().is_some());
}

#[actix_web::test]
async fn closing_report_completes_and_normalizes_discounts() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    let mut body = common::closing_body("SHIFT_1", 500_000, 200_000);
    body["data"]["totalDiscounts"] = json!(999_999);
    body["data"]["discountsDetails"] = json!([
        { "billId": "B01", "reason": "Voucher", "amount": 20000 }
    ]);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/closing")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["closingData"]["totalDiscounts"], 20_000);
}

#[actix_web::test]
async fn skipping_the_closing_still_completes() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let token = common::token_for(&data, &auth, "nv1").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/closing/skip")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "shiftType": "SHIFT_1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert!(body["data"].get("closingData").is_none());
}
