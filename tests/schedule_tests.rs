use actix_web::{http::StatusCode, test, App};
use chrono::{Duration, Local};
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
async fn roster_is_visible_to_staff() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let staff = common::token_for(&data, &auth, "nv1").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/schedule")
        .insert_header(("Authorization", format!("Bearer {staff}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    // Seed roster has today's shift for staff_1 and manager_1.
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn toggle_adds_removes_and_logs() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let manager = common::token_for(&data, &auth, "quanly").await;
    let tomorrow = Local::now().date_naive() + Duration::days(1);

    let toggle = json!({
        "userId": "staff_1",
        "date": tomorrow,
        "shiftType": "SHIFT_2",
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/schedule/toggle")
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .set_json(&toggle)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let action = body["data"]["action"].as_str().unwrap();
    assert!(action.starts_with("Thêm Ca 2"), "got {action}");
    assert_eq!(data.assignments.read().await.len(), 3);

    // Same cell again removes the assignment.
    let req = test::TestRequest::post()
        .uri("/api/v1/schedule/toggle")
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .set_json(&toggle)
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body["data"]["action"].as_str().unwrap().starts_with("Xóa Ca 2"));
    assert_eq!(data.assignments.read().await.len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/schedule/logs")
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    let logs = body["data"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    // Newest first.
    assert!(logs[0]["action"].as_str().unwrap().starts_with("Xóa"));
}

#[actix_web::test]
async fn toggle_rejects_past_dates_and_staff_callers() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let manager = common::token_for(&data, &auth, "quanly").await;
    let staff = common::token_for(&data, &auth, "nv1").await;
    let yesterday = Local::now().date_naive() - Duration::days(1);

    let req = test::TestRequest::post()
        .uri("/api/v1/schedule/toggle")
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .set_json(json!({ "userId": "staff_1", "date": yesterday, "shiftType": "SHIFT_1" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/schedule/toggle")
        .insert_header(("Authorization", format!("Bearer {staff}")))
        .set_json(json!({ "userId": "staff_1", "date": yesterday, "shiftType": "SHIFT_1" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
async fn leave_requests_are_terminal_once_decided() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let staff = common::token_for(&data, &auth, "nv1").await;
    let manager = common::token_for(&data, &auth, "quanly").await;
    let tomorrow = Local::now().date_naive() + Duration::days(1);

    let req = test::TestRequest::post()
        .uri("/api/v1/requests")
        .insert_header(("Authorization", format!("Bearer {staff}")))
        .set_json(json!({
            "date": tomorrow,
            "type": "LEAVE",
            "reason": "Việc gia đình",
            "shiftType": "SHIFT_1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "PENDING");
    assert!(body["data"]["dayOfWeek"].as_str().is_some());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/requests/{id}/approve"))
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["status"], "APPROVED");

    // A second decision of either kind is rejected.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/requests/{id}/reject"))
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn staff_only_see_their_own_requests() {
    let (data, auth, config) = common::test_app_data();
    let app = app!(data, auth, config);
    let staff = common::token_for(&data, &auth, "nv1").await;
    let manager = common::token_for(&data, &auth, "quanly").await;
    let tomorrow = Local::now().date_naive() + Duration::days(1);

    for token in [&manager, &staff] {
        let req = test::TestRequest::post()
            .uri("/api/v1/requests")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "date": tomorrow, "type": "REGISTER", "reason": "Đăng ký thêm ca" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/requests")
        .insert_header(("Authorization", format!("Bearer {staff}")))
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/requests")
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
