use actix_web::web;
use serde_json::json;

use lapoza_be::{AppData, AuthService, Config};

pub const PHOTO: &str = "data:image/png;base64,aGVsbG8=";

// Seed branch 1 sits at these coordinates with a 100 m radius.
pub const BRANCH_LAT: f64 = 10.7769;
pub const BRANCH_LNG: f64 = 106.7009;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_days: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        client_base_url: "http://localhost:3000".to_string(),
        verification_delay_ms: 0,
    }
}

pub fn test_app_data() -> (
    web::Data<AppData>,
    web::Data<AuthService>,
    web::Data<Config>,
) {
    let config = test_config();
    let data = web::Data::new(AppData::detached().expect("seeded app data"));
    let auth = web::Data::new(AuthService::new(config.clone()));
    (data, auth, web::Data::new(config))
}

/// Bearer token for one of the seeded accounts (`admin`, `quanly`, `nv1`).
pub async fn token_for(data: &AppData, auth: &AuthService, username: &str) -> String {
    let user = {
        let users = data.users.read().await;
        users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .unwrap_or_else(|| panic!("seed user {username} missing"))
    };
    auth.generate_token(&user).expect("token")
}

pub fn check_body(shift_type: &str) -> serde_json::Value {
    json!({
        "shiftType": shift_type,
        "lat": BRANCH_LAT,
        "lng": BRANCH_LNG,
        "photo": PHOTO,
    })
}

pub fn closing_body(shift_type: &str, cash: i64, transfer: i64) -> serde_json::Value {
    json!({
        "shiftType": shift_type,
        "data": {
            "totalBills": 10,
            "totalTransfer": transfer,
            "totalCash": cash,
            "totalDiscounts": 0,
            "discountsDetails": [],
            "openingBalance": 100000,
            "closingBalance": cash + 100000,
            "incidents": "",
            "customerFeedback": ""
        }
    })
}
