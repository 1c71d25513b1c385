use actix_web::web;

use crate::handlers::{admin, attendance, auth, records, reports, requests, schedule};

/// Full API surface under `/api/v1`. Shared between the server binary and
/// the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/change-password", web::post().to(auth::change_password)),
            )
            .service(
                web::scope("/attendance")
                    .route("/today", web::get().to(attendance::today))
                    .route("/check-in", web::post().to(attendance::check_in))
                    .route("/check-out", web::post().to(attendance::check_out))
                    .route("/closing", web::post().to(attendance::submit_closing))
                    .route("/closing/skip", web::post().to(attendance::skip_closing)),
            )
            .service(
                web::scope("/records")
                    .route("", web::get().to(records::list))
                    .route("/{id}", web::get().to(records::get))
                    .route("/{id}/closing", web::post().to(records::manager_closing))
                    .route("/{id}/approve", web::post().to(records::approve)),
            )
            .service(
                web::scope("/reports")
                    .route("/finance", web::get().to(reports::finance))
                    .route("/attendance", web::get().to(reports::attendance))
                    .route(
                        "/attendance/export",
                        web::get().to(reports::attendance_export),
                    ),
            )
            .service(
                web::scope("/schedule")
                    .route("", web::get().to(schedule::list))
                    .route("/toggle", web::post().to(schedule::toggle))
                    .route("/logs", web::get().to(schedule::logs)),
            )
            .service(
                web::scope("/requests")
                    .route("", web::post().to(requests::create))
                    .route("", web::get().to(requests::list))
                    .route("/{id}/approve", web::post().to(requests::approve))
                    .route("/{id}/reject", web::post().to(requests::reject)),
            )
            .service(
                web::scope("/admin")
                    .route("/branches", web::get().to(admin::get_branches))
                    .route("/branches", web::post().to(admin::create_branch))
                    .route("/branches/{id}", web::put().to(admin::update_branch))
                    .route("/users", web::get().to(admin::get_users))
                    .route("/users", web::post().to(admin::create_user))
                    .route("/users/{id}", web::put().to(admin::update_user))
                    .route("/users/{id}", web::delete().to(admin::delete_user))
                    .route("/regulations", web::get().to(admin::get_regulations))
                    .route("/regulations/{id}", web::put().to(admin::update_regulation)),
            )
            .service(
                web::scope("/regulations")
                    .route("/{id}/ack", web::post().to(admin::acknowledge_regulation)),
            )
            .service(
                web::scope("/notifications")
                    .route("", web::get().to(admin::get_notifications))
                    .route("", web::post().to(admin::create_notification)),
            ),
    );
}
