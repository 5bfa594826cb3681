//! API router.
//!
//! Every resource mounts the same five-route CRUD surface; `PUT`/`DELETE`
//! are additionally reachable with `?id=` on the collection path. The
//! events surface is read-only. Middleware stack (outermost → innermost):
//! Extension(ApiContext) → Auth → Audit → Handler.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

macro_rules! crud {
    ($path:literal, $module:ident) => {
        Router::new()
            .route(
                $path,
                get(endpoints::$module::list)
                    .post(endpoints::$module::create)
                    .put(endpoints::$module::update_by_query)
                    .delete(endpoints::$module::remove_by_query),
            )
            .route(
                concat!($path, "/:id"),
                get(endpoints::$module::detail)
                    .put(endpoints::$module::update)
                    .delete(endpoints::$module::remove),
            )
    };
}

/// Build the full application router.
pub fn api_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(endpoints::auth::me))
        .merge(crud!("/users", users))
        .merge(crud!("/attorneys", attorneys))
        .merge(crud!("/case-managers", case_managers))
        .merge(crud!("/patients", patients))
        .merge(crud!("/payers", payers))
        .merge(crud!("/statuses", statuses))
        .merge(crud!("/doctors", doctors))
        .merge(crud!("/physicians", physicians))
        .merge(crud!("/facilities", facilities))
        .merge(crud!("/exams", exams))
        .merge(crud!("/sub-exams", sub_exams))
        .merge(crud!("/procedures", procedures))
        .merge(crud!("/appointments", appointments))
        .merge(crud!("/cases", cases))
        .merge(crud!("/tasks", tasks))
        .route("/events", get(endpoints::events::list))
        .route("/events/:id", get(endpoints::events::detail))
        .with_state(ctx.clone())
        // Innermost first: audit sees the response, auth runs before it.
        .layer(axum::middleware::from_fn(middleware::audit::record_mutations))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/auth/login", post(endpoints::auth::login))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::{hash_password, issue_token, verify_password, TokenKeys};
    use crate::db::repository;
    use crate::db::Database;
    use crate::models::enums::Role;
    use crate::models::{Payer, Status, User};

    struct TestApp {
        ctx: ApiContext,
        app: Router,
        _dir: tempfile::TempDir,
    }

    fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("router-test.db")).unwrap();
        let ctx = ApiContext::new(
            db,
            TokenKeys::from_secret(b"router-test-secret-0123456789abcdef"),
        );
        let app = api_router(ctx.clone());
        TestApp {
            ctx,
            app,
            _dir: dir,
        }
    }

    /// Insert a user row and mint a token for it. `password` is hashed when
    /// non-empty, stored empty otherwise (a no-login account).
    fn seed_user(ctx: &ApiContext, email: &str, role: Role, password: &str) -> (User, String) {
        let conn = ctx.db.connect().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            name: "Seeded User".into(),
            email: email.into(),
            password: if password.is_empty() {
                String::new()
            } else {
                hash_password(password).unwrap()
            },
            role,
            created_at: Utc::now(),
        };
        repository::insert_user(&conn, &user).unwrap();
        let token = issue_token(&ctx.keys, user.id, role).unwrap();
        (user, token)
    }

    fn seed_admin(ctx: &ApiContext) -> (User, String) {
        seed_user(ctx, "admin@clinic.test", Role::Admin, "")
    }

    fn seed_payer_and_status(ctx: &ApiContext) -> (Payer, Status) {
        let conn = ctx.db.connect().unwrap();
        let payer = Payer {
            id: Uuid::new_v4(),
            name: "Seed Payer".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        repository::insert_payer(&conn, &payer).unwrap();
        let status = Status {
            id: Uuid::new_v4(),
            name: "Seed Status".into(),
            color: None,
            created_at: Utc::now(),
        };
        repository::insert_status(&conn, &status).unwrap();
        (payer, status)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_is_open() {
        let t = test_app();
        let (status, body) = send(&t.app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let t = test_app();
        let (status, body) = send(&t.app, Method::GET, "/api/payers", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

        let (status, _) = send(
            &t.app,
            Method::POST,
            "/api/payers",
            None,
            Some(json!({"name": "BCBS"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_rejected() {
        let t = test_app();
        let (status, _) = send(
            &t.app,
            Method::GET,
            "/api/payers",
            Some("not-a-real-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cookie_carries_the_token_too() {
        let t = test_app();
        let (_, token) = seed_admin(&t.ctx);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/payers")
            .header(header::COOKIE, format!("Authorization={token}"))
            .body(Body::empty())
            .unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_round_trip() {
        let t = test_app();
        seed_user(&t.ctx, "front@clinic.test", Role::Staff, "letmein-123");

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "front@clinic.test", "password": "letmein-123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(body["user"]["email"], "front@clinic.test");

        let (status, me) = send(&t.app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "front@clinic.test");
        assert_eq!(me["role"], "STAFF");
    }

    #[tokio::test]
    async fn wrong_password_and_no_login_accounts_rejected() {
        let t = test_app();
        seed_user(&t.ctx, "front@clinic.test", Role::Staff, "letmein-123");
        seed_user(&t.ctx, "silent@law.test", Role::Attorney, "");

        let (status, _) = send(
            &t.app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "front@clinic.test", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Empty stored password must never verify, even against "".
        let (status, _) = send(
            &t.app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "silent@law.test", "password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn attorney_create_without_login_flag_creates_locked_user() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/attorneys",
            Some(&admin),
            Some(json!({
                "name": "Jane Doe",
                "email": "jane@x.com",
                "caseManagers": [{"name": "Sam Field", "email": "sam@x.com"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Jane Doe");
        assert_eq!(body["user"]["email"], "jane@x.com");
        assert_eq!(body["user"]["role"], "ATTORNEY");
        assert!(body["user"].get("password").is_none());
        assert_eq!(body["caseManagers"].as_array().unwrap().len(), 1);

        let conn = t.ctx.db.connect().unwrap();
        let user = repository::get_user_by_email(&conn, "jane@x.com")
            .unwrap()
            .unwrap();
        assert_eq!(user.password, "");
    }

    #[tokio::test]
    async fn attorney_mutations_are_owner_or_admin_only() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let (_, staff) = seed_user(&t.ctx, "staff@clinic.test", Role::Staff, "");

        let (_, body) = send(
            &t.app,
            Method::POST,
            "/api/attorneys",
            Some(&admin),
            Some(json!({"name": "Jane Doe", "email": "jane@doelaw.com"})),
        )
        .await;
        let attorney_id = body["id"].as_str().unwrap().to_string();
        let owner_id: Uuid = body["userId"].as_str().unwrap().parse().unwrap();
        let owner = issue_token(&t.ctx.keys, owner_id, Role::Attorney).unwrap();
        let (_, stranger) = seed_user(&t.ctx, "other@law.test", Role::Attorney, "");

        let uri = format!("/api/attorneys/{attorney_id}");
        let patch = json!({"city": "Lansing"});

        let (status, _) = send(&t.app, Method::PUT, &uri, Some(&stranger), Some(patch.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&t.app, Method::PUT, &uri, Some(&staff), Some(patch.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&t.app, Method::PUT, &uri, None, Some(patch.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&t.app, Method::PUT, &uri, Some(&owner), Some(patch)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], "Lansing");

        let (status, _) = send(
            &t.app,
            Method::PUT,
            &uri,
            Some(&admin),
            Some(json!({"state": "MI"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn attorney_password_update_rehashes_only_the_user() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (_, body) = send(
            &t.app,
            Method::POST,
            "/api/attorneys",
            Some(&admin),
            Some(json!({"name": "Jane Doe", "email": "jane@doelaw.com", "barNumber": "P81234"})),
        )
        .await;
        let attorney_id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &t.app,
            Method::PUT,
            &format!("/api/attorneys/{attorney_id}"),
            Some(&admin),
            Some(json!({"password": "fresh-secret-9"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["barNumber"], "P81234");

        let conn = t.ctx.db.connect().unwrap();
        let user = repository::get_user_by_email(&conn, "jane@doelaw.com")
            .unwrap()
            .unwrap();
        assert!(verify_password("fresh-secret-9", &user.password));
    }

    #[tokio::test]
    async fn attorney_delete_removes_user_and_managers() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (_, body) = send(
            &t.app,
            Method::POST,
            "/api/attorneys",
            Some(&admin),
            Some(json!({
                "name": "Jane Doe",
                "email": "jane@doelaw.com",
                "caseManagers": [{"name": "Sam Field"}]
            })),
        )
        .await;
        let attorney_id = body["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &t.app,
            Method::DELETE,
            &format!("/api/attorneys/{attorney_id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let conn = t.ctx.db.connect().unwrap();
        assert!(repository::get_user_by_email(&conn, "jane@doelaw.com")
            .unwrap()
            .is_none());
        assert!(repository::list_case_managers(&conn, None).unwrap().is_empty());

        let (status, _) = send(
            &t.app,
            Method::GET,
            &format!("/api/attorneys/{attorney_id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_payer_name_conflicts() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let body = json!({"name": "State Farm"});

        let (status, _) = send(&t.app, Method::POST, "/api/payers", Some(&admin), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&t.app, Method::POST, "/api/payers", Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["field"], "name");
    }

    #[tokio::test]
    async fn put_and_delete_accept_query_id() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (_, body) = send(
            &t.app,
            Method::POST,
            "/api/payers",
            Some(&admin),
            Some(json!({"name": "Progressive"})),
        )
        .await;
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &t.app,
            Method::PUT,
            &format!("/api/payers?id={id}"),
            Some(&admin),
            Some(json!({"isActive": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], false);

        let (status, body) = send(
            &t.app,
            Method::DELETE,
            &format!("/api/payers?id={id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], id);
    }

    #[tokio::test]
    async fn list_id_filter_narrows_to_one() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (_, first) = send(
            &t.app,
            Method::POST,
            "/api/payers",
            Some(&admin),
            Some(json!({"name": "Aetna"})),
        )
        .await;
        send(
            &t.app,
            Method::POST,
            "/api/payers",
            Some(&admin),
            Some(json!({"name": "Cigna"})),
        )
        .await;

        let id = first["id"].as_str().unwrap();
        let (status, body) = send(
            &t.app,
            Method::GET,
            &format!("/api/payers?id={id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Aetna");
    }

    #[tokio::test]
    async fn attorney_role_reads_but_cannot_mutate_backoffice() {
        let t = test_app();
        let (_, attorney) = seed_user(&t.ctx, "jane@doelaw.com", Role::Attorney, "");

        let (status, _) = send(&t.app, Method::GET, "/api/payers", Some(&attorney), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/payers",
            Some(&attorney),
            Some(json!({"name": "BCBS"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn patient_with_impossible_date_rejected() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let (payer, status_row) = seed_payer_and_status(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/patients",
            Some(&admin),
            Some(json!({
                "firstName": "Ana",
                "lastName": "Morales",
                "payerId": payer.id,
                "statusId": status_row.id,
                "dateOfBirth": "02/30/2024"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "dateOfBirth");
    }

    #[tokio::test]
    async fn patient_phone_stored_as_digits() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let (payer, status_row) = seed_payer_and_status(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/patients",
            Some(&admin),
            Some(json!({
                "firstName": "Ana",
                "lastName": "Morales",
                "payerId": payer.id,
                "statusId": status_row.id,
                "phone": "(616) 555-0142",
                "dateOfBirth": "03/12/1985"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phone"], "6165550142");
        assert_eq!(body["dateOfBirth"], "1985-03-12");
    }

    #[tokio::test]
    async fn missing_required_field_names_it() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let (payer, status_row) = seed_payer_and_status(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/patients",
            Some(&admin),
            Some(json!({
                "firstName": "   ",
                "lastName": "Morales",
                "payerId": payer.id,
                "statusId": status_row.id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION");
        assert_eq!(body["error"]["field"], "firstName");
    }

    #[tokio::test]
    async fn mutations_land_in_the_event_trail() {
        let t = test_app();
        let (admin_user, admin) = seed_admin(&t.ctx);

        send(
            &t.app,
            Method::POST,
            "/api/payers",
            Some(&admin),
            Some(json!({"name": "Allstate"})),
        )
        .await;

        let (status, body) = send(&t.app, Method::GET, "/api/events", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["action"], "POST /api/payers");
        assert_eq!(events[0]["userId"], admin_user.id.to_string());
    }

    #[tokio::test]
    async fn failed_mutations_are_not_audited() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        // 400: payer name missing
        send(
            &t.app,
            Method::POST,
            "/api/payers",
            Some(&admin),
            Some(json!({"name": "  "})),
        )
        .await;

        let (_, body) = send(&t.app, Method::GET, "/api/events", Some(&admin), None).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_ids_keep_the_error_envelope() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::GET,
            "/api/payers?id=not-a-uuid",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION");

        let (status, body) = send(
            &t.app,
            Method::GET,
            "/api/payers/not-a-uuid",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION");
        assert_eq!(body["error"]["field"], "id");
    }

    #[tokio::test]
    async fn query_addressed_patient_update_keeps_patient_scope() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let (payer, status_row) = seed_payer_and_status(&t.ctx);

        let (_, body) = send(
            &t.app,
            Method::POST,
            "/api/patients",
            Some(&admin),
            Some(json!({
                "firstName": "Ana",
                "lastName": "Morales",
                "payerId": payer.id,
                "statusId": status_row.id
            })),
        )
        .await;
        let patient_id = body["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &t.app,
            Method::PUT,
            &format!("/api/patients?id={patient_id}"),
            Some(&admin),
            Some(json!({"gender": "F"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &t.app,
            Method::GET,
            &format!("/api/events?patient_id={patient_id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["action"], "PUT /api/patients");
        assert_eq!(events[0]["patientId"], patient_id);
    }

    #[tokio::test]
    async fn get_missing_row_is_404() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let ghost = Uuid::new_v4();

        let (status, body) = send(
            &t.app,
            Method::GET,
            &format!("/api/doctors/{ghost}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn user_mutations_are_admin_only() {
        let t = test_app();
        let (_, staff) = seed_user(&t.ctx, "staff@clinic.test", Role::Staff, "");
        let (_, admin) = seed_admin(&t.ctx);

        let new_user = json!({
            "name": "New Staff",
            "email": "new@clinic.test",
            "password": "fresh-secret-1",
            "role": "STAFF"
        });
        let (status, _) = send(&t.app, Method::POST, "/api/users", Some(&staff), Some(new_user.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&t.app, Method::POST, "/api/users", Some(&admin), Some(new_user)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "STAFF");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn exam_create_nests_sub_exams() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/exams",
            Some(&admin),
            Some(json!({
                "name": "MRI",
                "category": "Imaging",
                "subExams": [
                    {"name": "MRI Lumbar", "price": 1450.0},
                    {"name": "MRI Cervical", "price": 1390.0}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subExams"].as_array().unwrap().len(), 2);

        let exam_id = body["id"].as_str().unwrap();
        let (status, body) = send(
            &t.app,
            Method::GET,
            &format!("/api/sub-exams?exam_id={exam_id}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn task_enum_validation_is_a_400() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);

        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/tasks",
            Some(&admin),
            Some(json!({"title": "Request records", "priority": "URGENT"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "priority");
    }

    #[tokio::test]
    async fn assigned_task_is_owner_gated() {
        let t = test_app();
        let (_, admin) = seed_admin(&t.ctx);
        let (assignee, assignee_token) = seed_user(&t.ctx, "owner@clinic.test", Role::Staff, "");
        let (_, other_staff) = seed_user(&t.ctx, "other@clinic.test", Role::Staff, "");

        let (_, body) = send(
            &t.app,
            Method::POST,
            "/api/tasks",
            Some(&admin),
            Some(json!({"title": "Call attorney", "assigneeId": assignee.id})),
        )
        .await;
        let uri = format!("/api/tasks/{}", body["id"].as_str().unwrap());

        let (status, _) = send(
            &t.app,
            Method::PUT,
            &uri,
            Some(&other_staff),
            Some(json!({"status": "COMPLETED"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &t.app,
            Method::PUT,
            &uri,
            Some(&assignee_token),
            Some(json!({"status": "COMPLETED"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "COMPLETED");
    }
}
