//! In-process stand-in for the defect-control backend.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use actix_multipart::Multipart;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::{json, Value};

use defect_control::{ApiClient, AppConfig, Session};

pub const ENGINEER_ID: i64 = 7;
pub const OTHER_ENGINEER_ID: i64 = 8;
pub const MANAGER_ID: i64 = 1;
pub const OBSERVER_ID: i64 = 5;

pub struct MockState {
    pub defects: Mutex<BTreeMap<i64, Value>>,
    pub requests: Mutex<Vec<String>>,
}

impl MockState {
    fn new() -> Self {
        let mut defects = BTreeMap::new();
        defects.insert(1, defect_json(1, "new", ENGINEER_ID, Some(OTHER_ENGINEER_ID)));
        defects.insert(2, defect_json(2, "in_progress", OTHER_ENGINEER_ID, Some(ENGINEER_ID)));
        defects.insert(3, defect_json(3, "closed", ENGINEER_ID, None));
        defects.insert(4, defect_json(4, "on_review", OTHER_ENGINEER_ID, None));
        MockState {
            defects: Mutex::new(defects),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, line: String) {
        self.requests.lock().unwrap().push(line);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn user_json(id: i64) -> Value {
    let (role, role_id) = match id {
        MANAGER_ID => ("manager", 2),
        OBSERVER_ID => ("observer", 3),
        _ => ("engineer", 1),
    };
    json!({
        "id": id,
        "email": format!("{}{}@site.test", role, id),
        "full_name": format!("{} {}", role, id),
        "role_id": role_id,
        "role_name": role,
        "created_at": "2024-01-10T08:00:00Z"
    })
}

pub fn defect_json(id: i64, status: &str, author_id: i64, assignee_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "title": format!("Defect {}", id),
        "description": "Found during inspection",
        "status": status,
        "priority": "high",
        "deadline": "2024-02-01T00:00:00Z",
        "project_id": 1,
        "author_id": author_id,
        "assignee_id": assignee_id,
        "created_at": "2024-01-15T10:00:00Z",
        "updated_at": "2024-01-20T10:00:00Z"
    })
}

fn ok(message: &str, data: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": message, "data": data }))
}

fn fail(status: actix_web::http::StatusCode, error: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "success": false, "error": error }))
}

fn token_for(id: i64) -> String {
    format!("token-{}", id)
}

fn caller(auth: &BearerAuth) -> Option<i64> {
    auth.token()
        .strip_prefix("token-")
        .and_then(|id| id.parse().ok())
        .filter(|id| [ENGINEER_ID, OTHER_ENGINEER_ID, MANAGER_ID, OBSERVER_ID].contains(id))
}

macro_rules! authorize {
    ($auth:expr) => {
        match caller(&$auth) {
            Some(id) => id,
            None => {
                return fail(
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "Invalid token",
                )
            }
        }
    };
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(state: web::Data<MockState>, body: web::Json<LoginBody>) -> HttpResponse {
    state.record(format!("POST /auth/login {}", body.email));
    if body.password != "secret1" {
        return fail(
            actix_web::http::StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        );
    }
    let id = if body.email.starts_with("manager") {
        MANAGER_ID
    } else if body.email.starts_with("observer") {
        OBSERVER_ID
    } else {
        ENGINEER_ID
    };
    ok(
        "Login successful",
        json!({ "token": token_for(id), "user": user_json(id) }),
    )
}

async fn register(body: web::Json<Value>) -> HttpResponse {
    if body["email"] == "taken@site.test" {
        return HttpResponse::Ok()
            .json(json!({ "success": false, "message": "User already exists" }));
    }
    let mut user = user_json(42);
    user["email"] = body["email"].clone();
    ok("User registered successfully", json!({ "user": user }))
}

async fn logout(state: web::Data<MockState>) -> HttpResponse {
    state.record("POST /auth/logout".to_string());
    HttpResponse::Ok().json(json!({ "success": true, "message": "Logged out" }))
}

async fn me(auth: BearerAuth) -> HttpResponse {
    let id = authorize!(auth);
    ok("User data retrieved successfully", json!({ "user": user_json(id) }))
}

async fn list_defects(
    req: HttpRequest,
    state: web::Data<MockState>,
    auth: BearerAuth,
) -> HttpResponse {
    authorize!(auth);
    state.record(format!("GET /api/defects?{}", req.query_string()));
    let defects: Vec<Value> = state.defects.lock().unwrap().values().cloned().collect();
    let total = defects.len();
    ok(
        "Defects retrieved successfully",
        json!({
            "defects": defects,
            "pagination": { "page": 1, "page_size": 20, "total": total, "total_pages": 1 }
        }),
    )
}

async fn get_defect(
    path: web::Path<i64>,
    state: web::Data<MockState>,
    auth: BearerAuth,
) -> HttpResponse {
    authorize!(auth);
    let id = path.into_inner();
    if id == 500 {
        return fail(
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Database operation failed",
        );
    }
    match state.defects.lock().unwrap().get(&id) {
        Some(defect) => ok("Defect retrieved", json!({ "defect": defect })),
        None => fail(actix_web::http::StatusCode::NOT_FOUND, "Defect not found"),
    }
}

async fn patch_status(
    path: web::Path<i64>,
    state: web::Data<MockState>,
    auth: BearerAuth,
    body: web::Json<Value>,
) -> HttpResponse {
    authorize!(auth);
    let id = path.into_inner();
    let status = body["status"].as_str().unwrap_or_default().to_string();
    state.record(format!("PATCH /api/defects/{}/status {}", id, status));
    let mut defects = state.defects.lock().unwrap();
    match defects.get_mut(&id) {
        Some(defect) => {
            defect["status"] = json!(status);
            ok("Defect status updated successfully", json!({ "defect": defect }))
        }
        None => fail(actix_web::http::StatusCode::NOT_FOUND, "Defect not found"),
    }
}

async fn put_defect(
    path: web::Path<i64>,
    state: web::Data<MockState>,
    auth: BearerAuth,
    body: web::Json<Value>,
) -> HttpResponse {
    authorize!(auth);
    let id = path.into_inner();
    state.record(format!("PUT /api/defects/{} {}", id, body.0));
    let mut defects = state.defects.lock().unwrap();
    match defects.get_mut(&id) {
        Some(defect) => {
            if let Some(fields) = body.as_object() {
                for (key, value) in fields {
                    defect[key] = value.clone();
                }
            }
            ok("Defect updated successfully", json!({ "defect": defect }))
        }
        None => fail(actix_web::http::StatusCode::NOT_FOUND, "Defect not found"),
    }
}

async fn delete_defect(
    path: web::Path<i64>,
    state: web::Data<MockState>,
    auth: BearerAuth,
) -> HttpResponse {
    authorize!(auth);
    let id = path.into_inner();
    state.record(format!("DELETE /api/defects/{}", id));
    state.defects.lock().unwrap().remove(&id);
    HttpResponse::Ok().json(json!({ "success": true, "message": "Defect deleted successfully" }))
}

async fn comments(path: web::Path<i64>, auth: BearerAuth) -> HttpResponse {
    authorize!(auth);
    let defect_id = path.into_inner();
    ok(
        "Comments retrieved",
        json!({
            "comments": [{
                "id": 1,
                "text": "Checked on site",
                "defect_id": defect_id,
                "author_id": MANAGER_ID,
                "created_at": "2024-01-16T09:00:00Z",
                "author": user_json(MANAGER_ID)
            }]
        }),
    )
}

async fn create_comment(
    path: web::Path<i64>,
    state: web::Data<MockState>,
    auth: BearerAuth,
    body: web::Json<Value>,
) -> HttpResponse {
    let author_id = authorize!(auth);
    let defect_id = path.into_inner();
    state.record(format!("POST /api/comments/defect/{}", defect_id));
    ok(
        "Comment created",
        json!({
            "comment": {
                "id": 2,
                "text": body["text"],
                "defect_id": body["defect_id"],
                "author_id": author_id,
                "created_at": "2024-01-17T09:00:00Z"
            }
        }),
    )
}

async fn attachments(path: web::Path<i64>, auth: BearerAuth) -> HttpResponse {
    authorize!(auth);
    let _defect_id = path.into_inner();
    ok(
        "Attachments retrieved",
        json!({
            "attachments": [{
                "id": 9,
                "filename": "crack.jpg",
                "file_size": 2048,
                "mime_type": "image/jpeg",
                "uploaded_by": ENGINEER_ID,
                "created_at": "2024-01-16T10:00:00Z"
            }]
        }),
    )
}

async fn upload(
    path: web::Path<i64>,
    state: web::Data<MockState>,
    auth: BearerAuth,
    mut payload: Multipart,
) -> HttpResponse {
    let uploader = authorize!(auth);
    let defect_id = path.into_inner();

    let mut file_name = String::new();
    let mut mime_type = String::new();
    let mut size = 0usize;
    while let Ok(Some(mut field)) = payload.try_next().await {
        if let Some(name) = field.content_disposition().and_then(|cd| cd.get_filename()) {
            file_name = name.to_string();
        }
        mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_default();
        while let Ok(Some(chunk)) = field.try_next().await {
            size += chunk.len();
        }
    }
    state.record(format!(
        "POST /api/attachments/defect/{} {} {} {}",
        defect_id, file_name, mime_type, size
    ));

    ok(
        "File uploaded",
        json!({
            "attachment": {
                "id": 10,
                "filename": file_name,
                "file_size": size,
                "mime_type": mime_type,
                "uploaded_by": uploader,
                "created_at": "2024-01-18T10:00:00Z"
            }
        }),
    )
}

async fn download(path: web::Path<i64>, auth: BearerAuth) -> HttpResponse {
    authorize!(auth);
    let id = path.into_inner();
    HttpResponse::Ok()
        .content_type("image/jpeg")
        .body(format!("attachment-{}", id))
}

async fn defects_report(
    req: HttpRequest,
    state: web::Data<MockState>,
    auth: BearerAuth,
) -> HttpResponse {
    authorize!(auth);
    state.record(format!("GET /api/reports/defects?{}", req.query_string()));
    ok(
        "Defects report generated successfully",
        json!({
            "report": {
                "total_defects": 4,
                "defects_by_status": [
                    { "status": "new", "count": 1 },
                    { "status": "in_progress", "count": 1 },
                    { "status": "on_review", "count": 1 },
                    { "status": "closed", "count": 1 }
                ],
                "defects_by_priority": [{ "priority": "high", "count": 4 }],
                "overdue_defects": 3,
                "avg_resolution_time": 120.0
            }
        }),
    )
}

async fn export_csv(
    req: HttpRequest,
    state: web::Data<MockState>,
    auth: BearerAuth,
) -> HttpResponse {
    authorize!(auth);
    state.record(format!("GET /api/reports/defects/export?{}", req.query_string()));
    let body = format!("ID,Title,Status\n1,Defect 1,new\n# {}\n", req.query_string());
    HttpResponse::Ok().content_type("text/csv").body(body)
}

async fn engineers(auth: BearerAuth) -> HttpResponse {
    authorize!(auth);
    ok(
        "Engineers retrieved successfully",
        json!({ "engineers": [user_json(ENGINEER_ID), user_json(OTHER_ENGINEER_ID)] }),
    )
}

// No managers match: the list arrives as null, not [].
async fn managers(auth: BearerAuth) -> HttpResponse {
    authorize!(auth);
    ok("Managers retrieved successfully", json!({ "managers": null }))
}

async fn create_project(auth: BearerAuth, body: web::Json<Value>) -> HttpResponse {
    let id = authorize!(auth);
    if id != MANAGER_ID {
        return fail(actix_web::http::StatusCode::FORBIDDEN, "Access denied");
    }
    ok(
        "Project created",
        json!({
            "project": {
                "id": 12,
                "name": body["name"],
                "description": body["description"],
                "manager_id": body["manager_id"],
                "created_at": "2024-01-01T00:00:00Z"
            }
        }),
    )
}

async fn get_project(path: web::Path<i64>, auth: BearerAuth) -> HttpResponse {
    authorize!(auth);
    let id = path.into_inner();
    if id != 1 {
        return fail(actix_web::http::StatusCode::NOT_FOUND, "Project not found");
    }
    ok(
        "Project retrieved",
        json!({
            "project": {
                "id": 1,
                "name": "Residential block A",
                "description": "",
                "manager_id": MANAGER_ID,
                "manager": user_json(MANAGER_ID),
                "created_at": "2024-01-01T00:00:00Z"
            }
        }),
    )
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/register", web::post().to(register))
            .route("/logout", web::post().to(logout)),
    )
    .service(
        web::scope("/api")
            .route("/me", web::get().to(me))
            .route("/defects", web::get().to(list_defects))
            .route("/defects/{id}", web::get().to(get_defect))
            .route("/defects/{id}", web::put().to(put_defect))
            .route("/defects/{id}", web::delete().to(delete_defect))
            .route("/defects/{id}/status", web::patch().to(patch_status))
            .route("/comments/defect/{id}", web::get().to(comments))
            .route("/comments/defect/{id}", web::post().to(create_comment))
            .route("/attachments/defect/{id}", web::get().to(attachments))
            .route("/attachments/defect/{id}", web::post().to(upload))
            .route("/attachments/{id}/download", web::get().to(download))
            .route("/reports/defects", web::get().to(defects_report))
            .route("/reports/defects/export", web::get().to(export_csv))
            .route("/users/engineers", web::get().to(engineers))
            .route("/users/managers", web::get().to(managers))
            .route("/projects", web::post().to(create_project))
            .route("/projects/{id}", web::get().to(get_project)),
    );
}

/// Start the mock on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> (String, web::Data<MockState>) {
    let state = web::Data::new(MockState::new());
    let app_state = state.clone();

    let server = HttpServer::new(move || App::new().app_data(app_state.clone()).configure(routes))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock backend");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (format!("http://{}", addr), state)
}

pub fn client_for(base_url: &str, session: Session) -> ApiClient {
    let config = AppConfig::default().with_base_url(base_url);
    ApiClient::new(config, session).expect("build client")
}

pub fn token(id: i64) -> String {
    token_for(id)
}

pub fn user(id: i64) -> defect_control::models::User {
    serde_json::from_value(user_json(id)).unwrap()
}

/// Client already logged in as `id`, without a login round trip.
pub fn logged_in_client(base_url: &str, id: i64) -> ApiClient {
    let session = Session::in_memory();
    session.login(token(id), user(id)).unwrap();
    client_for(base_url, session)
}
