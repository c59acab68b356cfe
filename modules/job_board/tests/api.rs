//! REST surface of the job board, driven through the full host router
//! (middleware included) with `oneshot`.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};

use common::{test_module, PASSWORD};

fn router() -> Router {
    ApiIngress::new(ApiIngressConfig::default())
        .with_module(Arc::new(test_module()))
        .build_router()
        .unwrap()
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn register(router: &Router, email: &str, user_type: &str) -> (Value, String) {
    let (status, body) = call(
        router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": PASSWORD,
            "firstName": "Test",
            "lastName": "User",
            "userType": user_type,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let token = body["token"].as_str().unwrap().to_string();
    (body["user"].clone(), token)
}

async fn post_company(router: &Router, token: &str, name: &str) -> Value {
    let (status, body) = call(
        router,
        Method::POST,
        "/api/companies",
        Some(token),
        Some(json!({ "name": name, "industry": "Software" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn post_job(router: &Router, token: &str, company_id: &Value, title: &str) -> Value {
    let (status, body) = call(
        router,
        Method::POST,
        "/api/jobs",
        Some(token),
        Some(json!({
            "title": title,
            "description": "Backend services in Rust",
            "location": "Madrid, Spain",
            "jobType": "full_time",
            "experienceLevel": "senior",
            "minSalary": 50000,
            "maxSalary": 80000,
            "skills": ["Rust", "PostgreSQL"],
            "companyId": company_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn register_and_login() {
    let router = router();
    let (user, token) = register(&router, "ada@example.com", "job_seeker").await;
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["userType"], "job_seeker");
    assert!(user.get("password").is_none());
    assert!(!token.is_empty());

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user["id"]);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-one" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let router = router();
    register(&router, "dup@example.com", "employer").await;

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "dup@example.com",
            "password": PASSWORD,
            "firstName": "Other",
            "lastName": "Person",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn invalid_input_is_a_400_with_field_errors() {
    let router = router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "nope",
            "password": PASSWORD,
            "firstName": "A",
            "lastName": "B",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["message"], "Invalid input");
    assert_eq!(body["errors"][0]["field"], "email");

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "short@example.com",
            "password": "123",
            "firstName": "A",
            "lastName": "B",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "password");

    // Missing required fields
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    // Unknown enum value
    let (status, _) = call(
        &router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "role@example.com",
            "password": PASSWORD,
            "firstName": "A",
            "lastName": "B",
            "userType": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() {
    let router = router();
    let (user, token) = register(&router, "me@example.com", "job_seeker").await;

    let (status, body) = call(&router, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token required");

    let (status, body) = call(&router, Method::GET, "/api/auth/me", Some("junk"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, body) = call(&router, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user["id"]);
}

#[tokio::test]
async fn roles_are_enforced() {
    let router = router();
    let (_, seeker) = register(&router, "seeker@example.com", "job_seeker").await;
    let (_, boss) = register(&router, "boss@example.com", "employer").await;

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/companies",
        Some(&seeker),
        Some(json!({ "name": "Nope Inc" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only employers can create companies");

    let company = post_company(&router, &boss, "Acme").await;
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/jobs",
        Some(&seeker),
        Some(json!({
            "title": "Dev",
            "description": "Code",
            "location": "Remote",
            "jobType": "remote",
            "experienceLevel": "mid",
            "companyId": company["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only employers can create jobs");

    for path in ["/api/employer/jobs", "/api/employer/applications", "/api/my-companies"] {
        let (status, body) = call(&router, Method::GET, path, Some(&seeker), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(body["message"], "Access denied");
    }

    let (status, _) = call(&router, Method::GET, "/api/my-applications", Some(&boss), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn job_search_and_detail() {
    let router = router();
    let (_, boss) = register(&router, "boss@example.com", "employer").await;
    let company = post_company(&router, &boss, "Acme").await;
    let first = post_job(&router, &boss, &company["id"], "Rust Engineer").await;
    let second = post_job(&router, &boss, &company["id"], "Data Engineer").await;
    assert_eq!(first["isActive"], true);
    assert_eq!(first["employerId"], company["employerId"]);

    let (status, body) = call(&router, Method::GET, "/api/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], second["id"]);
    assert_eq!(rows[0]["company"]["name"], "Acme");

    let (_, body) = call(
        &router,
        Method::GET,
        "/api/jobs?search=rust%20engineer&jobType=full_time&minSalary=50000&skills=postgres,go&location=",
        None,
        None,
    )
    .await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], first["id"]);

    let (_, body) = call(&router, Method::GET, "/api/jobs?maxSalary=70000", None, None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = call(&router, Method::GET, "/api/jobs?minSalary=lots", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "minSalary");

    let (status, _) = call(&router, Method::GET, "/api/jobs?jobType=contract", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/jobs/{}", first["id"].as_str().unwrap());
    let (status, body) = call(&router, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust Engineer");
    assert_eq!(body["company"]["id"], company["id"]);

    let (status, body) = call(&router, Method::GET, "/api/jobs/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Job not found");
}

#[tokio::test]
async fn job_owner_can_edit_deactivate_and_delete() {
    let router = router();
    let (_, boss) = register(&router, "boss@example.com", "employer").await;
    let (_, rival) = register(&router, "rival@example.com", "employer").await;
    let company = post_company(&router, &boss, "Acme").await;
    let job = post_job(&router, &boss, &company["id"], "Dev").await;
    let uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());

    let (status, _) = call(
        &router,
        Method::PATCH,
        &uri,
        Some(&rival),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        Method::PATCH,
        &uri,
        Some(&boss),
        Some(json!({ "isActive": false, "title": "Senior Dev" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);
    assert_eq!(body["title"], "Senior Dev");

    let (_, body) = call(&router, Method::GET, "/api/jobs", None, None).await;
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = call(&router, Method::GET, "/api/employer/jobs", Some(&boss), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = call(&router, Method::DELETE, &uri, Some(&boss), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&router, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn posting_to_someone_elses_company_is_forbidden() {
    let router = router();
    let (_, boss) = register(&router, "boss@example.com", "employer").await;
    let (_, rival) = register(&router, "rival@example.com", "employer").await;
    let company = post_company(&router, &boss, "Acme").await;

    let (status, _) = call(
        &router,
        Method::POST,
        "/api/jobs",
        Some(&rival),
        Some(json!({
            "title": "Dev",
            "description": "Code",
            "location": "Remote",
            "jobType": "remote",
            "experienceLevel": "mid",
            "companyId": company["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn application_flow() {
    let router = router();
    let (_, boss) = register(&router, "boss@example.com", "employer").await;
    let (seeker_user, seeker) = register(&router, "seeker@example.com", "job_seeker").await;
    let company = post_company(&router, &boss, "Acme").await;
    let job = post_job(&router, &boss, &company["id"], "Dev").await;
    let job_id = job["id"].as_str().unwrap();
    let apply_uri = format!("/api/jobs/{job_id}/apply");

    // Body is optional
    let (status, app) = call(&router, Method::POST, &apply_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::CREATED, "{app}");
    assert_eq!(app["status"], "pending");
    assert_eq!(app["applicantId"], seeker_user["id"]);
    assert!(app["coverLetter"].is_null());

    let (status, body) = call(
        &router,
        Method::POST,
        &apply_uri,
        Some(&seeker),
        Some(json!({ "coverLetter": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Already applied to this job");

    let (status, body) = call(&router, Method::POST, &apply_uri, Some(&boss), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only job seekers can apply");

    let (_, mine) = call(&router, Method::GET, "/api/my-applications", Some(&seeker), None).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["job"]["id"], job["id"]);
    assert_eq!(mine[0]["job"]["company"]["name"], "Acme");

    let (_, received) = call(
        &router,
        Method::GET,
        "/api/employer/applications",
        Some(&boss),
        None,
    )
    .await;
    assert_eq!(received.as_array().unwrap().len(), 1);

    let (status, per_job) = call(
        &router,
        Method::GET,
        &format!("/api/jobs/{job_id}/applications"),
        Some(&boss),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(per_job[0]["id"], app["id"]);

    let app_uri = format!("/api/applications/{}", app["id"].as_str().unwrap());
    let (status, _) = call(
        &router,
        Method::PATCH,
        &app_uri,
        Some(&seeker),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        Method::PATCH,
        &app_uri,
        Some(&boss),
        Some(json!({ "status": "reviewing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reviewing");

    let (status, _) = call(
        &router,
        Method::PATCH,
        &app_uri,
        Some(&boss),
        Some(json!({ "status": "hired" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &router,
        Method::PATCH,
        "/api/applications/00000000-0000-0000-0000-000000000000",
        Some(&boss),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Application not found");
}

#[tokio::test]
async fn profile_patch_ignores_protected_fields() {
    let router = router();
    let (_, token) = register(&router, "me@example.com", "job_seeker").await;

    let (status, body) = call(
        &router,
        Method::PATCH,
        "/api/profile",
        Some(&token),
        Some(json!({
            "firstName": "Grace",
            "resumeUrl": "https://cv.example.com/grace.pdf",
            "profileData": { "languages": ["es", "en"] },
            "userType": "employer",
            "password": "hijacked",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Grace");
    assert_eq!(body["userType"], "job_seeker");
    assert_eq!(body["profileData"]["languages"][1], "en");

    let (status, _) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "me@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn companies_can_be_listed_and_updated_by_owner() {
    let router = router();
    let (_, boss) = register(&router, "boss@example.com", "employer").await;
    let company = post_company(&router, &boss, "Acme").await;

    let (_, mine) = call(&router, Method::GET, "/api/my-companies", Some(&boss), None).await;
    assert_eq!(mine[0]["id"], company["id"]);

    let uri = format!("/api/companies/{}", company["id"].as_str().unwrap());
    let (status, body) = call(
        &router,
        Method::PATCH,
        &uri,
        Some(&boss),
        Some(json!({ "website": "https://acme.example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["website"], "https://acme.example.com");
    assert_eq!(body["name"], "Acme");
}

#[tokio::test]
async fn patch_with_null_clears_optional_fields() {
    let router = router();
    let (_, boss) = register(&router, "boss@example.com", "employer").await;
    let company = post_company(&router, &boss, "Acme").await;
    let job = post_job(&router, &boss, &company["id"], "Dev").await;
    let job_uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());

    let (status, body) = call(
        &router,
        Method::PATCH,
        &job_uri,
        Some(&boss),
        Some(json!({ "minSalary": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["minSalary"].is_null());
    assert_eq!(body["maxSalary"], 80000);

    let (status, body) = call(
        &router,
        Method::PATCH,
        &job_uri,
        Some(&boss),
        Some(json!({ "maxSalary": null, "skills": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["maxSalary"].is_null());
    assert!(body["skills"].is_null());
    assert_eq!(body["title"], "Dev");

    let (_, body) = call(&router, Method::GET, &job_uri, None, None).await;
    assert!(body["minSalary"].is_null());
    assert!(body["skills"].is_null());

    let company_uri = format!("/api/companies/{}", company["id"].as_str().unwrap());
    let (status, body) = call(
        &router,
        Method::PATCH,
        &company_uri,
        Some(&boss),
        Some(json!({ "industry": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["industry"].is_null());
    assert_eq!(body["name"], "Acme");

    let (_, seeker) = register(&router, "ada@example.com", "job_seeker").await;
    let (status, body) = call(
        &router,
        Method::PATCH,
        "/api/profile",
        Some(&seeker),
        Some(json!({ "resumeUrl": "https://cv.example.com/ada" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["resumeUrl"], "https://cv.example.com/ada");

    let (status, body) = call(
        &router,
        Method::PATCH,
        "/api/profile",
        Some(&seeker),
        Some(json!({ "resumeUrl": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["resumeUrl"].is_null());
}

#[tokio::test]
async fn openapi_lists_job_board_routes_and_responses_carry_request_id() {
    let router = router();
    let (status, doc) = call(&router, Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/jobs"]["get"].is_object());
    assert!(doc["paths"]["/api/jobs/{id}/apply"]["post"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/jobs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
