#![allow(dead_code)]

use job_board::config::{JobBoardConfig, PasswordHashConfig};
use job_board::contract::model::{
    Company, ExperienceLevel, JobType, NewCompany, NewJob, NewUser, Principal, User, UserType,
};
use job_board::domain::service::Service;
use job_board::JobBoard;
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

/// Module config with cheap hashing so tests stay fast.
pub fn test_config() -> JobBoardConfig {
    JobBoardConfig {
        jwt_secret: "test-secret".to_string(),
        password_hash: PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..Default::default()
    }
}

pub fn test_module() -> JobBoard {
    JobBoard::from_config(&test_config()).unwrap()
}

pub fn new_user(email: &str, user_type: UserType) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        user_type,
        resume_url: None,
        profile_data: None,
    }
}

pub async fn sign_up(svc: &Service, email: &str, user_type: UserType) -> (User, Principal) {
    let session = svc.register(new_user(email, user_type)).await.unwrap();
    let principal = svc.authenticate(&session.token).unwrap();
    (session.user, principal)
}

pub async fn company(svc: &Service, owner: &Principal, name: &str) -> Company {
    svc.create_company(
        owner,
        NewCompany {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

pub fn new_job(company_id: Uuid, title: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        description: "Build and run backend services".to_string(),
        location: "Madrid, Spain".to_string(),
        job_type: JobType::FullTime,
        experience_level: ExperienceLevel::Mid,
        min_salary: Some(40_000),
        max_salary: Some(60_000),
        skills: Some(vec!["Rust".to_string(), "SQL".to_string()]),
        company_id,
    }
}
