//! Business rules of the job board service, exercised against the in-memory
//! store with real Argon2 and JWT adapters.

mod common;

use std::sync::Arc;

use tracing_test::traced_test;
use uuid::Uuid;

use job_board::contract::client::JobBoardApi;
use job_board::contract::error::JobBoardError;
use job_board::contract::model::{
    ApplicationPatch, ApplicationStatus, CompanyPatch, JobFilter, JobPatch, UserPatch, UserType,
};
use job_board::domain::error::DomainError;
use job_board::domain::repo::JobBoardRepository;
use job_board::infra::storage::InMemoryRepository;
use job_board::JobBoard;

use common::{company, new_job, new_user, sign_up, test_config, test_module, PASSWORD};

#[traced_test]
#[tokio::test]
async fn register_hashes_password_and_issues_usable_token() {
    let repo = Arc::new(InMemoryRepository::new());
    let module = JobBoard::with_repository(&test_config(), repo.clone()).unwrap();
    let svc = module.service();

    let session = svc
        .register(new_user("ada@example.com", UserType::Employer))
        .await
        .unwrap();
    assert_eq!(session.user.user_type, UserType::Employer);

    let principal = svc.authenticate(&session.token).unwrap();
    assert_eq!(principal.user_id, session.user.id);
    assert!(principal.is_employer());

    let stored = repo
        .get_user_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert_ne!(stored.password_hash, PASSWORD);

    assert!(logs_contain("Successfully registered user"));
}

#[tokio::test]
async fn default_role_is_job_seeker() {
    let svc = test_module().service();
    let mut user = new_user("seeker@example.com", UserType::default());
    user.resume_url = Some("https://cv.example.com/seeker.pdf".into());
    let session = svc.register(user).await.unwrap();
    assert_eq!(session.user.user_type, UserType::JobSeeker);
    assert!(session.user.resume_url.is_some());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let svc = test_module().service();
    sign_up(&svc, "dup@example.com", UserType::JobSeeker).await;

    let err = svc
        .register(new_user("dup@example.com", UserType::Employer))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));
    assert_eq!(err.to_string(), "User already exists");
}

#[tokio::test]
async fn registration_input_is_validated() {
    let svc = test_module().service();

    let mut short = new_user("short@example.com", UserType::JobSeeker);
    short.password = "12345".into();
    assert!(matches!(
        svc.register(short).await,
        Err(DomainError::Validation { ref field, .. }) if field == "password"
    ));

    let bad_email = new_user("not-an-email", UserType::JobSeeker);
    assert!(matches!(
        svc.register(bad_email).await,
        Err(DomainError::Validation { ref field, .. }) if field == "email"
    ));

    let mut blank = new_user("blank@example.com", UserType::JobSeeker);
    blank.first_name = "   ".into();
    assert!(matches!(
        svc.register(blank).await,
        Err(DomainError::Validation { ref field, .. }) if field == "firstName"
    ));
}

#[tokio::test]
async fn login_checks_credentials() {
    let svc = test_module().service();
    let (user, _) = sign_up(&svc, "login@example.com", UserType::JobSeeker).await;

    let session = svc.login("login@example.com", PASSWORD).await.unwrap();
    assert_eq!(session.user.id, user.id);

    assert!(matches!(
        svc.login("login@example.com", "wrong-password").await,
        Err(DomainError::InvalidCredentials)
    ));
    assert!(matches!(
        svc.login("nobody@example.com", PASSWORD).await,
        Err(DomainError::InvalidCredentials)
    ));
    // Malformed input is rejected before any lookup
    assert!(matches!(
        svc.login("login@example.com", "123").await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn login_length_rule_ignores_registration_policy() {
    let repo = Arc::new(InMemoryRepository::new());
    let lenient = JobBoard::with_repository(&test_config(), repo.clone())
        .unwrap()
        .service();
    let (user, _) = sign_up(&lenient, "early@example.com", UserType::JobSeeker).await;

    // Policy tightened after the account was created
    let mut strict_cfg = test_config();
    strict_cfg.min_password_len = 12;
    let strict = JobBoard::with_repository(&strict_cfg, repo.clone())
        .unwrap()
        .service();

    let session = strict.login("early@example.com", PASSWORD).await.unwrap();
    assert_eq!(session.user.id, user.id);
    assert!(matches!(
        strict.login("early@example.com", "wrong1").await,
        Err(DomainError::InvalidCredentials)
    ));
    assert!(matches!(
        strict.login("early@example.com", "12345").await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        strict
            .register(new_user("late@example.com", UserType::JobSeeker))
            .await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn authenticate_distinguishes_missing_and_bad_tokens() {
    let svc = test_module().service();
    assert!(matches!(svc.authenticate(""), Err(DomainError::MissingToken)));
    assert!(matches!(
        svc.authenticate("garbage"),
        Err(DomainError::InvalidToken)
    ));

    // A token signed by another deployment is rejected
    let mut other_cfg = test_config();
    other_cfg.jwt_secret = "other-secret".into();
    let other = JobBoard::from_config(&other_cfg).unwrap().service();
    let (_, _) = sign_up(&other, "x@example.com", UserType::JobSeeker).await;
    let foreign = other.login("x@example.com", PASSWORD).await.unwrap().token;
    assert!(matches!(
        svc.authenticate(&foreign),
        Err(DomainError::InvalidToken)
    ));
}

#[tokio::test]
async fn profile_updates_are_merged_and_validated() {
    let svc = test_module().service();
    let (_, me) = sign_up(&svc, "me@example.com", UserType::JobSeeker).await;
    sign_up(&svc, "taken@example.com", UserType::JobSeeker).await;

    let updated = svc
        .update_profile(
            &me,
            UserPatch {
                first_name: Some("Grace".into()),
                profile_data: Some(Some(serde_json::json!({ "bio": "compilers" }))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Grace");
    assert_eq!(updated.last_name, "User");
    assert_eq!(updated.email, "me@example.com");

    let err = svc
        .update_profile(
            &me,
            UserPatch {
                email: Some("taken@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));

    let err = svc
        .update_profile(
            &me,
            UserPatch {
                last_name: Some("".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    // Re-submitting the current email is fine
    svc.update_profile(
        &me,
        UserPatch {
            email: Some("me@example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // The password still works after profile changes
    svc.login("me@example.com", PASSWORD).await.unwrap();
}

#[tokio::test]
async fn companies_belong_to_employers() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let (_, rival) = sign_up(&svc, "rival@example.com", UserType::Employer).await;
    let (_, seeker) = sign_up(&svc, "seeker@example.com", UserType::JobSeeker).await;

    let err = svc
        .create_company(&seeker, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only employers can create companies");

    let acme = company(&svc, &boss, "Acme").await;
    company(&svc, &rival, "Globex").await;

    let mine = svc.list_my_companies(&boss).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, acme.id);

    let renamed = svc
        .update_company(
            &boss,
            acme.id,
            CompanyPatch {
                industry: Some(Some("Rockets".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.industry.as_deref(), Some("Rockets"));
    assert_eq!(renamed.name, "Acme");

    let err = svc
        .update_company(&rival, acme.id, CompanyPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    assert!(matches!(
        svc.list_my_companies(&seeker).await,
        Err(DomainError::Forbidden { .. })
    ));
}

#[traced_test]
#[tokio::test]
async fn job_posting_rules() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let (_, rival) = sign_up(&svc, "rival@example.com", UserType::Employer).await;
    let (_, seeker) = sign_up(&svc, "seeker@example.com", UserType::JobSeeker).await;
    let acme = company(&svc, &boss, "Acme").await;

    let err = svc
        .create_job(&seeker, new_job(acme.id, "Dev"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only employers can create jobs");

    let err = svc
        .create_job(&rival, new_job(acme.id, "Dev"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let err = svc
        .create_job(&boss, new_job(Uuid::new_v4(), "Dev"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CompanyNotFound { .. }));

    let mut inverted = new_job(acme.id, "Dev");
    inverted.min_salary = Some(90_000);
    inverted.max_salary = Some(10_000);
    assert!(matches!(
        svc.create_job(&boss, inverted).await,
        Err(DomainError::Validation { ref field, .. }) if field == "maxSalary"
    ));

    let job = svc.create_job(&boss, new_job(acme.id, "Dev")).await.unwrap();
    assert!(job.is_active);
    assert_eq!(job.employer_id, boss.user_id);
    assert!(logs_contain("Created job"));
}

#[tokio::test]
async fn ownership_check_can_be_disabled() {
    let mut cfg = test_config();
    cfg.enforce_company_ownership = false;
    let svc = JobBoard::from_config(&cfg).unwrap().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;

    let job = svc
        .create_job(&boss, new_job(Uuid::new_v4(), "Ghost"))
        .await
        .unwrap();
    // Without a company the job exists but never shows up in joined views
    assert!(matches!(
        svc.get_job(job.id).await,
        Err(DomainError::JobNotFound { .. })
    ));
}

#[tokio::test]
async fn updates_are_validated_on_the_merged_job() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let acme = company(&svc, &boss, "Acme").await;
    let job = svc.create_job(&boss, new_job(acme.id, "Dev")).await.unwrap();

    // existing max is 60k
    let err = svc
        .update_job(
            &boss,
            job.id,
            JobPatch {
                min_salary: Some(Some(70_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let closed = svc
        .update_job(
            &boss,
            job.id,
            JobPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!closed.is_active);

    assert!(svc.search_jobs(JobFilter::default()).await.unwrap().is_empty());
    assert_eq!(svc.list_employer_jobs(&boss).await.unwrap().len(), 1);
    // Direct lookup still works for inactive jobs
    assert_eq!(svc.get_job(job.id).await.unwrap().job.id, job.id);
}

#[tokio::test]
async fn search_filters_and_orders_jobs() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let acme = company(&svc, &boss, "Acme").await;

    let older = svc
        .create_job(&boss, new_job(acme.id, "Rust Engineer"))
        .await
        .unwrap();
    let mut remote = new_job(acme.id, "Go Engineer");
    remote.location = "Remote".into();
    remote.skills = Some(vec!["Go".into()]);
    remote.max_salary = Some(45_000);
    let newer = svc.create_job(&boss, remote).await.unwrap();

    let all = svc.search_jobs(JobFilter::default()).await.unwrap();
    let ids: Vec<Uuid> = all.iter().map(|r| r.job.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let rust = svc
        .search_jobs(JobFilter {
            search: Some("rust".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rust.len(), 1);
    assert_eq!(rust[0].company.name, "Acme");

    let cheap = svc
        .search_jobs(JobFilter {
            max_salary: Some(50_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cheap.len(), 1);
    assert_eq!(cheap[0].job.id, newer.id);

    let by_skill = svc
        .search_jobs(JobFilter {
            skills: vec!["sql".into(), "cobol".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_skill.len(), 1);
    assert_eq!(by_skill[0].job.id, older.id);
}

#[traced_test]
#[tokio::test]
async fn application_lifecycle() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let (_, seeker) = sign_up(&svc, "seeker@example.com", UserType::JobSeeker).await;
    let (_, other_seeker) = sign_up(&svc, "other@example.com", UserType::JobSeeker).await;
    let acme = company(&svc, &boss, "Acme").await;
    let job = svc.create_job(&boss, new_job(acme.id, "Dev")).await.unwrap();

    let err = svc.apply(&boss, job.id, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Only job seekers can apply");

    assert!(matches!(
        svc.apply(&seeker, Uuid::new_v4(), None).await,
        Err(DomainError::JobNotFound { .. })
    ));

    let app = svc
        .apply(&seeker, job.id, Some("Hire me".into()))
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Pending);
    assert!(logs_contain("Application submitted"));

    let err = svc.apply(&seeker, job.id, None).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyApplied { .. }));
    assert_eq!(err.to_string(), "Already applied to this job");

    let mine = svc.list_my_applications(&seeker).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].job.job.id, job.id);
    assert_eq!(mine[0].job.company.id, acme.id);

    let received = svc.list_employer_applications(&boss).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(svc.list_job_applications(&boss, job.id).await.unwrap().len(), 1);

    // Applicant may edit the cover letter but not the status
    let edited = svc
        .update_application(
            &seeker,
            app.id,
            ApplicationPatch {
                cover_letter: Some(Some("Updated letter".into())),
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.cover_letter.as_deref(), Some("Updated letter"));
    assert!(matches!(
        svc.update_application(
            &seeker,
            app.id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Accepted),
                ..Default::default()
            },
        )
        .await,
        Err(DomainError::Forbidden { .. })
    ));

    // Strangers are turned away
    assert!(matches!(
        svc.update_application(&other_seeker, app.id, ApplicationPatch::default())
            .await,
        Err(DomainError::Forbidden { .. })
    ));

    let reviewed = svc
        .update_application(
            &boss,
            app.id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Interview),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, ApplicationStatus::Interview);
    assert_eq!(reviewed.cover_letter.as_deref(), Some("Updated letter"));

    assert!(matches!(
        svc.update_application(&boss, Uuid::new_v4(), ApplicationPatch::default())
            .await,
        Err(DomainError::ApplicationNotFound { .. })
    ));
}

#[tokio::test]
async fn closed_jobs_refuse_applications() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let (_, seeker) = sign_up(&svc, "seeker@example.com", UserType::JobSeeker).await;
    let acme = company(&svc, &boss, "Acme").await;
    let job = svc.create_job(&boss, new_job(acme.id, "Dev")).await.unwrap();
    svc.update_job(
        &boss,
        job.id,
        JobPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        svc.apply(&seeker, job.id, None).await,
        Err(DomainError::JobClosed { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_applications_create_exactly_one() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let (_, seeker) = sign_up(&svc, "seeker@example.com", UserType::JobSeeker).await;
    let acme = company(&svc, &boss, "Acme").await;
    let job = svc.create_job(&boss, new_job(acme.id, "Dev")).await.unwrap();

    let job_id = job.id;
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            svc.apply(&seeker, job_id, None).await
        }));
    }

    let mut ok = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => ok += 1,
            Err(DomainError::AlreadyApplied { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(svc.list_my_applications(&seeker).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_keep_email_unique() {
    let svc = test_module().service();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            svc.register(new_user("race@example.com", UserType::JobSeeker))
                .await
        }));
    }

    let mut ok = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            ok += 1;
        }
    }
    assert_eq!(ok, 1);
}

#[tokio::test]
async fn only_the_owner_deletes_a_job() {
    let svc = test_module().service();
    let (_, boss) = sign_up(&svc, "boss@example.com", UserType::Employer).await;
    let (_, rival) = sign_up(&svc, "rival@example.com", UserType::Employer).await;
    let acme = company(&svc, &boss, "Acme").await;
    let job = svc.create_job(&boss, new_job(acme.id, "Dev")).await.unwrap();

    assert!(matches!(
        svc.delete_job(&rival, job.id).await,
        Err(DomainError::Forbidden { .. })
    ));
    assert!(matches!(
        svc.list_job_applications(&rival, job.id).await,
        Err(DomainError::Forbidden { .. })
    ));

    svc.delete_job(&boss, job.id).await.unwrap();
    assert!(matches!(
        svc.get_job(job.id).await,
        Err(DomainError::JobNotFound { .. })
    ));
    assert!(matches!(
        svc.delete_job(&boss, job.id).await,
        Err(DomainError::JobNotFound { .. })
    ));
}

#[tokio::test]
async fn local_client_maps_errors_to_contract() {
    let module = test_module();
    let client = module.client();

    let session = client
        .register(new_user("client@example.com", UserType::JobSeeker))
        .await
        .unwrap();
    let principal = client.authenticate(&session.token).unwrap();
    assert_eq!(
        client.current_user(&principal).await.unwrap().email,
        "client@example.com"
    );

    let err = client
        .register(new_user("client@example.com", UserType::JobSeeker))
        .await
        .unwrap_err();
    assert_eq!(err, JobBoardError::conflict("User already exists"));

    assert!(matches!(
        client.authenticate("nope"),
        Err(JobBoardError::Unauthorized { .. })
    ));
    assert!(matches!(
        client.get_job(Uuid::new_v4()).await,
        Err(JobBoardError::NotFound { .. })
    ));
    assert!(matches!(
        client.list_employer_jobs(&principal).await,
        Err(JobBoardError::Forbidden { .. })
    ));
}
