//! Pure job board models for inter-module communication (no serde/utoipa).
//! Wire shapes live in `api::rest::dto`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Role of an account.
    UserType, "user type" {
        JobSeeker => "job_seeker",
        Employer => "employer",
    }
);

wire_enum!(JobType, "job type" {
    FullTime => "full_time",
    PartTime => "part_time",
    Remote => "remote",
    Freelance => "freelance",
});

wire_enum!(ExperienceLevel, "experience level" {
    Entry => "entry",
    Junior => "junior",
    Mid => "mid",
    Senior => "senior",
});

wire_enum!(ApplicationStatus, "application status" {
    Pending => "pending",
    Reviewing => "reviewing",
    Interview => "interview",
    Accepted => "accepted",
    Rejected => "rejected",
});

impl Default for UserType {
    fn default() -> Self {
        UserType::JobSeeker
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

/// Authenticated identity decoded from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub user_type: UserType,
}

impl Principal {
    pub fn is_employer(&self) -> bool {
        self.user_type == UserType::Employer
    }

    pub fn is_job_seeker(&self) -> bool {
        self.user_type == UserType::JobSeeker
    }
}

/// Public view of an account. The password hash never leaves the domain.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub resume_url: Option<String>,
    pub profile_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Registration data. `password` is plaintext here; the service swaps in the
/// hash before anything is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub resume_url: Option<String>,
    pub profile_data: Option<serde_json::Value>,
}

/// Profile changes. Password and role are not patchable.
///
/// Optional columns use `Option<Option<_>>`: outer `None` keeps the stored
/// value, `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub resume_url: Option<Option<String>>,
    pub profile_data: Option<Option<serde_json::Value>>,
}

impl UserPatch {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(resume_url) = &self.resume_url {
            user.resume_url = resume_url.clone();
        }
        if let Some(profile_data) = &self.profile_data {
            user.profile_data = profile_data.clone();
        }
    }
}

/// User plus a freshly issued bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub employer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub industry: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub logo_url: Option<Option<String>>,
}

impl CompanyPatch {
    pub fn apply_to(&self, company: &mut Company) {
        if let Some(name) = &self.name {
            company.name = name.clone();
        }
        if let Some(description) = &self.description {
            company.description = description.clone();
        }
        if let Some(industry) = &self.industry {
            company.industry = industry.clone();
        }
        if let Some(website) = &self.website {
            company.website = website.clone();
        }
        if let Some(logo_url) = &self.logo_url {
            company.logo_url = logo_url.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub skills: Option<Vec<String>>,
    pub company_id: Uuid,
    pub employer_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub skills: Option<Vec<String>>,
    pub company_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub min_salary: Option<Option<u32>>,
    pub max_salary: Option<Option<u32>>,
    pub skills: Option<Option<Vec<String>>>,
    pub is_active: Option<bool>,
}

impl JobPatch {
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(title) = &self.title {
            job.title = title.clone();
        }
        if let Some(description) = &self.description {
            job.description = description.clone();
        }
        if let Some(location) = &self.location {
            job.location = location.clone();
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(level) = self.experience_level {
            job.experience_level = level;
        }
        if let Some(min) = self.min_salary {
            job.min_salary = min;
        }
        if let Some(max) = self.max_salary {
            job.max_salary = max;
        }
        if let Some(skills) = &self.skills {
            job.skills = skills.clone();
        }
        if let Some(active) = self.is_active {
            job.is_active = active;
        }
    }
}

/// Search criteria for public job listings. Every set field narrows the
/// result (AND).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobWithCompany {
    pub job: Job,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationPatch {
    pub cover_letter: Option<Option<String>>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationPatch {
    pub fn apply_to(&self, application: &mut Application) {
        if let Some(cover_letter) = &self.cover_letter {
            application.cover_letter = cover_letter.clone();
        }
        if let Some(status) = self.status {
            application.status = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationWithJob {
    pub application: Application,
    pub job: JobWithCompany,
}
