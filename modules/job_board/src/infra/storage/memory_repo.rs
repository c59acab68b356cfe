use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::contract::model::{
    Application, ApplicationPatch, ApplicationStatus, ApplicationWithJob, Company, CompanyPatch,
    Job, JobFilter, JobPatch, JobWithCompany, NewApplication, NewCompany, NewJob, NewUser, User,
    UserPatch,
};
use crate::domain::repo::{JobBoardRepository, UserAccount};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserAccount>,
    companies: HashMap<Uuid, Company>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Creation timestamps are strictly increasing so newest-first order is total.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn join(&self, job: &Job) -> Option<JobWithCompany> {
        let company = self.companies.get(&job.company_id)?;
        Some(JobWithCompany {
            job: job.clone(),
            company: company.clone(),
        })
    }

    fn joined_jobs<'a>(&self, jobs: impl Iterator<Item = &'a Job>) -> Vec<JobWithCompany> {
        let mut rows: Vec<JobWithCompany> = jobs.filter_map(|job| self.join(job)).collect();
        rows.sort_by(|a, b| b.job.created_at.cmp(&a.job.created_at));
        rows
    }

    fn joined_applications<'a>(
        &self,
        applications: impl Iterator<Item = &'a Application>,
    ) -> Vec<ApplicationWithJob> {
        let mut rows: Vec<ApplicationWithJob> = applications
            .filter_map(|app| {
                let job = self.jobs.get(&app.job_id)?;
                Some(ApplicationWithJob {
                    application: app.clone(),
                    job: self.join(job)?,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.application.applied_at.cmp(&a.application.applied_at));
        rows
    }
}

/// Volatile store behind the repository port. Every call takes the lock once,
/// so joins read a consistent snapshot.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobBoardRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<UserAccount>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserAccount>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|a| a.user.email == email)
            .cloned())
    }

    async fn create_user(&self, new: NewUser) -> anyhow::Result<UserAccount> {
        let mut t = self.tables.write();
        let account = UserAccount {
            user: User {
                id: Uuid::new_v4(),
                email: new.email,
                first_name: new.first_name,
                last_name: new.last_name,
                user_type: new.user_type,
                resume_url: new.resume_url,
                profile_data: new.profile_data,
                created_at: t.next_stamp(),
            },
            password_hash: new.password,
        };
        t.users.insert(account.user.id, account.clone());
        Ok(account)
    }

    async fn update_user(
        &self,
        id: Uuid,
        patch: UserPatch,
    ) -> anyhow::Result<Option<UserAccount>> {
        let mut t = self.tables.write();
        Ok(t.users.get_mut(&id).map(|account| {
            patch.apply_to(&mut account.user);
            account.clone()
        }))
    }

    async fn get_company(&self, id: Uuid) -> anyhow::Result<Option<Company>> {
        Ok(self.tables.read().companies.get(&id).cloned())
    }

    async fn get_companies_by_employer(&self, employer_id: Uuid) -> anyhow::Result<Vec<Company>> {
        let t = self.tables.read();
        let mut rows: Vec<Company> = t
            .companies
            .values()
            .filter(|c| c.employer_id == employer_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_company(&self, employer_id: Uuid, new: NewCompany) -> anyhow::Result<Company> {
        let mut t = self.tables.write();
        let company = Company {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            industry: new.industry,
            website: new.website,
            logo_url: new.logo_url,
            employer_id,
            created_at: t.next_stamp(),
        };
        t.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn update_company(
        &self,
        id: Uuid,
        patch: CompanyPatch,
    ) -> anyhow::Result<Option<Company>> {
        let mut t = self.tables.write();
        Ok(t.companies.get_mut(&id).map(|company| {
            patch.apply_to(company);
            company.clone()
        }))
    }

    async fn get_job(&self, id: Uuid) -> anyhow::Result<Option<Job>> {
        Ok(self.tables.read().jobs.get(&id).cloned())
    }

    async fn get_job_with_company(&self, id: Uuid) -> anyhow::Result<Option<JobWithCompany>> {
        let t = self.tables.read();
        Ok(t.jobs.get(&id).and_then(|job| t.join(job)))
    }

    async fn get_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<JobWithCompany>> {
        let t = self.tables.read();
        Ok(t.joined_jobs(
            t.jobs
                .values()
                .filter(|job| job.is_active && filter.matches(job)),
        ))
    }

    async fn get_jobs_by_employer(
        &self,
        employer_id: Uuid,
    ) -> anyhow::Result<Vec<JobWithCompany>> {
        let t = self.tables.read();
        Ok(t.joined_jobs(t.jobs.values().filter(|job| job.employer_id == employer_id)))
    }

    async fn create_job(&self, employer_id: Uuid, new: NewJob) -> anyhow::Result<Job> {
        let mut t = self.tables.write();
        let job = Job {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            location: new.location,
            job_type: new.job_type,
            experience_level: new.experience_level,
            min_salary: new.min_salary,
            max_salary: new.max_salary,
            skills: new.skills,
            company_id: new.company_id,
            employer_id,
            is_active: true,
            created_at: t.next_stamp(),
        };
        t.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> anyhow::Result<Option<Job>> {
        let mut t = self.tables.write();
        Ok(t.jobs.get_mut(&id).map(|job| {
            patch.apply_to(job);
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.tables.write().jobs.remove(&id).is_some())
    }

    async fn get_application(&self, id: Uuid) -> anyhow::Result<Option<Application>> {
        Ok(self.tables.read().applications.get(&id).cloned())
    }

    async fn get_applications_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> anyhow::Result<Vec<ApplicationWithJob>> {
        let t = self.tables.read();
        Ok(t.joined_applications(
            t.applications
                .values()
                .filter(|app| app.applicant_id == applicant_id),
        ))
    }

    async fn get_applications_by_job(&self, job_id: Uuid) -> anyhow::Result<Vec<Application>> {
        let t = self.tables.read();
        let mut rows: Vec<Application> = t
            .applications
            .values()
            .filter(|app| app.job_id == job_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(rows)
    }

    async fn get_applications_by_employer(
        &self,
        employer_id: Uuid,
    ) -> anyhow::Result<Vec<ApplicationWithJob>> {
        let t = self.tables.read();
        let job_ids: HashSet<Uuid> = t
            .jobs
            .values()
            .filter(|job| job.employer_id == employer_id)
            .map(|job| job.id)
            .collect();
        Ok(t.joined_applications(
            t.applications
                .values()
                .filter(|app| job_ids.contains(&app.job_id)),
        ))
    }

    async fn create_application(&self, new: NewApplication) -> anyhow::Result<Application> {
        let mut t = self.tables.write();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: new.job_id,
            applicant_id: new.applicant_id,
            cover_letter: new.cover_letter,
            status: ApplicationStatus::Pending,
            applied_at: t.next_stamp(),
        };
        t.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> anyhow::Result<Option<Application>> {
        let mut t = self.tables.write();
        Ok(t.applications.get_mut(&id).map(|app| {
            patch.apply_to(app);
            app.clone()
        }))
    }

    async fn get_application_by_job_and_applicant(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
    ) -> anyhow::Result<Option<Application>> {
        Ok(self
            .tables
            .read()
            .applications
            .values()
            .find(|app| app.job_id == job_id && app.applicant_id == applicant_id)
            .cloned())
    }
}
