use crate::contract::model::{Job, JobFilter};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl JobFilter {
    /// Field predicates only. Active status and the company join are the
    /// caller's concern.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&job.title, search) && !contains_ci(&job.description, search) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !contains_ci(&job.location, location) {
                return false;
            }
        }

        if self.job_type.is_some_and(|t| t != job.job_type) {
            return false;
        }

        if self
            .experience_level
            .is_some_and(|l| l != job.experience_level)
        {
            return false;
        }

        // Salary bounds need the stored value to be present
        if let Some(min) = self.min_salary {
            if !job.min_salary.is_some_and(|s| s >= min) {
                return false;
            }
        }

        if let Some(max) = self.max_salary {
            if !job.max_salary.is_some_and(|s| s <= max) {
                return false;
            }
        }

        if !self.skills.is_empty() {
            let Some(job_skills) = &job.skills else {
                return false;
            };
            let any = self
                .skills
                .iter()
                .any(|wanted| job_skills.iter().any(|have| contains_ci(have, wanted)));
            if !any {
                return false;
            }
        }

        true
    }
}
