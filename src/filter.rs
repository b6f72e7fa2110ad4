use crate::models::{Job, JobType};

/// Structured narrowing options. Absent (or semantically empty) fields apply
/// no constraint; all active constraints AND together.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the job location.
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    /// A job matches when its own salary band overlaps this one, inclusive.
    pub salary_range: Option<(i64, i64)>,
    pub remote_only: bool,
    /// OR semantics: one requested skill matching (case-insensitive
    /// substring) any job skill is enough.
    pub skills: Vec<String>,
}

/// Narrow `catalog` by a free-text query plus structured criteria. Stable:
/// the relative catalog order is preserved, no ranking is applied.
pub fn filter_jobs<'a>(catalog: &'a [Job], query: &str, criteria: &FilterCriteria) -> Vec<&'a Job> {
    catalog
        .iter()
        .filter(|job| matches(job, query, criteria))
        .collect()
}

fn matches(job: &Job, query: &str, criteria: &FilterCriteria) -> bool {
    if !query.is_empty() {
        let query = query.to_lowercase();
        let hit = job.title.to_lowercase().contains(&query)
            || job.company.to_lowercase().contains(&query)
            || job.location.to_lowercase().contains(&query)
            || job.skills.iter().any(|s| s.to_lowercase().contains(&query));
        if !hit {
            return false;
        }
    }

    if let Some(location) = criteria.location.as_deref() {
        if !location.is_empty()
            && !job
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
        {
            return false;
        }
    }

    if let Some(job_type) = criteria.job_type {
        if job.job_type != job_type {
            return false;
        }
    }

    if let Some((min, max)) = criteria.salary_range {
        if job.salary.max < min || job.salary.min > max {
            return false;
        }
    }

    if criteria.remote_only && !job.remote {
        return false;
    }

    if !criteria.skills.is_empty() {
        let hit = criteria.skills.iter().any(|wanted| {
            let wanted = wanted.to_lowercase();
            job.skills.iter().any(|s| s.to_lowercase().contains(&wanted))
        });
        if !hit {
            return false;
        }
    }

    true
}
