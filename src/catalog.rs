use chrono::{DateTime, Utc};

use crate::models::{CompanyInfo, Job, JobType, Salary};

fn posted(date: &str) -> Option<DateTime<Utc>> {
    date.parse::<DateTime<Utc>>().ok()
}

fn salary(min: i64, max: i64) -> Salary {
    Salary {
        min,
        max,
        currency: "INR".to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in job catalog. Immutable reference data: the filter engine and
/// the CLI read it, nothing writes it back.
pub fn default_catalog() -> Vec<Job> {
    vec![
        Job {
            id: "1".to_string(),
            title: "Senior Frontend Developer".to_string(),
            company: "TechCorp India".to_string(),
            company_info: Some(CompanyInfo {
                name: "TechCorp India".to_string(),
                about: "Product engineering company building consumer fintech apps.".to_string(),
                industry: "Financial Technology".to_string(),
                founded: "2014".to_string(),
                employees: "500-1000".to_string(),
                headquarters: "Bangalore, Karnataka".to_string(),
                website: Some("https://techcorp.example.com".to_string()),
                culture: strings(&["Remote-friendly", "Learning budget", "Flat hierarchy"]),
                benefits: strings(&["Health insurance", "ESOPs", "Annual offsite"]),
                tech_stack: Some(strings(&["React", "TypeScript", "GraphQL", "AWS"])),
            }),
            location: "Bangalore, Karnataka".to_string(),
            salary: salary(1_800_000, 2_800_000),
            job_type: JobType::FullTime,
            remote: false,
            description: "Own the web experience for our consumer products. You will lead \
                          component architecture, mentor two junior engineers, and work with \
                          design on a new design system."
                .to_string(),
            requirements: strings(&[
                "5+ years building production web applications",
                "Deep React and TypeScript experience",
                "Experience leading small teams",
            ]),
            skills: strings(&["React", "TypeScript", "Next.js", "GraphQL"]),
            match_score: Some(92),
            posted_date: posted("2026-07-28T00:00:00Z"),
        },
        Job {
            id: "2".to_string(),
            title: "Backend Engineer".to_string(),
            company: "CloudWorks".to_string(),
            company_info: None,
            location: "Remote".to_string(),
            salary: salary(2_000_000, 3_200_000),
            job_type: JobType::FullTime,
            remote: true,
            description: "Design and run the billing and metering services behind our \
                          infrastructure platform. Strong ownership of reliability and cost."
                .to_string(),
            requirements: strings(&[
                "4+ years backend experience",
                "Comfort operating distributed systems",
                "PostgreSQL in production",
            ]),
            skills: strings(&["Node.js", "PostgreSQL", "AWS", "Docker"]),
            match_score: Some(85),
            posted_date: posted("2026-07-30T00:00:00Z"),
        },
        Job {
            id: "3".to_string(),
            title: "DevOps Engineer".to_string(),
            company: "InfraScale".to_string(),
            company_info: None,
            location: "Mumbai, Maharashtra".to_string(),
            salary: salary(1_500_000, 2_400_000),
            job_type: JobType::Contract,
            remote: false,
            description: "Twelve-month contract modernising CI/CD for a large retail group: \
                          move build pipelines to Kubernetes and cut release time in half."
                .to_string(),
            requirements: strings(&[
                "Kubernetes and Terraform in anger",
                "CI/CD pipeline ownership",
            ]),
            skills: strings(&["Kubernetes", "Terraform", "Docker", "AWS"]),
            match_score: Some(74),
            posted_date: posted("2026-07-21T00:00:00Z"),
        },
        Job {
            id: "4".to_string(),
            title: "Full Stack Developer".to_string(),
            company: "StartupXYZ".to_string(),
            company_info: None,
            location: "Bangalore, Karnataka".to_string(),
            salary: salary(1_200_000, 2_000_000),
            job_type: JobType::FullTime,
            remote: true,
            description: "Early engineer on a career-coaching marketplace. You will ship \
                          features end to end across a Next.js frontend and a Node API."
                .to_string(),
            requirements: strings(&[
                "2+ years full stack experience",
                "Bias for shipping",
            ]),
            skills: strings(&["React", "Node.js", "TypeScript", "MongoDB"]),
            match_score: Some(88),
            posted_date: posted("2026-08-02T00:00:00Z"),
        },
        Job {
            id: "5".to_string(),
            title: "Engineering Manager".to_string(),
            company: "InnovateLabs".to_string(),
            company_info: Some(CompanyInfo {
                name: "InnovateLabs".to_string(),
                about: "Applied research lab shipping ML-assisted developer tools.".to_string(),
                industry: "Developer Tools".to_string(),
                founded: "2018".to_string(),
                employees: "100-250".to_string(),
                headquarters: "Hyderabad, Telangana".to_string(),
                website: None,
                culture: strings(&["Research-driven", "Small teams"]),
                benefits: strings(&["Health insurance", "Conference budget"]),
                tech_stack: Some(strings(&["Python", "Rust", "Kubernetes"])),
            }),
            location: "Hyderabad, Telangana".to_string(),
            salary: salary(3_500_000, 5_000_000),
            job_type: JobType::FullTime,
            remote: false,
            description: "Lead a team of eight engineers across two products. Hands-on \
                          technical leadership, hiring, and roadmap ownership."
                .to_string(),
            requirements: strings(&[
                "2+ years managing engineers",
                "Prior senior IC experience",
                "System design depth",
            ]),
            skills: strings(&["Leadership", "System Design", "Python"]),
            match_score: Some(68),
            posted_date: posted("2026-07-15T00:00:00Z"),
        },
        Job {
            id: "6".to_string(),
            title: "UI Engineer".to_string(),
            company: "PixelCraft Studios".to_string(),
            company_info: None,
            location: "Pune, Maharashtra".to_string(),
            salary: salary(900_000, 1_600_000),
            job_type: JobType::PartTime,
            remote: true,
            description: "Part-time role building marketing sites and interactive product \
                          demos for client studios. Flexible hours, portfolio-driven."
                .to_string(),
            requirements: strings(&["Strong CSS", "Animation experience a plus"]),
            skills: strings(&["React", "CSS", "Framer Motion"]),
            match_score: None,
            posted_date: posted("2026-07-25T00:00:00Z"),
        },
    ]
}

/// Look up a catalog entry by id.
pub fn find_job<'a>(catalog: &'a [Job], id: &str) -> Option<&'a Job> {
    catalog.iter().find(|job| job.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|j| j.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_catalog_salary_bands_are_ordered() {
        for job in default_catalog() {
            assert!(job.salary.min <= job.salary.max, "job {}", job.id);
        }
    }

    #[test]
    fn test_find_job() {
        let catalog = default_catalog();
        assert_eq!(find_job(&catalog, "2").map(|j| j.company.as_str()), Some("CloudWorks"));
        assert!(find_job(&catalog, "99").is_none());
    }
}
