use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generate a prefixed record id from the current wall clock, e.g. "app-1754520000000".
pub fn fresh_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

// --- Profile ---

/// Singleton user profile. Replaced wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Alex Johnson".to_string(),
            email: "alex.johnson@example.com".to_string(),
            phone: None,
            role: Some("Senior Developer".to_string()),
            bio: None,
        }
    }
}

// --- Settings ---

/// Singleton preference record. A reset persists `{}`; every field re-applies
/// its default on the next load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub job_alerts: bool,
    pub weekly_digest: bool,
    pub message_notifications: bool,
    pub theme: String,
    pub font_size: u32,
    pub language: String,
    pub profile_visibility: String,
    pub show_email: bool,
    pub show_phone: bool,
    pub auto_save: bool,
    pub data_collection: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            job_alerts: true,
            weekly_digest: false,
            message_notifications: true,
            theme: "dark".to_string(),
            font_size: 16,
            language: "en".to_string(),
            profile_visibility: "public".to_string(),
            show_email: false,
            show_phone: false,
            auto_save: true,
            data_collection: true,
        }
    }
}

// --- Notifications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Job,
    Message,
    System,
    Application,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Message => "message",
            Self::System => "system",
            Self::Application => "application",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job" => Ok(Self::Job),
            "message" => Ok(Self::Message),
            "system" => Ok(Self::System),
            "application" => Ok(Self::Application),
            other => Err(format!("unknown notification kind: {}", other)),
        }
    }
}

/// In-app notification. Stored newest-first; producers push to the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub action: Option<String>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: fresh_id("notif"),
            kind,
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
            read: false,
            action: None,
        }
    }
}

// --- Jobs (read-only catalog data) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Freelance => "freelance",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(Self::FullTime),
            "part-time" => Ok(Self::PartTime),
            "contract" => Ok(Self::Contract),
            "freelance" => Ok(Self::Freelance),
            other => Err(format!("unknown job type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub min: i64,
    pub max: i64,
    pub currency: String,
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // INR bands read in lakhs, everything else falls back to raw figures.
        if self.currency == "INR" {
            write!(
                f,
                "₹{:.1}L - ₹{:.1}L",
                self.min as f64 / 100_000.0,
                self.max as f64 / 100_000.0
            )
        } else {
            write!(f, "{} {} - {}", self.currency, self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub about: String,
    pub industry: String,
    pub founded: String,
    pub employees: String,
    pub headquarters: String,
    pub website: Option<String>,
    pub culture: Vec<String>,
    pub benefits: Vec<String>,
    pub tech_stack: Option<Vec<String>>,
}

/// One posting from the static job catalog. Never persisted on its own; a
/// full copy is embedded into an application at apply time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub company_info: Option<CompanyInfo>,
    pub location: String,
    pub salary: Salary,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub remote: bool,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub match_score: Option<u8>,
    pub posted_date: Option<DateTime<Utc>>,
}

// --- Applications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Interview,
    Offered,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under-review",
            Self::Interview => "interview",
            Self::Offered => "offered",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "under-review" => Ok(Self::UnderReview),
            "interview" => Ok(Self::Interview),
            "offered" => Ok(Self::Offered),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

/// A job application. The job record is snapshotted at apply time so later
/// catalog changes never rewrite application history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub job: Job,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Application {
    pub fn submitted(job: &Job, notes: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: fresh_id("app"),
            job_id: job.id.clone(),
            job: job.clone(),
            status: ApplicationStatus::Submitted,
            applied_date: now,
            last_updated: now,
            notes,
        }
    }
}

// --- Career goals ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Manual,
    Node,
}

/// A career goal, either typed in directly (manual) or derived from a node
/// on the career map. At most one manual goal is ever kept; node goals are
/// deduplicated by node reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerGoal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub node_id: Option<String>,
    pub title: String,
    pub company: String,
    pub timeline: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CareerGoal {
    pub fn manual(
        title: impl Into<String>,
        company: impl Into<String>,
        timeline: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: fresh_id("goal"),
            kind: GoalKind::Manual,
            node_id: None,
            title: title.into(),
            company: company.into(),
            timeline,
            notes,
            created_at: Utc::now(),
        }
    }

    pub fn from_node(
        node_id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        let node_id = node_id.into();
        Self {
            id: format!("goal-{}-{}", node_id, Utc::now().timestamp_millis()),
            kind: GoalKind::Node,
            node_id: Some(node_id),
            title: title.into(),
            company: company.into(),
            timeline: None,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_spellings() {
        assert_eq!(
            serde_json::to_string(&JobType::FullTime).unwrap(),
            "\"full-time\""
        );
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::UnderReview).unwrap(),
            "\"under-review\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationKind::Application).unwrap(),
            "\"application\""
        );
        assert_eq!(serde_json::to_string(&GoalKind::Manual).unwrap(), "\"manual\"");
    }

    #[test]
    fn test_status_round_trips_from_str() {
        for status in [
            ApplicationStatus::Draft,
            ApplicationStatus::Submitted,
            ApplicationStatus::UnderReview,
            ApplicationStatus::Interview,
            ApplicationStatus::Offered,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_settings_empty_record_reapplies_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.email_notifications);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.font_size, 16);
    }

    #[test]
    fn test_settings_partial_record_keeps_known_fields() {
        let settings: Settings =
            serde_json::from_str(r#"{"theme":"light","weeklyDigest":true}"#).unwrap();
        assert_eq!(settings.theme, "light");
        assert!(settings.weekly_digest);
        assert!(settings.push_notifications);
    }

    #[test]
    fn test_notification_serializes_with_type_field() {
        let notif = Notification::new(NotificationKind::System, "Saved", "Goal saved");
        let value = serde_json::to_value(&notif).unwrap();
        assert_eq!(value["type"], "system");
        assert_eq!(value["read"], false);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_application_snapshot_is_a_copy() {
        let mut job = Job {
            id: "7".to_string(),
            title: "Backend Engineer".to_string(),
            company: "CloudWorks".to_string(),
            company_info: None,
            location: "Remote".to_string(),
            salary: Salary {
                min: 1_800_000,
                max: 2_600_000,
                currency: "INR".to_string(),
            },
            job_type: JobType::FullTime,
            remote: true,
            description: "Own the billing services.".to_string(),
            requirements: vec!["4+ years experience".to_string()],
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            match_score: Some(81),
            posted_date: None,
        };

        let app = Application::submitted(&job, None);
        job.title = "Renamed".to_string();

        assert_eq!(app.job.title, "Backend Engineer");
        assert_eq!(app.job_id, "7");
        assert_eq!(app.status, ApplicationStatus::Submitted);
        assert_eq!(app.applied_date, app.last_updated);
    }
}
