mod catalog;
mod filter;
mod models;
mod store;
mod tui;
mod validate;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use catalog::{default_catalog, find_job};
use filter::{filter_jobs, FilterCriteria};
use models::{
    Application, ApplicationStatus, CareerGoal, JobType, Notification, NotificationKind,
};
use store::{GoalOutcome, Store};

#[derive(Parser)]
#[command(name = "orbit")]
#[command(about = "Career management from the terminal - profile, goals, applications, job search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Show, change, or reset preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Review in-app notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Track job applications
    Apps {
        #[command(subcommand)]
        command: AppCommands,
    },

    /// Manage career goals
    Goals {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Search the job catalog
    Jobs {
        /// Free-text search over title, company, location, and skills
        query: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Apply to a job from the catalog
    Apply {
        /// Catalog job ID
        job_id: String,

        /// Applicant name (defaults to the stored profile)
        #[arg(long)]
        name: Option<String>,

        /// Applicant email (defaults to the stored profile)
        #[arg(long)]
        email: Option<String>,

        /// Applicant phone (defaults to the stored profile)
        #[arg(long)]
        phone: Option<String>,

        /// Cover letter text
        #[arg(long)]
        cover_letter: Option<String>,

        /// Private notes kept with the application
        #[arg(long)]
        notes: Option<String>,
    },

    /// Browse matching jobs in the terminal UI
    Browse {
        /// Free-text search over title, company, location, and skills
        query: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Filter by location (substring match)
    #[arg(short, long)]
    location: Option<String>,

    /// Filter by employment type (full-time, part-time, contract, freelance)
    #[arg(short = 't', long = "type")]
    job_type: Option<JobType>,

    /// Lower bound of the salary band
    #[arg(long)]
    salary_min: Option<i64>,

    /// Upper bound of the salary band
    #[arg(long)]
    salary_max: Option<i64>,

    /// Remote positions only
    #[arg(short, long)]
    remote: bool,

    /// Required skill (repeatable, any match qualifies)
    #[arg(short, long = "skill")]
    skills: Vec<String>,
}

impl FilterArgs {
    fn into_criteria(self) -> FilterCriteria {
        let salary_range = match (self.salary_min, self.salary_max) {
            (None, None) => None,
            (min, max) => Some((min.unwrap_or(0), max.unwrap_or(i64::MAX))),
        };
        FilterCriteria {
            location: self.location,
            job_type: self.job_type,
            salary_range,
            remote_only: self.remote,
            skills: self.skills,
        }
    }
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the stored profile
    Show,

    /// Update profile fields (unset flags keep their current value)
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        bio: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show effective preferences
    Show,

    /// Change preference values (unset flags keep their current value)
    Set {
        #[arg(long)]
        email_notifications: Option<bool>,

        #[arg(long)]
        push_notifications: Option<bool>,

        #[arg(long)]
        job_alerts: Option<bool>,

        #[arg(long)]
        weekly_digest: Option<bool>,

        #[arg(long)]
        message_notifications: Option<bool>,

        #[arg(long)]
        theme: Option<String>,

        #[arg(long)]
        font_size: Option<u32>,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        profile_visibility: Option<String>,

        #[arg(long)]
        show_email: Option<bool>,

        #[arg(long)]
        show_phone: Option<bool>,

        #[arg(long)]
        auto_save: Option<bool>,

        #[arg(long)]
        data_collection: Option<bool>,
    },

    /// Restore every preference to its default
    Reset,
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark one notification as read
    Read {
        /// Notification ID
        id: String,
    },

    /// Mark every notification as read
    ReadAll,

    /// Delete a notification
    Rm {
        /// Notification ID
        id: String,
    },
}

#[derive(Subcommand)]
enum AppCommands {
    /// List applications, newest first
    List {
        /// Filter by status (draft, submitted, under-review, interview, offered, rejected)
        #[arg(short, long)]
        status: Option<ApplicationStatus>,
    },

    /// Change an application's status
    Status {
        /// Application ID
        id: String,

        /// New status
        status: ApplicationStatus,
    },

    /// Withdraw (remove) an application
    Withdraw {
        /// Application ID
        id: String,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// List career goals, newest first
    List,

    /// Set the manual career goal (replaces any previous manual goal)
    Set {
        /// Target role
        #[arg(long)]
        role: String,

        /// Target company
        #[arg(long, default_value = "")]
        company: String,

        /// Expected timeline, e.g. "18 months"
        #[arg(long)]
        timeline: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Track a catalog job as a career goal
    Track {
        /// Catalog job ID
        job_id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = Store::open()?;

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Show => {
                let profile = store.load_profile();
                println!("Name:  {}", profile.name);
                println!("Email: {}", profile.email);
                if let Some(phone) = &profile.phone {
                    println!("Phone: {}", phone);
                }
                if let Some(role) = &profile.role {
                    println!("Role:  {}", role);
                }
                if let Some(bio) = &profile.bio {
                    println!("Bio:   {}", bio);
                }
            }

            ProfileCommands::Set {
                name,
                email,
                phone,
                role,
                bio,
            } => {
                let mut profile = store.load_profile();
                if let Some(name) = name {
                    profile.name = name;
                }
                if let Some(email) = email {
                    profile.email = email;
                }
                if let Some(phone) = phone {
                    profile.phone = Some(phone);
                }
                if let Some(role) = role {
                    profile.role = Some(role);
                }
                if let Some(bio) = bio {
                    profile.bio = Some(bio);
                }
                if !validate::is_valid_email(&profile.email) {
                    return Err(anyhow!("Invalid email: {}", profile.email));
                }
                store.save_profile(&profile)?;
                println!("Profile saved.");
            }
        },

        Commands::Settings { command } => match command {
            SettingsCommands::Show => {
                let settings = store.load_settings().unwrap_or_default();
                println!("Email notifications:   {}", settings.email_notifications);
                println!("Push notifications:    {}", settings.push_notifications);
                println!("Job alerts:            {}", settings.job_alerts);
                println!("Weekly digest:         {}", settings.weekly_digest);
                println!("Message notifications: {}", settings.message_notifications);
                println!("Theme:                 {}", settings.theme);
                println!("Font size:             {}", settings.font_size);
                println!("Language:              {}", settings.language);
                println!("Profile visibility:    {}", settings.profile_visibility);
                println!("Show email:            {}", settings.show_email);
                println!("Show phone:            {}", settings.show_phone);
                println!("Auto save:             {}", settings.auto_save);
                println!("Data collection:       {}", settings.data_collection);
            }

            SettingsCommands::Set {
                email_notifications,
                push_notifications,
                job_alerts,
                weekly_digest,
                message_notifications,
                theme,
                font_size,
                language,
                profile_visibility,
                show_email,
                show_phone,
                auto_save,
                data_collection,
            } => {
                let mut settings = store.load_settings().unwrap_or_default();
                if let Some(value) = email_notifications {
                    settings.email_notifications = value;
                }
                if let Some(value) = push_notifications {
                    settings.push_notifications = value;
                }
                if let Some(value) = job_alerts {
                    settings.job_alerts = value;
                }
                if let Some(value) = weekly_digest {
                    settings.weekly_digest = value;
                }
                if let Some(value) = message_notifications {
                    settings.message_notifications = value;
                }
                if let Some(value) = theme {
                    settings.theme = value;
                }
                if let Some(value) = font_size {
                    settings.font_size = value;
                }
                if let Some(value) = language {
                    settings.language = value;
                }
                if let Some(value) = profile_visibility {
                    settings.profile_visibility = value;
                }
                if let Some(value) = show_email {
                    settings.show_email = value;
                }
                if let Some(value) = show_phone {
                    settings.show_phone = value;
                }
                if let Some(value) = auto_save {
                    settings.auto_save = value;
                }
                if let Some(value) = data_collection {
                    settings.data_collection = value;
                }
                store.save_settings(&settings)?;
                println!("Settings saved.");
            }

            SettingsCommands::Reset => {
                store.reset_settings()?;
                println!("All settings restored to defaults.");
            }
        },

        Commands::Notifications { command } => match command {
            NotificationCommands::List { unread } => {
                let list = store.load_notifications();
                let shown: Vec<_> = list.iter().filter(|n| !unread || !n.read).collect();
                if shown.is_empty() {
                    println!("No notifications.");
                } else {
                    println!(
                        "{:<24} {:<12} {:<3} {:<17} {:<40}",
                        "ID", "TYPE", "NEW", "WHEN", "TITLE"
                    );
                    println!("{}", "-".repeat(98));
                    for notification in shown {
                        println!(
                            "{:<24} {:<12} {:<3} {:<17} {:<40}",
                            truncate(&notification.id, 22),
                            notification.kind,
                            if notification.read { "" } else { "*" },
                            notification.timestamp.format("%Y-%m-%d %H:%M"),
                            truncate(&notification.title, 38)
                        );
                    }
                }
            }

            NotificationCommands::Read { id } => {
                if store.mark_notification_read(&id)? {
                    println!("Notification marked as read.");
                } else {
                    println!("Notification '{}' not found.", id);
                }
            }

            NotificationCommands::ReadAll => {
                let count = store.mark_all_notifications_read()?;
                println!("Marked {} notification(s) as read.", count);
            }

            NotificationCommands::Rm { id } => {
                if store.remove_notification(&id)? {
                    println!("Notification deleted.");
                } else {
                    println!("Notification '{}' not found.", id);
                }
            }
        },

        Commands::Apps { command } => match command {
            AppCommands::List { status } => {
                let list = store.load_applications();
                let shown: Vec<_> = list
                    .iter()
                    .filter(|a| status.is_none_or(|s| a.status == s))
                    .collect();
                if shown.is_empty() {
                    println!("No applications found.");
                } else {
                    println!(
                        "{:<20} {:<12} {:<28} {:<20} {:<17}",
                        "ID", "STATUS", "TITLE", "COMPANY", "UPDATED"
                    );
                    println!("{}", "-".repeat(99));
                    for application in shown {
                        println!(
                            "{:<20} {:<12} {:<28} {:<20} {:<17}",
                            truncate(&application.id, 18),
                            application.status,
                            truncate(&application.job.title, 26),
                            truncate(&application.job.company, 18),
                            application.last_updated.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }

            AppCommands::Status { id, status } => {
                if store.update_application_status(&id, status)? {
                    println!("Application '{}' moved to {}.", id, status);
                } else {
                    println!("Application '{}' not found.", id);
                }
            }

            AppCommands::Withdraw { id } => {
                if store.withdraw_application(&id)? {
                    println!("Application '{}' withdrawn.", id);
                } else {
                    println!("Application '{}' not found.", id);
                }
            }
        },

        Commands::Goals { command } => match command {
            GoalCommands::List => {
                let goals = store.load_career_goals();
                if goals.is_empty() {
                    println!("No career goals yet.");
                } else {
                    println!(
                        "{:<8} {:<28} {:<20} {:<14} {:<12}",
                        "KIND", "TITLE", "COMPANY", "TIMELINE", "CREATED"
                    );
                    println!("{}", "-".repeat(84));
                    for goal in goals {
                        let kind = match goal.kind {
                            models::GoalKind::Manual => "manual",
                            models::GoalKind::Node => "node",
                        };
                        println!(
                            "{:<8} {:<28} {:<20} {:<14} {:<12}",
                            kind,
                            truncate(&goal.title, 26),
                            truncate(&goal.company, 18),
                            truncate(goal.timeline.as_deref().unwrap_or("-"), 12),
                            goal.created_at.format("%Y-%m-%d")
                        );
                    }
                }
            }

            GoalCommands::Set {
                role,
                company,
                timeline,
                notes,
            } => {
                if role.trim().is_empty() {
                    return Err(anyhow!("Please enter your target role"));
                }
                let goal = CareerGoal::manual(role.trim(), company, timeline, notes);
                store.save_career_goal(goal)?;
                println!("Career goal saved.");
            }

            GoalCommands::Track { job_id } => {
                let jobs = default_catalog();
                let job = find_job(&jobs, &job_id)
                    .ok_or_else(|| anyhow!("Job #{} not found in the catalog", job_id))?;
                let goal = CareerGoal::from_node(&job.id, &job.title, &job.company);
                match store.save_career_goal(goal)? {
                    GoalOutcome::Saved => {
                        store.push_notification(Notification::new(
                            NotificationKind::System,
                            "Career Goal Saved",
                            format!("{} has been added to your career goals.", job.title),
                        ))?;
                        println!("Saved '{}' to your career goals.", job.title);
                    }
                    GoalOutcome::Duplicate => {
                        println!("'{}' is already in your career goals.", job.title);
                    }
                }
            }
        },

        Commands::Jobs { query, filters } => {
            let jobs = default_catalog();
            let criteria = filters.into_criteria();
            let matched = filter_jobs(&jobs, query.as_deref().unwrap_or(""), &criteria);
            if matched.is_empty() {
                println!("No jobs found. Try adjusting your filters or search query.");
            } else {
                println!("{} job(s) found", matched.len());
                println!(
                    "{:<4} {:<28} {:<20} {:<24} {:<10} {:>18}",
                    "ID", "TITLE", "COMPANY", "LOCATION", "TYPE", "PAY"
                );
                println!("{}", "-".repeat(108));
                for job in matched {
                    let location = if job.remote && job.location != "Remote" {
                        format!("{} (remote ok)", job.location)
                    } else {
                        job.location.clone()
                    };
                    println!(
                        "{:<4} {:<28} {:<20} {:<24} {:<10} {:>18}",
                        job.id,
                        truncate(&job.title, 26),
                        truncate(&job.company, 18),
                        truncate(&location, 22),
                        job.job_type,
                        job.salary.to_string()
                    );
                }
            }
        }

        Commands::Apply {
            job_id,
            name,
            email,
            phone,
            cover_letter,
            notes,
        } => {
            let jobs = default_catalog();
            let job = find_job(&jobs, &job_id)
                .ok_or_else(|| anyhow!("Job #{} not found in the catalog", job_id))?;

            let profile = store.load_profile();
            let name = name.unwrap_or(profile.name);
            let email = email.unwrap_or(profile.email);
            let phone = phone.or(profile.phone).unwrap_or_default();

            let mut errors = validate::validate_applicant(&name, &email, &phone);
            if let Some(cover_letter) = &cover_letter {
                errors.extend(validate::validate_cover_letter(cover_letter));
            }
            if !errors.is_empty() {
                for error in &errors {
                    eprintln!("  {}: {}", error.field, error.message);
                }
                return Err(anyhow!(
                    "Application blocked by {} validation error(s)",
                    errors.len()
                ));
            }

            let application = Application::submitted(job, notes.or(cover_letter));
            let id = application.id.clone();
            store.record_application(application)?;
            store.push_notification(Notification::new(
                NotificationKind::Application,
                "Application Submitted!",
                format!(
                    "Your application for {} at {} has been submitted successfully.",
                    job.title, job.company
                ),
            ))?;
            println!(
                "Application submitted for '{}' at {}.",
                job.title, job.company
            );
            println!("Tracking ID: {}", id);
        }

        Commands::Browse { query, filters } => {
            let jobs = default_catalog();
            let criteria = filters.into_criteria();
            let matched: Vec<_> = filter_jobs(&jobs, query.as_deref().unwrap_or(""), &criteria)
                .into_iter()
                .cloned()
                .collect();
            tui::run_browse(&store, matched)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
