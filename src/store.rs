use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::models::{
    Application, ApplicationStatus, CareerGoal, GoalKind, Notification, Profile, Settings,
};

/// The named collections the store persists. Each owns one fixed key in the
/// records table; the stored value is the JSON encoding of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profile,
    Settings,
    Notifications,
    Applications,
    CareerGoals,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Self::Profile => "userProfile",
            Self::Settings => "userSettings",
            Self::Notifications => "appNotifications",
            Self::Applications => "applications",
            Self::CareerGoals => "careerGoals",
        }
    }
}

/// Outcome of saving a career goal through the dedup policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    Saved,
    /// A node-derived goal with the same node reference already exists;
    /// the collection was left untouched.
    Duplicate,
}

/// Handle returned by `subscribe`; pass back to `unsubscribe` to deregister.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionId {
    collection: Collection,
    id: u64,
}

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

/// Durable record store plus in-process change broadcast.
///
/// Writes go through `save_*`: encode, upsert under the collection key, then
/// synchronously notify that collection's subscribers with the new value.
/// `write_order` serializes the write-then-notify pair so subscribers observe
/// values in completed-save order. Handlers may read back into the store (the
/// connection has its own lock) but must not save from inside a notification.
pub struct Store {
    conn: Mutex<Connection>,
    write_order: Mutex<()>,
    subscribers: Mutex<HashMap<Collection, Vec<Subscriber>>>,
    next_subscriber: AtomicU64,
}

impl Store {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_at(path)
    }

    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            write_order: Mutex::new(()),
            subscribers: Mutex::new(HashMap::new()),
            next_subscriber: AtomicU64::new(1),
        })
    }

    fn default_path() -> Result<PathBuf> {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "orbit") {
            Ok(proj_dirs.data_dir().join("orbit.db"))
        } else {
            Ok(PathBuf::from("orbit.db"))
        }
    }

    fn with_conn<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&conn)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, HashMap<Collection, Vec<Subscriber>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // --- Generic load/save core ---

    fn read_raw(&self, collection: Collection) -> Result<Option<String>> {
        self.with_conn(|conn| {
            match conn.query_row(
                "SELECT value FROM records WHERE key = ?1",
                [collection.key()],
                |row| row.get(0),
            ) {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Read and decode a collection. Absent, unreadable, or corrupt stored
    /// values all fall back to `default`; failures are logged, never raised.
    fn load_or<T, F>(&self, collection: Collection, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = match self.read_raw(collection) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("failed to read {}: {:#}", collection.key(), e);
                return default();
            }
        };
        match raw {
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    warn!("discarding corrupt {} record: {}", collection.key(), e);
                    default()
                }
            },
            None => default(),
        }
    }

    /// Encode and persist a collection, then notify its subscribers with the
    /// new value. Nothing is broadcast when the write fails.
    fn save_value<T: Serialize>(&self, collection: Collection, value: &T) -> Result<()> {
        let payload = serde_json::to_value(value)
            .with_context(|| format!("Failed to encode {}", collection.key()))?;
        let encoded = payload.to_string();

        let _order = self
            .write_order
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (key, value, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
                params![collection.key(), encoded],
            )
            .with_context(|| format!("Failed to persist {}", collection.key()))?;
            Ok(())
        })?;
        self.broadcast(collection, &payload);
        Ok(())
    }

    fn broadcast(&self, collection: Collection, payload: &Value) {
        // Snapshot the handler list so handlers can subscribe/unsubscribe
        // reentrantly without holding the registry lock.
        let handlers: Vec<Callback> = {
            let subscribers = self.lock_subscribers();
            subscribers
                .get(&collection)
                .map(|list| list.iter().map(|s| Arc::clone(&s.callback)).collect())
                .unwrap_or_default()
        };
        for handler in handlers {
            handler(payload);
        }
    }

    // --- Subscriptions ---

    /// Register `handler` to receive the full new value of `collection` after
    /// every completed save, until unsubscribed.
    pub fn subscribe<F>(&self, collection: Collection, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.lock_subscribers()
            .entry(collection)
            .or_default()
            .push(Subscriber {
                id,
                callback: Arc::new(handler),
            });
        SubscriptionId { collection, id }
    }

    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        if let Some(list) = self.lock_subscribers().get_mut(&subscription.collection) {
            list.retain(|s| s.id != subscription.id);
        }
    }

    // --- Profile ---

    pub fn load_profile(&self) -> Profile {
        self.load_or(Collection::Profile, Profile::default)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.save_value(Collection::Profile, profile)
    }

    // --- Settings ---

    /// `None` until settings have been saved at least once.
    pub fn load_settings(&self) -> Option<Settings> {
        self.load_or(Collection::Settings, || None)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.save_value(Collection::Settings, settings)
    }

    /// Persist an empty record; readers re-apply per-field defaults.
    pub fn reset_settings(&self) -> Result<()> {
        self.save_value(Collection::Settings, &serde_json::json!({}))
    }

    // --- Notifications ---

    pub fn load_notifications(&self) -> Vec<Notification> {
        self.load_or(Collection::Notifications, Vec::new)
    }

    pub fn save_notifications(&self, list: &[Notification]) -> Result<()> {
        self.save_value(Collection::Notifications, &list)
    }

    pub fn push_notification(&self, notification: Notification) -> Result<()> {
        let mut list = self.load_notifications();
        list.insert(0, notification);
        self.save_notifications(&list)
    }

    /// Returns false (and writes nothing) when no notification has `id`.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let mut list = self.load_notifications();
        let Some(notification) = list.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        notification.read = true;
        self.save_notifications(&list)?;
        Ok(true)
    }

    /// Marks every notification read; returns how many were unread.
    pub fn mark_all_notifications_read(&self) -> Result<usize> {
        let mut list = self.load_notifications();
        let newly_read = list.iter().filter(|n| !n.read).count();
        for notification in &mut list {
            notification.read = true;
        }
        self.save_notifications(&list)?;
        Ok(newly_read)
    }

    pub fn remove_notification(&self, id: &str) -> Result<bool> {
        let mut list = self.load_notifications();
        let before = list.len();
        list.retain(|n| n.id != id);
        if list.len() == before {
            return Ok(false);
        }
        self.save_notifications(&list)?;
        Ok(true)
    }

    // --- Applications ---

    pub fn load_applications(&self) -> Vec<Application> {
        self.load_or(Collection::Applications, Vec::new)
    }

    pub fn save_applications(&self, list: &[Application]) -> Result<()> {
        self.save_value(Collection::Applications, &list)
    }

    pub fn record_application(&self, application: Application) -> Result<()> {
        let mut list = self.load_applications();
        list.insert(0, application);
        self.save_applications(&list)
    }

    /// Free-form status change; any status may follow any other. Refreshes
    /// the last-updated timestamp.
    pub fn update_application_status(&self, id: &str, status: ApplicationStatus) -> Result<bool> {
        let mut list = self.load_applications();
        let Some(application) = list.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        application.status = status;
        application.last_updated = chrono::Utc::now();
        self.save_applications(&list)?;
        Ok(true)
    }

    pub fn withdraw_application(&self, id: &str) -> Result<bool> {
        let mut list = self.load_applications();
        let before = list.len();
        list.retain(|a| a.id != id);
        if list.len() == before {
            return Ok(false);
        }
        self.save_applications(&list)?;
        Ok(true)
    }

    // --- Career goals ---

    pub fn load_career_goals(&self) -> Vec<CareerGoal> {
        self.load_or(Collection::CareerGoals, Vec::new)
    }

    pub fn save_career_goals(&self, list: &[CareerGoal]) -> Result<()> {
        self.save_value(Collection::CareerGoals, &list)
    }

    /// Append policy for career goals: a manual goal replaces any existing
    /// manual goal, a node-derived goal is rejected when its node reference
    /// is already tracked. Node goals never displace manual ones and vice
    /// versa.
    pub fn save_career_goal(&self, goal: CareerGoal) -> Result<GoalOutcome> {
        let mut goals = self.load_career_goals();
        match goal.kind {
            GoalKind::Node => {
                if let Some(node_id) = goal.node_id.as_deref() {
                    if goals.iter().any(|g| g.node_id.as_deref() == Some(node_id)) {
                        return Ok(GoalOutcome::Duplicate);
                    }
                }
            }
            GoalKind::Manual => {
                goals.retain(|g| g.kind != GoalKind::Manual);
            }
        }
        goals.insert(0, goal);
        self.save_career_goals(&goals)?;
        Ok(GoalOutcome::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, JobType, NotificationKind, Salary};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> Store {
        Store::open_at(dir.path().join("test.db")).expect("open store")
    }

    fn sample_job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            title: "Frontend Developer".to_string(),
            company: "TechCorp India".to_string(),
            company_info: None,
            location: "Bangalore, Karnataka".to_string(),
            salary: Salary {
                min: 800_000,
                max: 1_500_000,
                currency: "INR".to_string(),
            },
            job_type: JobType::FullTime,
            remote: false,
            description: "Build modern web applications.".to_string(),
            requirements: vec!["2-4 years experience".to_string()],
            skills: vec!["React".to_string(), "TypeScript".to_string()],
            match_score: None,
            posted_date: None,
        }
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let profile = Profile {
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            phone: Some("+91 98765 43210".to_string()),
            role: Some("Engineering Manager".to_string()),
            bio: Some("Building teams.".to_string()),
        };
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile(), profile);
    }

    #[test]
    fn test_profile_defaults_when_absent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let profile = store.load_profile();
        assert_eq!(profile.name, "Alex Johnson");
        assert_eq!(profile.email, "alex.johnson@example.com");
        assert_eq!(profile.role.as_deref(), Some("Senior Developer"));
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO records (key, value) VALUES (?1, ?2)",
                    params![Collection::Notifications.key(), "{not json"],
                )?;
                conn.execute(
                    "INSERT INTO records (key, value) VALUES (?1, ?2)",
                    params![Collection::Profile.key(), "[1, 2, 3]"],
                )?;
                Ok(())
            })
            .unwrap();

        assert!(store.load_notifications().is_empty());
        assert_eq!(store.load_profile(), Profile::default());
    }

    #[test]
    fn test_settings_none_until_saved_then_reset_reapplies_defaults() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        assert!(store.load_settings().is_none());

        let mut settings = Settings::default();
        settings.theme = "light".to_string();
        settings.weekly_digest = true;
        store.save_settings(&settings).unwrap();
        assert_eq!(store.load_settings(), Some(settings));

        store.reset_settings().unwrap();
        assert_eq!(store.load_settings(), Some(Settings::default()));
    }

    #[test]
    fn test_subscribers_observe_saves_in_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(Collection::Notifications, move |value| {
            sink.lock().unwrap().push(value.clone());
        });

        let first = vec![Notification::new(NotificationKind::System, "one", "first")];
        let second = vec![Notification::new(NotificationKind::System, "two", "second")];
        store.save_notifications(&first).unwrap();
        store.save_notifications(&second).unwrap();

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0][0]["title"], "one");
            assert_eq!(seen[1][0]["title"], "two");
        }

        store.unsubscribe(subscription);
        store.save_notifications(&first).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_all_subscribers_fire_once_per_save() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let counts: Arc<Mutex<(usize, usize)>> = Arc::new(Mutex::new((0, 0)));
        let a = Arc::clone(&counts);
        let b = Arc::clone(&counts);
        store.subscribe(Collection::Applications, move |_| a.lock().unwrap().0 += 1);
        store.subscribe(Collection::Applications, move |_| b.lock().unwrap().1 += 1);
        // A subscription on a different collection must stay silent.
        let other = Arc::clone(&counts);
        store.subscribe(Collection::Profile, move |_| {
            other.lock().unwrap().0 += 100;
        });

        store
            .record_application(Application::submitted(&sample_job("1"), None))
            .unwrap();

        assert_eq!(*counts.lock().unwrap(), (1, 1));
    }

    #[test]
    fn test_subscriber_sees_persisted_value_not_stale() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_store(&dir));

        let observed: Arc<Mutex<Option<usize>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        let reader = Arc::clone(&store);
        store.subscribe(Collection::Notifications, move |_| {
            // Re-reading from inside a handler must return the just-saved value.
            *sink.lock().unwrap() = Some(reader.load_notifications().len());
        });

        store
            .push_notification(Notification::new(NotificationKind::Job, "New match", ""))
            .unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(1));

        store
            .push_notification(Notification::new(NotificationKind::Job, "Another", ""))
            .unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(2));
    }

    #[test]
    fn test_notifications_newest_first_and_mutations() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut older = Notification::new(NotificationKind::Job, "older", "");
        older.id = "n1".to_string();
        let mut newer = Notification::new(NotificationKind::Message, "newer", "");
        newer.id = "n2".to_string();

        store.push_notification(older).unwrap();
        store.push_notification(newer).unwrap();

        let list = store.load_notifications();
        assert_eq!(list[0].id, "n2");
        assert_eq!(list[1].id, "n1");

        assert!(store.mark_notification_read("n1").unwrap());
        assert!(!store.mark_notification_read("missing").unwrap());
        assert!(store.load_notifications()[1].read);

        assert_eq!(store.mark_all_notifications_read().unwrap(), 1);
        assert!(store.load_notifications().iter().all(|n| n.read));

        assert!(store.remove_notification("n2").unwrap());
        assert!(!store.remove_notification("n2").unwrap());
        assert_eq!(store.load_notifications().len(), 1);
    }

    #[test]
    fn test_application_status_change_refreshes_last_updated() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut application = Application::submitted(&sample_job("3"), None);
        application.id = "a1".to_string();
        let applied = application.applied_date;
        store.record_application(application).unwrap();

        assert!(store
            .update_application_status("a1", ApplicationStatus::Interview)
            .unwrap());
        assert!(!store
            .update_application_status("missing", ApplicationStatus::Rejected)
            .unwrap());

        let stored = &store.load_applications()[0];
        assert_eq!(stored.status, ApplicationStatus::Interview);
        assert_eq!(stored.applied_date, applied);
        assert!(stored.last_updated >= applied);

        assert!(store.withdraw_application("a1").unwrap());
        assert!(store.load_applications().is_empty());
    }

    #[test]
    fn test_duplicate_applications_are_allowed() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let job = sample_job("4");
        store
            .record_application(Application::submitted(&job, None))
            .unwrap();
        store
            .record_application(Application::submitted(&job, None))
            .unwrap();
        assert_eq!(store.load_applications().len(), 2);
    }

    #[test]
    fn test_second_manual_goal_replaces_the_first() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let node_goal = CareerGoal::from_node("5", "Tech Lead", "InnovateLabs");
        assert_eq!(store.save_career_goal(node_goal).unwrap(), GoalOutcome::Saved);

        let first = CareerGoal::manual("Staff Engineer", "TechCorp", None, None);
        let second = CareerGoal::manual(
            "Principal Engineer",
            "TechCorp",
            Some("2 years".to_string()),
            None,
        );
        assert_eq!(store.save_career_goal(first).unwrap(), GoalOutcome::Saved);
        assert_eq!(store.save_career_goal(second).unwrap(), GoalOutcome::Saved);

        let goals = store.load_career_goals();
        let manual: Vec<_> = goals.iter().filter(|g| g.kind == GoalKind::Manual).collect();
        assert_eq!(manual.len(), 1);
        assert_eq!(manual[0].title, "Principal Engineer");
        assert!(goals
            .iter()
            .any(|g| g.kind == GoalKind::Node && g.node_id.as_deref() == Some("5")));
    }

    #[test]
    fn test_duplicate_node_goal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let goal = CareerGoal::from_node("2", "Frontend Developer", "TechCorp India");
        assert_eq!(store.save_career_goal(goal.clone()).unwrap(), GoalOutcome::Saved);
        assert_eq!(
            store.save_career_goal(goal).unwrap(),
            GoalOutcome::Duplicate
        );
        assert_eq!(store.load_career_goals().len(), 1);
    }

    #[test]
    fn test_persisted_shape_uses_fixed_keys_and_plain_json() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store.save_profile(&Profile::default()).unwrap();
        let raw = store
            .read_raw(Collection::Profile)
            .unwrap()
            .expect("profile row");
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["name"], "Alex Johnson");

        // Reopening the same file sees the same data.
        drop(store);
        let reopened = Store::open_at(dir.path().join("test.db")).unwrap();
        assert_eq!(reopened.load_profile(), Profile::default());
    }
}
