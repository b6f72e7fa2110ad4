use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::collections::HashSet;
use std::io::stdout;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{Application, Job, Notification, NotificationKind, Profile};
use crate::store::{Collection, Store};

struct AppState {
    jobs: Vec<Job>,
    selected: usize,
    scroll_offset: u16,
    /// Catalog ids applied to during this session, for the list marker.
    applied: HashSet<String>,
    /// Total stored applications, kept current by a store subscription.
    application_count: Arc<AtomicUsize>,
    status_line: String,
}

impl AppState {
    fn new(jobs: Vec<Job>, application_count: Arc<AtomicUsize>) -> Self {
        Self {
            jobs,
            selected: 0,
            scroll_offset: 0,
            applied: HashSet::new(),
            application_count,
            status_line: String::new(),
        }
    }

    fn current_job(&self) -> Option<&Job> {
        self.jobs.get(self.selected)
    }

    fn next(&mut self) {
        if !self.jobs.is_empty() && self.selected < self.jobs.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn apply_to_current(&mut self, store: &Store, profile: &Profile) {
        let Some(job) = self.current_job().cloned() else {
            return;
        };
        if self.applied.contains(&job.id) {
            self.status_line = format!("Already applied to {} this session", job.title);
            return;
        }

        let application = Application::submitted(&job, None);
        match store.record_application(application) {
            Ok(()) => {
                // Stored notification mirrors what the dashboard produces.
                let _ = store.push_notification(Notification::new(
                    NotificationKind::Application,
                    "Application Submitted!",
                    format!(
                        "Your application for {} at {} has been submitted successfully.",
                        job.title, job.company
                    ),
                ));
                self.applied.insert(job.id);
                self.status_line = format!("Application submitted as {}", profile.email);
            }
            Err(e) => {
                self.status_line = format!("Could not save application, try again: {e}");
            }
        }
    }
}

/// Interactive browser over an already-filtered job list.
pub fn run_browse(store: &Store, jobs: Vec<Job>) -> Result<()> {
    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    let application_count = Arc::new(AtomicUsize::new(store.load_applications().len()));
    let live_count = Arc::clone(&application_count);
    let subscription = store.subscribe(Collection::Applications, move |value| {
        let count = value.as_array().map(|list| list.len()).unwrap_or(0);
        live_count.store(count, Ordering::Relaxed);
    });

    let profile = store.load_profile();
    let mut state = AppState::new(jobs, application_count);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, store, &profile);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    store.unsubscribe(subscription);

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    store: &Store,
    profile: &Profile,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('j') | KeyCode::Down => state.next(),
                KeyCode::Char('k') | KeyCode::Up => state.prev(),
                KeyCode::PageDown | KeyCode::Char('J') => state.scroll_down(),
                KeyCode::PageUp | KeyCode::Char('K') => state.scroll_up(),
                KeyCode::Char('a') => state.apply_to_current(store, profile),
                _ => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    draw_job_list(frame, state, columns[0]);
    draw_details(frame, state, columns[1]);
    draw_status_bar(frame, state, rows[1]);
}

fn draw_job_list(frame: &mut Frame, state: &AppState, area: Rect) {
    let items: Vec<ListItem> = state
        .jobs
        .iter()
        .map(|job| {
            let marker = if state.applied.contains(&job.id) {
                " [applied]"
            } else {
                ""
            };
            ListItem::new(format!("{}{}\n  {}", job.title, marker, job.company))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Jobs ({}) ", state.jobs.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_details(frame: &mut Frame, state: &AppState, area: Rect) {
    let Some(job) = state.current_job() else {
        return;
    };

    let width = area.width.saturating_sub(4).max(20) as usize;
    let mut lines: Vec<Line> = vec![
        Line::from(job.title.clone().bold()),
        Line::from(job.company.clone()),
        Line::from(""),
        Line::from(format!(
            "{}{}",
            job.location,
            if job.remote { "  (remote)" } else { "" }
        )),
        Line::from(format!("{}  ·  {}", job.salary, job.job_type)),
    ];
    if let Some(score) = job.match_score {
        lines.push(Line::from(format!("{}% match", score)));
    }
    if let Some(posted) = job.posted_date {
        lines.push(Line::from(format!("Posted {}", posted.format("%Y-%m-%d"))));
    }

    lines.push(Line::from(""));
    for wrapped in textwrap::wrap(&job.description, width) {
        lines.push(Line::from(wrapped.into_owned()));
    }

    if !job.requirements.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("Requirements".bold()));
        for requirement in &job.requirements {
            for (i, wrapped) in textwrap::wrap(requirement, width.saturating_sub(2)).iter().enumerate() {
                let prefix = if i == 0 { "- " } else { "  " };
                lines.push(Line::from(format!("{}{}", prefix, wrapped)));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!("Skills: {}", job.skills.join(", "))));

    let details = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(details, area);
}

fn draw_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let count = state.application_count.load(Ordering::Relaxed);
    let bar = format!(
        " {} application(s) on file · a apply · j/k move · J/K scroll · q quit  {}",
        count, state.status_line
    );
    frame.render_widget(
        Paragraph::new(bar).style(Style::default().add_modifier(Modifier::DIM)),
        area,
    );
}
