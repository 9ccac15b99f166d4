use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use anyhow::{Context, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};

use crewcal::{
    calendar::{CalendarEvent, Notifications, SourceKind},
    records::PersonalTodo,
    storage::{Config, LocalStore},
    sync::{CalendarDataSource, CalendarLoader, RestDataSource, Session},
};

use crate::sample_data;

pub const USAGE: &str = "Usage: crewcal [--agenda [YYYY/MM/DD]] [--notifications] [--sample] [--json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Agenda { date: NaiveDate, sample: bool, json: bool },
    Notifications { sample: bool },
    Help,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1), Local::now().date_naive())
}

pub fn parse_args<I>(args: I, today: NaiveDate) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut sample = false;
    let mut json = false;
    let mut notifications = false;
    let mut agenda_date = None;
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => sample = true,
            "--json" => json = true,
            "--notifications" => notifications = true,
            "--agenda" => {
                let target_date = match args.next_if(|next| !next.starts_with("--")) {
                    Some(date_str) => NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
                        .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))?,
                    None => today,
                };
                agenda_date = Some(target_date);
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    if notifications {
        if agenda_date.is_some() {
            return Err("--agenda and --notifications cannot be combined".to_string());
        }
        return Ok(CliMode::Notifications { sample });
    }

    Ok(CliMode::Agenda {
        date: agenda_date.unwrap_or(today),
        sample,
        json,
    })
}

pub async fn run_agenda_mode(date: NaiveDate, sample: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_create().context("loading config")?;
    let (source, session) = open_source(&config, sample)?;
    let loader = CalendarLoader::new(source);

    let events = loader.load_events(session.as_ref()).await;
    let day = events_on(events, date);

    if json {
        println!("{}", serde_json::to_string_pretty(&day)?);
        return Ok(());
    }

    let agenda = format_agenda_text(date, &day, config.time_pattern());
    if config.agenda.use_pager {
        display_with_pager(&agenda)?;
    } else {
        println!("{agenda}");
    }
    Ok(())
}

pub async fn run_notifications_mode(sample: bool) -> anyhow::Result<()> {
    let config = Config::load_or_create().context("loading config")?;
    let (source, session) = open_source(&config, sample)?;
    let loader = CalendarLoader::new(source);

    let notifications = loader.load_notifications(session.as_ref(), Utc::now()).await;
    println!("{}", format_notifications(&notifications, config.time_pattern()));
    Ok(())
}

fn open_source(
    config: &Config,
    sample: bool,
) -> anyhow::Result<(Box<dyn CalendarDataSource>, Option<Session>)> {
    if sample {
        let store = LocalStore::in_memory()?;
        sample_data::seed(&store, Local::now().date_naive())?;
        return Ok((Box::new(store), Some(Session::new(sample_data::SAMPLE_USER))));
    }

    if config.storage.offline_mode {
        tracing::info!("Reading calendar from {}", config.storage.database.display());
        let store = LocalStore::open(&config.storage.database)
            .with_context(|| format!("opening {}", config.storage.database.display()))?;
        return Ok((Box::new(store), config.session()));
    }

    if config.backend.url.is_empty() {
        bail!(
            "No backend configured. Set [backend] url in {} or enable storage.offline_mode.",
            Config::config_path().display()
        );
    }

    let mut client = RestDataSource::new(&config.backend.url, &config.backend.api_key);
    if let Some(token) = &config.backend.access_token {
        client = client.with_access_token(token);
    }
    Ok((Box::new(client), config.session()))
}

/// Events starting on `date` in local time, in start order. Ties keep the
/// aggregated order.
fn events_on(events: Vec<CalendarEvent>, date: NaiveDate) -> Vec<CalendarEvent> {
    let mut day: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|event| event.start.with_timezone(&Local).date_naive() == date)
        .collect();
    day.sort_by_key(|event| event.start);
    day
}

fn format_agenda_text(date: NaiveDate, events: &[CalendarEvent], time_pattern: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Agenda – {}", date.format("%A, %B %d, %Y")));
    lines.push(String::new());

    if events.is_empty() {
        lines.push("Nothing scheduled.".to_string());
    } else {
        for event in events {
            lines.push(format!("- {}", build_agenda_line(event, time_pattern, usize::MAX)));
        }
    }

    lines.push(String::new());
    lines.push(legend_line());
    lines.join("\n")
}

fn build_agenda_line(event: &CalendarEvent, time_pattern: &str, width: usize) -> String {
    let time_label = format!(
        "{}-{}",
        format_local(event.start, time_pattern),
        format_local(event.end, time_pattern)
    );
    let line = format!("{:<13} {}", time_label, event.title);
    truncate_to_width(&line, width)
}

fn legend_line() -> String {
    let entries: Vec<String> = SourceKind::legend()
        .iter()
        .map(|(kind, color)| format!("{} {} {}", kind.title_prefix(), kind, color))
        .collect();
    entries.join("  ")
}

fn format_notifications(notifications: &Notifications, time_pattern: &str) -> String {
    let mut lines = vec!["Upcoming (next 4 hours):".to_string()];
    push_todo_lines(&mut lines, &notifications.upcoming, time_pattern, "No upcoming todos.");
    lines.push(String::new());
    lines.push("Recently completed:".to_string());
    push_todo_lines(&mut lines, &notifications.recently_completed, time_pattern, "Nothing completed yet.");
    lines.join("\n")
}

fn push_todo_lines(lines: &mut Vec<String>, todos: &[PersonalTodo], time_pattern: &str, empty: &str) {
    if todos.is_empty() {
        lines.push(format!("  {}", empty));
    }
    for todo in todos {
        lines.push(format!("  {} {}", format_local(todo.scheduled_at, time_pattern), todo.title));
    }
}

fn format_local(instant: DateTime<Utc>, time_pattern: &str) -> String {
    instant.with_timezone(&Local).format(time_pattern).to_string()
}

fn truncate_to_width(line: &str, width: usize) -> String {
    if width > 0 && line.chars().count() > width {
        let mut truncated = line.chars().take(width.saturating_sub(1)).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        line.to_string()
    }
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            print!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            print!("{text}");
        }
    }

    Ok(())
}
