//! Read-only queries over a board: staleness and completion history

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};

use super::board::Board;
use super::task::{Task, TaskState};

/// Working days shown in weekly summaries
pub const WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Unfinished tasks older than the board's stale threshold, oldest first
pub fn stale(board: &Board, now: DateTime<Utc>) -> Vec<&Task> {
    let days = board.limits().stale_days;
    let mut tasks: Vec<_> = board.tasks().filter(|t| t.is_stale(now, days)).collect();
    tasks.sort_by_key(|t| (t.created_at, t.id));
    tasks
}

/// Done tasks, most recently completed first
pub fn history(board: &Board, limit: usize) -> Vec<&Task> {
    let mut done = board.list(Some(TaskState::Done));
    done.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    done.truncate(limit);
    done
}

/// Done tasks completed at or after `since`, in completion order
pub fn completed_since(board: &Board, since: DateTime<Utc>) -> Vec<&Task> {
    let mut done: Vec<_> = board
        .tasks()
        .filter(|t| t.completed_at.is_some_and(|at| at >= since))
        .collect();
    done.sort_by_key(|t| (t.completed_at, t.id));
    done
}

/// Monday 00:00 of the week containing `now`, in `now`'s time zone
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let days_back = now.weekday().num_days_from_monday();
    let monday = now.date_naive() - Duration::days(days_back.into());
    let midnight = monday.and_time(NaiveTime::MIN);

    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Tasks completed on one working day
#[derive(Debug, Clone, PartialEq)]
pub struct DayCompletions<'a> {
    pub weekday: Weekday,
    pub tasks: Vec<&'a Task>,
}

/// Completions for the current week, Monday to Friday
#[derive(Debug, Clone, PartialEq)]
pub struct Week<'a> {
    pub start: DateTime<Utc>,
    pub days: Vec<DayCompletions<'a>>,
}

impl Week<'_> {
    /// Number of tasks completed on working days
    pub fn total(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum()
    }
}

/// Groups this week's completions by local weekday; weekend completions are dropped
pub fn week<'a, Tz: TimeZone>(board: &'a Board, now: &DateTime<Tz>) -> Week<'a> {
    let start = week_start(now);
    let tz = now.timezone();

    let mut days: Vec<DayCompletions<'a>> = WORKDAYS
        .iter()
        .map(|&weekday| DayCompletions {
            weekday,
            tasks: Vec::new(),
        })
        .collect();

    for task in completed_since(board, start) {
        let Some(at) = task.completed_at else {
            continue;
        };
        let index = at.with_timezone(&tz).weekday().num_days_from_monday() as usize;
        if let Some(day) = days.get_mut(index) {
            day.tasks.push(task);
        }
    }

    Week { start, days }
}
