//! Daily briefing: missed and upcoming rituals plus meal-logging reminders.
//!
//! [`build_board`] is a pure function of the clock and a store snapshot.
//! [`NotificationWatcher`] keeps a live copy of the board, recomputing it on
//! a fixed poll (to catch hour boundaries) and whenever the store changes.

use crate::dates::{self, date_key};
use crate::models::{MealType, TimeOfDay};
use crate::schedule::{self, Ritual};
use crate::store::{Snapshot, Store};
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info};

pub const LUNCH_REMINDER_ID: &str = "lunch-miss";
pub const DINNER_REMINDER_ID: &str = "dinner-miss";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Missed,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: AlertKind,
    pub message: String,
    pub subtext: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationBoard {
    pub missed_count: usize,
    pub upcoming_count: usize,
    pub missed: Vec<Notification>,
    pub upcoming: Vec<Notification>,
}

impl NotificationBoard {
    fn push(&mut self, id: &str, kind: AlertKind, message: &str, subtext: &str) {
        let alert = Notification {
            id: id.to_string(),
            kind,
            message: message.to_string(),
            subtext: subtext.to_string(),
        };
        match kind {
            AlertKind::Missed => {
                self.missed.push(alert);
                self.missed_count += 1;
            }
            AlertKind::Upcoming => {
                self.upcoming.push(alert);
                self.upcoming_count += 1;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missed.is_empty() && self.upcoming.is_empty()
    }

    /// Missed section first, each in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.missed.iter().chain(self.upcoming.iter())
    }
}

struct Window {
    bucket: TimeOfDay,
    opens_at: u32,
    /// Hour from which pending items count as missed; night items never do.
    missed_from: Option<u32>,
    missed: &'static str,
    pending: &'static str,
}

const WINDOWS: [Window; 3] = [
    Window {
        bucket: TimeOfDay::Morning,
        opens_at: 6,
        missed_from: Some(12),
        missed: "Morning Ritual Missed",
        pending: "Due this Morning",
    },
    Window {
        bucket: TimeOfDay::Midday,
        opens_at: 12,
        missed_from: Some(17),
        missed: "Midday Ritual Missed",
        pending: "Due this Afternoon",
    },
    Window {
        bucket: TimeOfDay::Night,
        opens_at: 17,
        missed_from: None,
        missed: "",
        pending: "Night Routine Pending",
    },
];

struct MealReminder {
    id: &'static str,
    meal: MealType,
    keyword: &'static str,
    /// Evaluated right after this bucket's rituals.
    after: TimeOfDay,
    hours: std::ops::Range<u32>,
    message: &'static str,
    subtext: &'static str,
}

const MEAL_REMINDERS: [MealReminder; 2] = [
    MealReminder {
        id: LUNCH_REMINDER_ID,
        meal: MealType::Lunch,
        keyword: "lunch",
        after: TimeOfDay::Midday,
        hours: 14..17,
        message: "Log Lunch",
        subtext: "Fuel your body angel 🥗",
    },
    MealReminder {
        id: DINNER_REMINDER_ID,
        meal: MealType::Dinner,
        keyword: "dinner",
        after: TimeOfDay::Night,
        hours: 20..24,
        message: "Log Dinner",
        subtext: "Close your kitchen 🌙",
    },
];

pub fn build_board(now: NaiveDateTime, snapshot: &Snapshot) -> NotificationBoard {
    let hour = now.hour();
    let today = snapshot.foods_on(&date_key(now.date()));
    let mut board = NotificationBoard::default();

    for window in &WINDOWS {
        if hour < window.opens_at {
            continue;
        }

        let meds = schedule::applicable(&snapshot.meds, snapshot.surgery_mode)
            .map(|med| med as &dyn Ritual);
        let skincare = snapshot.skincare.iter().map(|item| item as &dyn Ritual);
        for item in meds.chain(skincare) {
            if item.time_of_day() != window.bucket || schedule::is_completed_today(item, now) {
                continue;
            }
            match window.missed_from {
                Some(from) if hour >= from => {
                    board.push(item.id(), AlertKind::Missed, item.name(), window.missed)
                }
                _ => board.push(item.id(), AlertKind::Upcoming, item.name(), window.pending),
            }
        }

        for reminder in MEAL_REMINDERS.iter().filter(|r| r.after == window.bucket) {
            let logged = today
                .iter()
                .any(|food| food.is_meal(reminder.meal, reminder.keyword));
            if reminder.hours.contains(&hour) && !logged {
                board.push(
                    reminder.id,
                    AlertKind::Upcoming,
                    reminder.message,
                    reminder.subtext,
                );
            }
        }
    }

    board
}

/// Background task holding the latest board. Aborted when dropped.
pub struct NotificationWatcher {
    board: watch::Receiver<NotificationBoard>,
    task: JoinHandle<()>,
}

impl NotificationWatcher {
    pub fn spawn(store: Arc<Store>, poll: Duration) -> Self {
        Self::spawn_with_clock(store, poll, dates::now)
    }

    pub fn spawn_with_clock(store: Arc<Store>, poll: Duration, clock: fn() -> NaiveDateTime) -> Self {
        let (sender, board) = watch::channel(NotificationBoard::default());
        let mut changes = store.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = interval(poll);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    change = changes.recv() => match change {
                        Ok(change) => debug!(key = %change.key, "store changed, recomputing notifications"),
                        Err(RecvError::Lagged(skipped)) => debug!(skipped, "missed store changes, recomputing"),
                        Err(RecvError::Closed) => break,
                    },
                }

                let next = build_board(clock(), &store.snapshot().await);
                if *sender.borrow() != next {
                    info!(
                        missed = next.missed_count,
                        upcoming = next.upcoming_count,
                        "notifications updated"
                    );
                    sender.send_replace(next);
                }
            }
        });
        Self { board, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationBoard> {
        self.board.clone()
    }
}

impl Drop for NotificationWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
