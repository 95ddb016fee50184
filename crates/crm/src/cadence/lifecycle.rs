//! Pure lifecycle rules for lead cadences: the status table plus the date
//! arithmetic used when scheduling and resuming.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use entity::{activity, cadence_step, lead_cadence::Status};
use platform_api::ApiError;
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;

/// Latest day offset a cadence step may use.
pub const MAX_STEP_DAY: i32 = 3_650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pause,
    Resume,
    Cancel,
    Complete,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Cadência já finalizada")]
    Finished,
    #[error("Só é possível pausar uma cadência ativa")]
    PauseRequiresActive,
    #[error("Só é possível retomar uma cadência pausada")]
    ResumeRequiresPaused,
    #[error("Só é possível concluir uma cadência ativa")]
    CompleteRequiresActive,
}

impl From<LifecycleError> for ApiError {
    fn from(value: LifecycleError) -> Self {
        ApiError::conflict(value.to_string())
    }
}

pub fn is_terminal(status: Status) -> bool {
    matches!(status, Status::Completed | Status::Cancelled)
}

/// `active ⇄ paused`, `active → completed`, `active|paused → cancelled`.
pub fn transition(from: Status, action: Transition) -> Result<Status, LifecycleError> {
    if is_terminal(from) {
        return Err(LifecycleError::Finished);
    }
    match (from, action) {
        (Status::Active, Transition::Pause) => Ok(Status::Paused),
        (_, Transition::Pause) => Err(LifecycleError::PauseRequiresActive),
        (Status::Paused, Transition::Resume) => Ok(Status::Active),
        (_, Transition::Resume) => Err(LifecycleError::ResumeRequiresPaused),
        (_, Transition::Cancel) => Ok(Status::Cancelled),
        (Status::Active, Transition::Complete) => Ok(Status::Completed),
        (_, Transition::Complete) => Err(LifecycleError::CompleteRequiresActive),
    }
}

pub fn scheduled_date(start: NaiveDate, day_number: i32) -> Option<NaiveDate> {
    shift_date(start, i64::from(day_number))
}

/// Moves a date by whole days; `None` past the calendar range.
pub fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Whole days between pausing and resuming, rounded to the nearest day.
pub fn pause_duration_days(paused_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (now - paused_at).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds + SECONDS_PER_DAY / 2) / SECONDS_PER_DAY
}

/// Only touches that were still ahead when the cadence was paused move.
pub fn should_shift(completed: bool, due_date: NaiveDate, paused_on: NaiveDate) -> bool {
    !completed && due_date > paused_on
}

pub fn progress(completed_steps: i32, total_steps: i32) -> i32 {
    if total_steps <= 0 {
        return 0;
    }
    (completed_steps * 100 + total_steps / 2) / total_steps
}

pub fn activity_kind(channel: cadence_step::Channel) -> activity::Kind {
    match channel {
        cadence_step::Channel::Email => activity::Kind::Email,
        cadence_step::Channel::Linkedin => activity::Kind::Linkedin,
        cadence_step::Channel::Whatsapp => activity::Kind::Whatsapp,
        cadence_step::Channel::Call => activity::Kind::Call,
        cadence_step::Channel::Meeting => activity::Kind::Meeting,
        cadence_step::Channel::Instagram => activity::Kind::Instagram,
        cadence_step::Channel::Other => activity::Kind::Task,
    }
}
