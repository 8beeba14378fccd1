use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

/// How often a `Reminder` recurs. Recurring frequencies are evaluated as
/// fixed durations since the last notification, where a month is a fixed
/// 30-day approximation rather than calendar-month arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    /// The duration between two occurrences, or `None` for a one-time
    /// reminder which never recurs.
    pub fn interval_millis(&self) -> Option<i64> {
        match self {
            Self::Once => None,
            Self::Daily => Some(MILLIS_PER_DAY),
            Self::Weekly => Some(7 * MILLIS_PER_DAY),
            Self::Biweekly => Some(14 * MILLIS_PER_DAY),
            Self::Monthly => Some(30 * MILLIS_PER_DAY),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Error, Debug)]
pub enum InvalidFrequencyError {
    #[error("Frequency: {0} is not recognized")]
    Unknown(String),
}

impl FromStr for Frequency {
    type Err = InvalidFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(InvalidFrequencyError::Unknown(s.to_string())),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of plant care a `Reminder` asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Watering,
    Fertilizing,
    Repotting,
    Custom,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watering => "watering",
            Self::Fertilizing => "fertilizing",
            Self::Repotting => "repotting",
            Self::Custom => "custom",
        }
    }

    /// Verb used in the templated notification body when the reminder
    /// has no custom message
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Watering => "water",
            Self::Fertilizing => "fertilize",
            Self::Repotting => "repot",
            Self::Custom => "care for",
        }
    }
}

#[derive(Error, Debug)]
pub enum InvalidReminderTypeError {
    #[error("Reminder type: {0} is not recognized")]
    Unknown(String),
}

impl FromStr for ReminderType {
    type Err = InvalidReminderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watering" => Ok(Self::Watering),
            "fertilizing" => Ok(Self::Fertilizing),
            "repotting" => Ok(Self::Repotting),
            "custom" => Ok(Self::Custom),
            _ => Err(InvalidReminderTypeError::Unknown(s.to_string())),
        }
    }
}

/// A `Reminder` tells the owner of a `UserPlant` that some care action is
/// due, on a one-time or recurring cadence.
///
/// `reminder_time` is an absolute timestamp in unix millis. For recurring
/// reminders it is reinterpreted each cycle as the time-of-day to preserve
/// when the schedule advances. Only the sweep advances
/// `last_notification_sent` and `reminder_time`; a `once` reminder with a
/// non-null `last_notification_sent` is permanently terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The `UserPlant` this `Reminder` is associated with; resolves through
    /// the plant's owner to the registered push token
    pub user_plant_id: ID,
    pub reminder_type: ReminderType,
    pub frequency: Frequency,
    /// Timestamp in unix millis of the scheduled occurrence
    pub reminder_time: i64,
    /// Timestamp in unix millis of the last time a notification for this
    /// `Reminder` was handed to the push transport. Null until first send.
    pub last_notification_sent: Option<i64>,
    /// Free-text notification body chosen by the user. When absent the
    /// body is templated from `reminder_type`.
    pub message: Option<String>,
}

impl Reminder {
    /// Whether the reminder should fire at `now`.
    ///
    /// First fire (nothing sent yet) uses the absolute scheduled time.
    /// After that, recurring reminders fire once their fixed interval has
    /// elapsed since the last send, and `once` reminders never fire again.
    pub fn is_due(&self, now: i64) -> bool {
        match self.last_notification_sent {
            None => now >= self.reminder_time,
            Some(last_sent) => match self.frequency.interval_millis() {
                Some(interval) => now - last_sent >= interval,
                None => false,
            },
        }
    }

    /// The next occurrence after a send at `now`, or `None` for one-time
    /// reminders.
    ///
    /// Preserves the time-of-day of the original `reminder_time`, projected
    /// onto the current date. If that projection is not in the future the
    /// frequency interval is added, so the result is always strictly greater
    /// than `now` no matter how many cycles were missed.
    pub fn next_reminder_time(&self, now: i64) -> Option<i64> {
        use chrono::TimeZone;

        let interval = self.frequency.interval_millis()?;
        let scheduled = chrono::Utc.timestamp_millis_opt(self.reminder_time).single()?;
        let now_dt = chrono::Utc.timestamp_millis_opt(now).single()?;

        let projected = now_dt
            .date_naive()
            .and_time(scheduled.time())
            .and_utc()
            .timestamp_millis();

        if projected <= now {
            Some(projected + interval)
        } else {
            Some(projected)
        }
    }

    /// The notification body: the user's own message when present,
    /// otherwise a template derived from the care type
    pub fn notification_body(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!("Time to {} your plant!", self.reminder_type.action_label()),
        }
    }
}

impl Entity for Reminder {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> i64 {
        chrono::Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .timestamp_millis()
    }

    fn reminder_factory(frequency: Frequency, reminder_time: i64) -> Reminder {
        Reminder {
            id: Default::default(),
            user_plant_id: Default::default(),
            reminder_type: ReminderType::Watering,
            frequency,
            reminder_time,
            last_notification_sent: None,
            message: None,
        }
    }

    #[test]
    fn once_reminder_fires_only_after_its_scheduled_time() {
        let reminder = reminder_factory(Frequency::Once, ts(2024, 1, 1, 9, 0, 0));
        assert!(!reminder.is_due(ts(2024, 1, 1, 8, 0, 0)));
        assert!(reminder.is_due(ts(2024, 1, 1, 10, 0, 0)));
    }

    #[test]
    fn sent_once_reminder_is_permanently_terminal() {
        let mut reminder = reminder_factory(Frequency::Once, ts(2024, 1, 1, 9, 0, 0));
        reminder.last_notification_sent = Some(ts(2024, 1, 1, 10, 0, 0));

        assert!(!reminder.is_due(ts(2024, 1, 1, 10, 0, 1)));
        assert!(!reminder.is_due(ts(2025, 6, 1, 10, 0, 0)));
        assert!(!reminder.is_due(i64::MAX));
        assert_eq!(reminder.next_reminder_time(ts(2024, 1, 1, 10, 0, 0)), None);
    }

    #[test]
    fn recurring_reminder_first_fire_uses_absolute_time() {
        let reminder = reminder_factory(Frequency::Weekly, ts(2024, 1, 1, 9, 0, 0));
        assert!(!reminder.is_due(ts(2024, 1, 1, 8, 59, 59)));
        assert!(reminder.is_due(ts(2024, 1, 1, 10, 0, 0)));
    }

    #[test]
    fn recurring_reminder_waits_out_its_interval() {
        let mut reminder = reminder_factory(Frequency::Weekly, ts(2024, 1, 1, 9, 0, 0));
        reminder.last_notification_sent = Some(ts(2024, 1, 1, 10, 0, 0));

        // 5 days after the last send: the weekly interval has not elapsed
        assert!(!reminder.is_due(ts(2024, 1, 5, 9, 0, 0)));
        // 7 days after the last send
        assert!(reminder.is_due(ts(2024, 1, 8, 10, 0, 0)));
    }

    #[test]
    fn next_reminder_time_preserves_time_of_day() {
        let reminder = reminder_factory(Frequency::Weekly, ts(2024, 1, 1, 9, 0, 0));
        let next = reminder.next_reminder_time(ts(2024, 1, 1, 10, 0, 0));
        assert_eq!(next, Some(ts(2024, 1, 8, 9, 0, 0)));
    }

    #[test]
    fn next_reminder_time_is_always_in_the_future() {
        let reminder = reminder_factory(Frequency::Weekly, ts(2024, 1, 1, 9, 0, 0));

        // Months of missed cycles: the next fire must still land after now,
        // not one interval past the last theoretical fire
        let now = ts(2024, 3, 15, 10, 0, 0);
        let next = reminder.next_reminder_time(now).unwrap();
        assert!(next > now);
        assert_eq!(next, ts(2024, 3, 22, 9, 0, 0));

        // Evaluated before today's projection of the scheduled time-of-day
        let now = ts(2024, 3, 15, 8, 0, 0);
        let next = reminder.next_reminder_time(now).unwrap();
        assert!(next > now);
        assert_eq!(next, ts(2024, 3, 15, 9, 0, 0));
    }

    #[test]
    fn daily_reminder_advances_to_tomorrow_when_sent_after_its_time() {
        let reminder = reminder_factory(Frequency::Daily, ts(2024, 1, 1, 21, 30, 0));
        let next = reminder.next_reminder_time(ts(2024, 1, 3, 22, 0, 0));
        assert_eq!(next, Some(ts(2024, 1, 4, 21, 30, 0)));
    }

    #[test]
    fn interval_is_a_fixed_thirty_days_for_monthly() {
        let mut reminder = reminder_factory(Frequency::Monthly, ts(2024, 1, 1, 9, 0, 0));
        reminder.last_notification_sent = Some(ts(2024, 1, 1, 9, 0, 0));
        assert!(!reminder.is_due(ts(2024, 1, 30, 9, 0, 0)));
        assert!(reminder.is_due(ts(2024, 1, 31, 9, 0, 0)));
    }

    #[test]
    fn notification_body_falls_back_to_care_type_template() {
        let mut reminder = reminder_factory(Frequency::Daily, 0);
        assert_eq!(reminder.notification_body(), "Time to water your plant!");

        reminder.message = Some("Misting day for the ferns".to_string());
        assert_eq!(reminder.notification_body(), "Misting day for the ferns");
    }
}
