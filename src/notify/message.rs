use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::{Crn, StatusReading, TermCode};

use super::Notification;

pub fn availability_message(recipient: &str, crn: &Crn, reading: &StatusReading) -> Notification {
    let open = reading.open_seats();
    Notification {
        to: recipient.to_string(),
        subject: format!("Seat open in CRN {crn}"),
        body: format!(
            "CRN {crn} now has {open} seat(s) available.\n\
             Enrolled: {current}\nCapacity: {capacity}\n\n\
             This course is no longer being monitored.\n",
            current = reading.current,
            capacity = reading.capacity,
        ),
    }
}

pub fn confirmation_message(
    recipient: &str,
    crns: &[Crn],
    term_code: &TermCode,
    cadence: Duration,
    started_at: DateTime<Utc>,
) -> Notification {
    let list = crns
        .iter()
        .map(|crn| format!("  - {crn}"))
        .collect::<Vec<_>>()
        .join("\n");

    Notification {
        to: recipient.to_string(),
        subject: format!("Monitoring {} course(s) for term {term_code}", crns.len()),
        body: format!(
            "Seat monitoring started at {started}.\n\n\
             Courses:\n{list}\n\n\
             Checking every {cadence}. You will get one email per course when a seat opens.\n",
            started = started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            cadence = describe_cadence(cadence),
        ),
    }
}

fn describe_cadence(cadence: Duration) -> String {
    let secs = cadence.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} minute(s)", secs / 60)
    } else if secs > 0 {
        format!("{secs} second(s)")
    } else {
        format!("{} ms", cadence.as_millis())
    }
}
