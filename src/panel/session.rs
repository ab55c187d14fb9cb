use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::clock::Clock;

pub struct SessionClock {
    clock: Arc<dyn Clock>,
    started: DateTime<Local>,
    last_activity: DateTime<Local>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionDisplay {
    pub login_time: String,
    pub duration: String,
    pub last_activity: String,
}

impl SessionClock {
    pub fn start(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            started: now,
            last_activity: now,
        }
    }

    pub fn record_activity(&mut self) {
        self.last_activity = self.clock.now();
    }

    pub fn display(&self) -> SessionDisplay {
        let now = self.clock.now();
        let elapsed = (now - self.started).num_seconds().max(0) as u64;
        let idle = (now - self.last_activity).num_seconds().max(0) as u64;
        SessionDisplay {
            login_time: self.started.format("%H:%M:%S").to_string(),
            duration: format_duration(elapsed),
            last_activity: format_last_activity(idle),
        }
    }
}

pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn format_last_activity(idle_seconds: u64) -> String {
    if idle_seconds < 10 {
        "Just now".to_string()
    } else if idle_seconds < 60 {
        format!("{idle_seconds} seconds ago")
    } else {
        let minutes = idle_seconds / 60;
        format!("{minutes} minute{} ago", if minutes > 1 { "s" } else { "" })
    }
}
