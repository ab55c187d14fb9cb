use std::fmt;

use chrono::NaiveDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StockStatus {
    Critical,
    Low,
    Ok,
}

impl StockStatus {
    pub fn key(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Low => "low",
            Self::Ok => "ok",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Out of Stock",
            Self::Low => "Low Stock",
            Self::Ok => "In Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn stock_status(stock: i64, alert: i64) -> StockStatus {
    if stock == 0 {
        StockStatus::Critical
    } else if stock <= alert {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BorrowStatus {
    Borrowed,
    Overdue,
    Returned,
    Pending,
    Unknown(String),
}

impl BorrowStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "borrowed" => Self::Borrowed,
            "overdue" => Self::Overdue,
            "returned" => Self::Returned,
            "pending" => Self::Pending,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Borrowed => "borrowed",
            Self::Overdue => "overdue",
            Self::Returned => "returned",
            Self::Pending => "pending",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Borrowed => "Borrowed",
            Self::Overdue => "Overdue",
            Self::Returned => "Returned",
            Self::Pending => "Pending",
            Self::Unknown(_) => "Unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Borrowed | Self::Overdue)
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn due_status(today: NaiveDate, due: NaiveDate) -> BorrowStatus {
    if today > due {
        BorrowStatus::Overdue
    } else {
        BorrowStatus::Borrowed
    }
}

pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Combines the server status with the date check. Terminal states pass
/// through untouched; an unparsable due date keeps the server value.
pub fn borrow_status(server_status: &str, due_date: &str, today: NaiveDate) -> BorrowStatus {
    let reported = BorrowStatus::parse(server_status);
    if reported.is_terminal() {
        return reported;
    }
    match parse_due_date(due_date) {
        Some(due) => due_status(today, due),
        None => reported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stock_status_boundaries() {
        assert_eq!(stock_status(5, 5), StockStatus::Low);
        assert_eq!(stock_status(0, 5), StockStatus::Critical);
        assert_eq!(stock_status(10, 5), StockStatus::Ok);
        assert_eq!(stock_status(0, 0), StockStatus::Critical);
        assert_eq!(stock_status(6, 5), StockStatus::Ok);
    }

    #[test]
    fn due_date_equal_to_today_is_not_overdue() {
        let today = day(2024, 3, 10);
        assert_eq!(due_status(today, today), BorrowStatus::Borrowed);
        assert_eq!(due_status(today, day(2024, 3, 9)), BorrowStatus::Overdue);
        assert_eq!(due_status(today, day(2024, 3, 11)), BorrowStatus::Borrowed);
    }

    #[test]
    fn returned_is_never_rederived() {
        let today = day(2024, 3, 10);
        assert_eq!(
            borrow_status("returned", "2024-01-01", today),
            BorrowStatus::Returned
        );
        assert_eq!(
            borrow_status("pending", "2024-01-01", today),
            BorrowStatus::Pending
        );
    }

    #[test]
    fn server_overdue_reverts_when_due_date_moves() {
        let today = day(2024, 3, 10);
        assert_eq!(
            borrow_status("overdue", "2024-03-12", today),
            BorrowStatus::Borrowed
        );
        assert_eq!(
            borrow_status("Borrowed", "2024-03-09T00:00:00", today),
            BorrowStatus::Overdue
        );
    }

    #[test]
    fn unparsable_due_date_keeps_server_status() {
        let today = day(2024, 3, 10);
        assert_eq!(
            borrow_status("borrowed", "next week", today),
            BorrowStatus::Borrowed
        );
    }

    #[test]
    fn unknown_status_has_unknown_label() {
        let status = BorrowStatus::parse("lost");
        assert_eq!(status.label(), "Unknown");
        assert_eq!(status.key(), "lost");
    }
}
