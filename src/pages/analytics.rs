use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::clock::Clock;
use crate::model::{Borrowing, InventoryItem};
use crate::remote::ApiClient;
use crate::status::{parse_due_date, StockStatus};

use super::borrowing::Loaded;
use super::ListController;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "7d" | "7" | "week" => Some(Self::Week),
            "30d" | "30" | "month" => Some(Self::Month),
            "90d" | "90" | "quarter" => Some(Self::Quarter),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::All => None,
        }
    }

    pub fn contains(self, today: NaiveDate, date_borrowed: &str) -> bool {
        let Some(days) = self.days() else {
            return true;
        };
        match parse_due_date(date_borrowed) {
            Some(date) => date > today - Duration::days(days) && date <= today,
            None => false,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::All => "all",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MostUsed {
    pub item_id: u64,
    pub item_name: String,
    pub quantity: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsStats {
    pub range: TimeRange,
    pub most_used: Option<MostUsed>,
    pub low_stock: usize,
    pub high_stock: usize,
    pub out_of_stock: usize,
}

impl AnalyticsStats {
    pub fn compute(
        inventory: &[InventoryItem],
        borrowings: &[Borrowing],
        range: TimeRange,
        today: NaiveDate,
    ) -> Self {
        let count = |wanted: StockStatus| inventory.iter().filter(|i| i.status() == wanted).count();

        let mut totals: Vec<MostUsed> = Vec::new();
        for b in borrowings
            .iter()
            .filter(|b| range.contains(today, &b.date_borrowed))
        {
            match totals.iter_mut().find(|t| t.item_id == b.item_id) {
                Some(entry) => entry.quantity += b.quantity,
                None => totals.push(MostUsed {
                    item_id: b.item_id,
                    item_name: b.item_name.clone(),
                    quantity: b.quantity,
                }),
            }
        }
        // max_by_key keeps the last maximum; first appearance wins ties.
        let most_used = totals.into_iter().fold(None::<MostUsed>, |best, next| match best {
            Some(b) if b.quantity >= next.quantity => Some(b),
            _ => Some(next),
        });

        Self {
            range,
            most_used,
            low_stock: count(StockStatus::Low),
            high_stock: count(StockStatus::Ok),
            out_of_stock: count(StockStatus::Critical),
        }
    }

    pub fn most_used_label(&self) -> String {
        match &self.most_used {
            Some(m) => m.item_name.clone(),
            None => "0".to_string(),
        }
    }
}

pub struct AnalyticsPage {
    borrowings: ListController<Borrowing>,
    inventory: ListController<InventoryItem>,
    range: TimeRange,
    clock: Arc<dyn Clock>,
}

impl AnalyticsPage {
    pub fn new(client: ApiClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            borrowings: ListController::new(client.clone()),
            inventory: ListController::new(client),
            range: TimeRange::default(),
            clock,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn set_range(&mut self, range: TimeRange) {
        self.range = range;
    }

    pub async fn refresh(&mut self) -> Loaded {
        let borrowings_gen = self.borrowings.begin_load();
        let inventory_gen = self.inventory.begin_load();
        let client = self.inventory.client().clone();
        let (borrowings, inventory) = futures::join!(
            ListController::<Borrowing>::fetch(&client),
            ListController::<InventoryItem>::fetch(&client)
        );
        Loaded {
            borrowings: self.borrowings.finish_load(borrowings_gen, borrowings),
            inventory: self.inventory.finish_load(inventory_gen, inventory),
        }
    }

    pub fn stats(&self) -> AnalyticsStats {
        AnalyticsStats::compute(
            self.inventory.records(),
            self.borrowings.records(),
            self.range,
            self.clock.today(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn borrow(id: u64, item_id: u64, name: &str, qty: i64, date: &str) -> Borrowing {
        Borrowing {
            id,
            borrower_name: "K. Lim".to_string(),
            item_id,
            item_name: name.to_string(),
            quantity: qty,
            unit: "pcs".to_string(),
            date_borrowed: date.to_string(),
            due_date: "2024-07-15".to_string(),
            status: "borrowed".to_string(),
            purpose: None,
        }
    }

    #[test]
    fn range_parsing_and_default() {
        assert_eq!(TimeRange::default(), TimeRange::Month);
        assert_eq!(TimeRange::parse("90D"), Some(TimeRange::Quarter));
        assert_eq!(TimeRange::parse("all"), Some(TimeRange::All));
        assert_eq!(TimeRange::parse("1y"), None);
        assert_eq!(TimeRange::Week.to_string(), "7d");
    }

    #[test]
    fn range_window_is_inclusive_of_today() {
        assert!(TimeRange::Week.contains(today(), "2024-06-30"));
        assert!(TimeRange::Week.contains(today(), "2024-06-24"));
        assert!(!TimeRange::Week.contains(today(), "2024-06-23"));
        assert!(!TimeRange::Week.contains(today(), "garbage"));
        assert!(TimeRange::All.contains(today(), "garbage"));
    }

    #[test]
    fn most_used_sums_quantities_within_range() {
        let borrowings = vec![
            borrow(1, 1, "Projector", 2, "2024-06-29"),
            borrow(2, 2, "Speaker", 3, "2024-06-28"),
            borrow(3, 1, "Projector", 2, "2024-06-20"),
            borrow(4, 2, "Speaker", 9, "2024-01-01"),
        ];
        let stats = AnalyticsStats::compute(&[], &borrowings, TimeRange::Month, today());
        assert_eq!(stats.most_used.as_ref().map(|m| m.quantity), Some(4));
        assert_eq!(stats.most_used_label(), "Projector");

        let stats = AnalyticsStats::compute(&[], &borrowings, TimeRange::All, today());
        assert_eq!(stats.most_used_label(), "Speaker");
    }

    #[test]
    fn ties_go_to_first_item_seen() {
        let borrowings = vec![
            borrow(1, 5, "Tripod", 1, "2024-06-29"),
            borrow(2, 6, "Mic", 1, "2024-06-29"),
        ];
        let stats = AnalyticsStats::compute(&[], &borrowings, TimeRange::Week, today());
        assert_eq!(stats.most_used_label(), "Tripod");
    }

    #[test]
    fn stock_counts_follow_item_status() {
        let item = |id, stock, alert| InventoryItem {
            id,
            name: format!("item-{id}"),
            stock,
            alert,
            unit: String::new(),
        };
        let inventory = vec![item(1, 0, 5), item(2, 5, 5), item(3, 9, 5), item(4, 12, 5)];
        let stats = AnalyticsStats::compute(&inventory, &[], TimeRange::All, today());
        assert_eq!((stats.out_of_stock, stats.low_stock, stats.high_stock), (1, 1, 2));
        assert!(stats.most_used.is_none());
        assert_eq!(stats.most_used_label(), "0");
    }
}
