use crate::model::{NewArea, NewBorrowing, NewInventoryItem};
use crate::status::parse_due_date;

use super::PageError;

pub const FILL_REQUIRED: &str = "Please fill all required fields correctly.";
pub const FILL_ALL: &str = "Please fill in all fields";

pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| v * sign)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryForm {
    pub name: String,
    pub stock: String,
    pub alert: String,
    pub unit: String,
}

impl InventoryForm {
    pub fn validate(&self) -> Result<NewInventoryItem, PageError> {
        let stock = parse_int(&self.stock);
        let alert = parse_int(&self.alert);
        match (self.name.is_empty(), stock, alert) {
            (false, Some(stock), Some(alert)) => Ok(NewInventoryItem {
                name: self.name.clone(),
                stock,
                alert,
                unit: self.unit.clone(),
            }),
            _ => Err(PageError::validation(FILL_REQUIRED)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BorrowForm {
    pub borrower_name: String,
    pub item_id: String,
    pub quantity: String,
    pub due_date: String,
    pub purpose: String,
}

impl BorrowForm {
    pub fn validate(&self) -> Result<NewBorrowing, PageError> {
        let invalid = || PageError::validation(FILL_REQUIRED);
        if self.borrower_name.is_empty() || self.item_id.is_empty() || self.due_date.is_empty() {
            return Err(invalid());
        }
        let item_id = parse_int(&self.item_id)
            .and_then(|id| u64::try_from(id).ok())
            .ok_or_else(invalid)?;
        let quantity = parse_int(&self.quantity).ok_or_else(invalid)?;
        let due = parse_due_date(&self.due_date).ok_or_else(invalid)?;
        Ok(NewBorrowing {
            borrower_name: self.borrower_name.clone(),
            item_id,
            quantity,
            due_date: due.format("%Y-%m-%d").to_string(),
            purpose: self.purpose.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AreaForm {
    pub name: String,
    pub building: String,
}

impl AreaForm {
    pub fn validate(&self) -> Result<NewArea, PageError> {
        let name = self.name.trim();
        let building = self.building.trim();
        if name.is_empty() || building.is_empty() {
            return Err(PageError::validation(FILL_ALL));
        }
        Ok(NewArea {
            name: name.to_string(),
            building: building.to_string(),
        })
    }
}
