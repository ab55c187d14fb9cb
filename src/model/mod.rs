use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub stock: i64,
    #[serde(alias = "alert_threshold", alias = "stock_alert")]
    pub alert: i64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Borrowing {
    pub id: u64,
    pub borrower_name: String,
    #[serde(default)]
    pub item_id: u64,
    #[serde(default)]
    pub item_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub date_borrowed: String,
    pub due_date: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Area {
    pub id: u64,
    pub name: String,
    pub building: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewBorrowing {
    pub borrower_name: String,
    pub item_id: u64,
    pub quantity: i64,
    pub due_date: String,
    pub purpose: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewArea {
    pub name: String,
    pub building: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewInventoryItem {
    pub name: String,
    pub stock: i64,
    pub alert: i64,
    pub unit: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BorrowingList {
    #[serde(default)]
    pub borrowings: Vec<Borrowing>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InventoryList {
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AreaList {
    #[serde(default)]
    pub areas: Vec<Area>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WriteOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
