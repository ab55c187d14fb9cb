use std::borrow::Cow;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::{Applied, Identified, Searchable};
use crate::clock::Clock;
use crate::model::{InventoryItem, InventoryList};
use crate::panel::{Modal, ModalEvent, ModalMode};
use crate::remote::{ApiClient, INVENTORY_PATH};
use crate::render::{
    Action, ActionKind, Cell, EmptyState, RenderContext, Row, RowTemplate, TableBody, TableSpec,
};
use crate::status::{stock_status, StockStatus};
use crate::summary::{Metric, SlotMap, Summary};

use super::forms::InventoryForm;
use super::{ListController, PageError, Resource};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";

impl InventoryItem {
    pub fn status(&self) -> StockStatus {
        stock_status(self.stock, self.alert)
    }
}

impl Identified for InventoryItem {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Searchable for InventoryItem {
    fn search_fields(&self, _today: NaiveDate) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name), Cow::Owned(self.id.to_string())]
    }
}

impl RowTemplate for InventoryItem {
    fn row(&self, _ctx: &RenderContext) -> Row {
        let status = self.status();
        Row {
            id: self.id,
            cells: vec![
                Cell::text(self.id),
                Cell::text(&self.name),
                Cell::text(self.stock),
                Cell::text(format!("<{}", self.alert)),
                Cell::text(&self.unit),
                Cell::badge(status.key(), status.label()),
            ],
            actions: vec![
                Action {
                    kind: ActionKind::Edit,
                    id: self.id,
                },
                Action {
                    kind: ActionKind::Delete,
                    id: self.id,
                },
            ],
        }
    }
}

impl Resource for InventoryItem {
    const PATH: &'static str = INVENTORY_PATH;
    const TABLE: TableSpec = TableSpec {
        body_id: "inventoryTableBody",
        columns: &["ID", "Item", "Stock", "Alert", "Unit", "Status", "Actions"],
        empty: EmptyState {
            icon: "fa-cube",
            title: "No Inventory Items",
            no_records: "Get started by adding your first inventory item.",
            no_matches: "No items match your search criteria.",
        },
    };

    type Envelope = InventoryList;

    fn into_records(envelope: InventoryList) -> Vec<Self> {
        envelope.inventory
    }

    fn summarize(records: &[Self], _today: NaiveDate) -> Summary {
        Summary::tally(
            records.len(),
            &[
                (Metric::LowStock, StockStatus::Low),
                (Metric::OutOfStock, StockStatus::Critical),
                (Metric::InStock, StockStatus::Ok),
            ],
            records.iter().map(|r| r.status()),
        )
    }

    fn slots() -> SlotMap {
        SlotMap::new()
            .with(Metric::Total, "totalItems")
            .with(Metric::LowStock, "lowStockItems")
            .with(Metric::OutOfStock, "outOfStockItems")
            .with(Metric::InStock, "inStockItems")
    }
}

/// Inventory table. The list is read from the server; adds, edits and
/// deletes stay in this page's cache and are never sent back.
pub struct InventoryPage {
    list: ListController<InventoryItem>,
    modal: Modal<InventoryForm>,
    clock: Arc<dyn Clock>,
}

impl InventoryPage {
    pub fn new(client: ApiClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            list: ListController::new(client),
            modal: Modal::new(),
            clock,
        }
    }

    pub fn list(&self) -> &ListController<InventoryItem> {
        &self.list
    }

    pub fn modal(&self) -> &Modal<InventoryForm> {
        &self.modal
    }

    pub async fn load(&mut self) -> Result<Applied, PageError> {
        self.list.load().await
    }

    pub fn open_create(&mut self) {
        self.modal.handle(ModalEvent::Open);
    }

    pub fn open_edit(&mut self, id: u64) -> bool {
        let Some(item) = self.list.get(id) else {
            return false;
        };
        let draft = InventoryForm {
            name: item.name.clone(),
            stock: item.stock.to_string(),
            alert: item.alert.to_string(),
            unit: item.unit.clone(),
        };
        self.modal.open_with(ModalMode::Edit(id), draft);
        true
    }

    pub fn close_modal(&mut self) {
        self.modal.handle(ModalEvent::Cancel);
    }

    pub fn form_mut(&mut self) -> &mut InventoryForm {
        self.modal.draft_mut()
    }

    pub fn save(&mut self) -> Result<u64, PageError> {
        let new_item = self.modal.draft().validate()?;
        let editing = match self.modal.mode() {
            Some(ModalMode::Edit(id)) => self.list.get(id).map(|_| id),
            _ => None,
        };
        let cache = self.list.cache_mut();
        let id = match editing {
            Some(id) => {
                cache.replace(InventoryItem {
                    id,
                    name: new_item.name,
                    stock: new_item.stock,
                    alert: new_item.alert,
                    unit: new_item.unit,
                });
                id
            }
            None => cache.push_local(|id| InventoryItem {
                id,
                name: new_item.name,
                stock: new_item.stock,
                alert: new_item.alert,
                unit: new_item.unit,
            }),
        };
        self.modal.handle(ModalEvent::Submitted);
        Ok(id)
    }

    pub fn delete(&mut self, id: u64) -> Option<InventoryItem> {
        self.list.cache_mut().remove(id)
    }

    pub fn set_search(&mut self, term: &str) {
        self.list.set_search(term);
    }

    pub fn context(&self) -> RenderContext {
        RenderContext {
            today: self.clock.today(),
        }
    }

    pub fn body(&self) -> TableBody {
        self.list.body(&self.context())
    }

    pub fn summary(&self) -> Summary {
        self.list.summary(self.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::remote::MemoryTransport;

    fn page_with(items: Vec<InventoryItem>) -> InventoryPage {
        let transport = Arc::new(MemoryTransport::new().with_inventory(items));
        InventoryPage::new(ApiClient::new(transport), Arc::new(SystemClock))
    }

    fn item(id: u64, name: &str, stock: i64, alert: i64) -> InventoryItem {
        InventoryItem {
            id,
            name: name.to_string(),
            stock,
            alert,
            unit: "pcs".to_string(),
        }
    }

    #[tokio::test]
    async fn edit_rewrites_item_in_place() {
        let mut page = page_with(vec![item(1, "Folder", 20, 5), item(2, "Pen", 3, 5)]);
        page.load().await.unwrap();

        assert!(page.open_edit(2));
        assert_eq!(page.modal().draft().stock, "3");
        page.form_mut().stock = "40".to_string();
        assert_eq!(page.save().unwrap(), 2);

        let records = page.list().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].stock, 40);
        assert_eq!(records[1].status(), StockStatus::Ok);
        assert!(!page.modal().is_visible());
    }

    #[tokio::test]
    async fn edit_of_unknown_id_does_not_open() {
        let mut page = page_with(vec![]);
        page.load().await.unwrap();
        assert!(!page.open_edit(99));
        assert!(!page.modal().is_visible());
    }

    #[test]
    fn invalid_form_keeps_modal_open() {
        let mut page = page_with(vec![]);
        page.open_create();
        page.form_mut().name = "Glue".to_string();
        assert!(page.save().is_err());
        assert!(page.modal().is_visible());
        assert_eq!(page.modal().draft().name, "Glue");
    }

    #[test]
    fn alert_column_renders_escaped_threshold() {
        let page = page_with(vec![]);
        let html = crate::render::build_body(
            &InventoryItem::TABLE,
            1,
            &[&item(1, "Glue", 1, 5)],
            &page.context(),
        )
        .to_html();
        assert!(html.contains("<td>&lt;5</td>"));
        assert!(html.contains("status-badge low\">Low Stock"));
    }
}
