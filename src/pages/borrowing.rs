use std::borrow::Cow;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::{Applied, Identified, Searchable};
use crate::clock::Clock;
use crate::model::{Borrowing, BorrowingList, InventoryItem, StatusUpdate};
use crate::panel::{Modal, ModalEvent, ModalMode};
use crate::remote::{ApiClient, BORROWINGS_PATH};
use crate::render::{
    render_options, Action, ActionKind, Cell, EmptyState, RenderContext, Row, RowTemplate,
    TableBody, TableSpec,
};
use crate::status::{borrow_status, BorrowStatus};
use crate::summary::{Metric, SlotMap, Summary};

use super::forms::BorrowForm;
use super::{ActionText, Completed, ListController, PageError, Resource};

pub const RETURN_PROMPT: &str = "Mark this item as returned?";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this borrowing record?";
pub const ITEM_PLACEHOLDER: &str = "Select an item...";

const CREATE_TEXT: ActionText = ActionText::server_or("Failed to create borrowing");
const RETURN_TEXT: ActionText = ActionText::fixed("Failed to mark as returned");
const DELETE_TEXT: ActionText = ActionText::fixed("Failed to delete borrowing");

impl Borrowing {
    pub fn derived_status(&self, today: NaiveDate) -> BorrowStatus {
        borrow_status(&self.status, &self.due_date, today)
    }
}

impl Identified for Borrowing {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Searchable for Borrowing {
    fn search_fields(&self, today: NaiveDate) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.borrower_name),
            Cow::Borrowed(&self.item_name),
            Cow::Owned(self.derived_status(today).key().to_string()),
        ]
    }
}

impl RowTemplate for Borrowing {
    fn row(&self, ctx: &RenderContext) -> Row {
        let status = self.derived_status(ctx.today);
        let mut actions = Vec::with_capacity(2);
        if status == BorrowStatus::Borrowed {
            actions.push(Action {
                kind: ActionKind::MarkReturned,
                id: self.id,
            });
        }
        actions.push(Action {
            kind: ActionKind::Delete,
            id: self.id,
        });
        Row {
            id: self.id,
            cells: vec![
                Cell::text(&self.borrower_name),
                Cell::text(&self.item_name),
                Cell::text(format!("{} {}", self.quantity, self.unit)),
                Cell::text(&self.date_borrowed),
                Cell::text(&self.due_date),
                Cell::badge(status.key(), status.label()),
            ],
            actions,
        }
    }
}

impl Resource for Borrowing {
    const PATH: &'static str = BORROWINGS_PATH;
    const TABLE: TableSpec = TableSpec {
        body_id: "borrowingTableBody",
        columns: &[
            "Borrower",
            "Item",
            "Quantity",
            "Date Borrowed",
            "Due Date",
            "Status",
            "Actions",
        ],
        empty: EmptyState {
            icon: "fa-exchange-alt",
            title: "No Borrowings",
            no_records: "No borrowings recorded yet. Start by creating a new borrow request.",
            no_matches: "No borrowings match your search criteria.",
        },
    };

    type Envelope = BorrowingList;

    fn into_records(envelope: BorrowingList) -> Vec<Self> {
        envelope.borrowings
    }

    fn summarize(records: &[Self], today: NaiveDate) -> Summary {
        Summary::tally(
            records.len(),
            &[
                (Metric::Active, BorrowStatus::Borrowed),
                (Metric::Overdue, BorrowStatus::Overdue),
                (Metric::Returned, BorrowStatus::Returned),
            ],
            records.iter().map(|r| r.derived_status(today)),
        )
    }

    fn slots() -> SlotMap {
        SlotMap::new()
            .with(Metric::Total, "totalBorrowings")
            .with(Metric::Active, "activeBorrowings")
            .with(Metric::Overdue, "overdueBorrowings")
            .with(Metric::Returned, "returnedBorrowings")
    }
}

#[derive(Debug)]
pub struct Loaded {
    pub borrowings: Result<Applied, PageError>,
    pub inventory: Result<Applied, PageError>,
}

pub struct BorrowingPage {
    borrowings: ListController<Borrowing>,
    inventory: ListController<InventoryItem>,
    modal: Modal<BorrowForm>,
    clock: Arc<dyn Clock>,
}

impl BorrowingPage {
    pub fn new(client: ApiClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            borrowings: ListController::new(client.clone()),
            inventory: ListController::new(client),
            modal: Modal::new(),
            clock,
        }
    }

    pub fn list(&self) -> &ListController<Borrowing> {
        &self.borrowings
    }

    pub fn inventory(&self) -> &ListController<InventoryItem> {
        &self.inventory
    }

    pub fn modal(&self) -> &Modal<BorrowForm> {
        &self.modal
    }

    pub async fn load(&mut self) -> Loaded {
        let borrowings_gen = self.borrowings.begin_load();
        let inventory_gen = self.inventory.begin_load();
        let client = self.borrowings.client().clone();
        let (borrowings, inventory) = futures::join!(
            ListController::<Borrowing>::fetch(&client),
            ListController::<InventoryItem>::fetch(&client)
        );
        Loaded {
            borrowings: self.borrowings.finish_load(borrowings_gen, borrowings),
            inventory: self.inventory.finish_load(inventory_gen, inventory),
        }
    }

    pub fn open_create(&mut self) {
        self.modal.handle(ModalEvent::Open);
    }

    /// Pre-fills the dialog from a cached borrowing. Saving still submits a
    /// new borrow request; the server has no edit endpoint.
    pub fn open_edit(&mut self, id: u64) -> bool {
        let Some(borrow) = self.borrowings.get(id) else {
            return false;
        };
        let draft = BorrowForm {
            borrower_name: borrow.borrower_name.clone(),
            item_id: borrow.item_id.to_string(),
            quantity: borrow.quantity.to_string(),
            due_date: borrow.due_date.clone(),
            purpose: borrow.purpose.clone().unwrap_or_default(),
        };
        self.modal.open_with(ModalMode::Edit(id), draft);
        true
    }

    pub fn close_modal(&mut self) {
        self.modal.handle(ModalEvent::Cancel);
    }

    pub fn form_mut(&mut self) -> &mut BorrowForm {
        self.modal.draft_mut()
    }

    pub async fn save(&mut self) -> Result<Completed, PageError> {
        let body = self.modal.draft().validate()?;
        let done = self.borrowings.create(&body, CREATE_TEXT).await?;
        self.modal.handle(ModalEvent::Submitted);
        Ok(self.refresh_inventory(done).await)
    }

    pub async fn mark_returned(&mut self, id: u64) -> Result<Completed, PageError> {
        let body = StatusUpdate {
            status: BorrowStatus::Returned.key().to_string(),
        };
        let done = self.borrowings.update(id, &body, RETURN_TEXT).await?;
        Ok(self.refresh_inventory(done).await)
    }

    pub async fn delete(&mut self, id: u64) -> Result<Completed, PageError> {
        let done = self.borrowings.delete(id, DELETE_TEXT).await?;
        Ok(self.refresh_inventory(done).await)
    }

    async fn refresh_inventory(&mut self, mut done: Completed) -> Completed {
        if let Err(err) = self.inventory.load().await {
            if done.reload.is_ok() {
                done.reload = Err(err);
            }
        }
        done
    }

    pub fn set_search(&mut self, term: &str) {
        self.borrowings.set_search(term);
    }

    pub fn context(&self) -> RenderContext {
        RenderContext {
            today: self.clock.today(),
        }
    }

    pub fn body(&self) -> TableBody {
        self.borrowings.body(&self.context())
    }

    pub fn summary(&self) -> Summary {
        self.borrowings.summary(self.clock.today())
    }

    pub fn item_choices(&self) -> Vec<(String, String)> {
        self.inventory
            .records()
            .iter()
            .map(|item| {
                (
                    item.id.to_string(),
                    format!("{} ({} {} available)", item.name, item.stock, item.unit),
                )
            })
            .collect()
    }

    pub fn item_options_html(&self) -> String {
        render_options(ITEM_PLACEHOLDER, &self.item_choices())
    }
}
