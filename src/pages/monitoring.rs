use std::borrow::Cow;
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;

use crate::cache::{Applied, Identified, Searchable};
use crate::clock::Clock;
use crate::model::{Area, AreaList, WriteOutcome};
use crate::panel::{Modal, ModalEvent};
use crate::remote::{record_path, ApiClient, ApiRequest, AREAS_PATH};
use crate::render::{
    Action, ActionKind, Cell, EmptyState, RenderContext, Row, RowTemplate, TableBody, TableSpec,
};
use crate::summary::{Metric, SlotMap, Summary};

use super::forms::AreaForm;
use super::{ActionText, Completed, ListController, PageError, Resource};

pub const ADDED: &str = "Area added successfully!";
pub const DELETED: &str = "Area deleted successfully!";
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this area? This action cannot be undone.";

const ADD_TEXT: ActionText = ActionText {
    prefix: "Error: ",
    fallback: "Unknown error",
    show_server_message: true,
    network: "An error occurred while adding the area",
};

const DELETE_TEXT: ActionText = ActionText {
    prefix: "Error: ",
    fallback: "Unknown error",
    show_server_message: true,
    network: "An error occurred while deleting the area",
};

impl Identified for Area {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Searchable for Area {
    fn search_fields(&self, _today: NaiveDate) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.name), Cow::Borrowed(&self.building)]
    }
}

impl RowTemplate for Area {
    fn row(&self, _ctx: &RenderContext) -> Row {
        let status = self.status.as_deref().unwrap_or("active");
        let actions = [
            ActionKind::View,
            ActionKind::Camera,
            ActionKind::Edit,
            ActionKind::Delete,
        ]
        .into_iter()
        .map(|kind| Action { kind, id: self.id })
        .collect();
        Row {
            id: self.id,
            cells: vec![
                Cell::text(self.id),
                Cell::text(&self.name),
                Cell::text(&self.building),
                Cell::badge(status.to_lowercase(), title_case(status)),
            ],
            actions,
        }
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Resource for Area {
    const PATH: &'static str = AREAS_PATH;
    const TABLE: TableSpec = TableSpec {
        body_id: "monitoringTableBody",
        columns: &["ID", "Area", "Building", "Status", "Actions"],
        empty: EmptyState {
            icon: "fa-building",
            title: "No Areas",
            no_records: "No areas are being monitored yet. Add one to get started.",
            no_matches: "No areas match your search criteria.",
        },
    };

    type Envelope = AreaList;

    fn into_records(envelope: AreaList) -> Vec<Self> {
        envelope.areas
    }

    fn summarize(records: &[Self], _today: NaiveDate) -> Summary {
        let mut summary = Summary::default();
        summary.set(Metric::Total, records.len());
        summary.set(Metric::Areas, records.len());
        summary
    }

    fn slots() -> SlotMap {
        SlotMap::new().with(Metric::Areas, "totalAreas")
    }
}

/// Monitored areas. A write only counts as done when the server answers
/// with 2xx and a JSON `message`.
pub struct AreasPage {
    list: ListController<Area>,
    modal: Modal<AreaForm>,
    clock: Arc<dyn Clock>,
}

impl AreasPage {
    pub fn new(client: ApiClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            list: ListController::new(client),
            modal: Modal::new(),
            clock,
        }
    }

    pub fn list(&self) -> &ListController<Area> {
        &self.list
    }

    pub fn modal(&self) -> &Modal<AreaForm> {
        &self.modal
    }

    pub async fn load(&mut self) -> Result<Applied, PageError> {
        self.list.load().await
    }

    pub fn open_create(&mut self) {
        self.modal.handle(ModalEvent::Open);
    }

    pub fn close_modal(&mut self) {
        self.modal.handle(ModalEvent::Cancel);
    }

    pub fn form_mut(&mut self) -> &mut AreaForm {
        self.modal.draft_mut()
    }

    pub async fn add(&mut self) -> Result<Completed, PageError> {
        let body = self.modal.draft().validate()?;
        let body = serde_json::to_value(&body).map_err(|_| PageError::Network {
            message: ADD_TEXT.network.to_string(),
        })?;
        let request = ApiRequest {
            method: Method::POST,
            path: AREAS_PATH.to_string(),
            body: Some(body),
        };
        let done = self.write(request, ADD_TEXT).await?;
        self.modal.handle(ModalEvent::Submitted);
        Ok(done)
    }

    pub async fn delete(&mut self, id: u64) -> Result<Completed, PageError> {
        let request = ApiRequest::delete(record_path(AREAS_PATH, id));
        self.write(request, DELETE_TEXT).await
    }

    async fn write(&mut self, request: ApiRequest, text: ActionText) -> Result<Completed, PageError> {
        let response = self
            .list
            .client()
            .exchange(request)
            .await
            .map_err(|e| text.map(e))?;
        let outcome: WriteOutcome =
            serde_json::from_str(&response.body).map_err(|_| PageError::Network {
                message: text.network.to_string(),
            })?;
        if outcome.message.is_none() {
            return Err(PageError::Rejected {
                status: response.status,
                message: text.rejected_message(outcome.error.as_deref()),
            });
        }
        let reload = self.list.load().await;
        Ok(Completed { outcome, reload })
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
