pub mod analytics;
pub mod borrowing;
pub mod forms;
pub mod inventory;
pub mod monitoring;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::cache::{filter_records, Applied, Generation, Identified, ListCache, Searchable};
use crate::model::WriteOutcome;
use crate::remote::{record_path, ApiClient, RemoteError};
use crate::render::{build_body, RenderContext, RowTemplate, TableBody, TableSpec};
use crate::summary::{SlotMap, Summary};

pub use analytics::{AnalyticsPage, AnalyticsStats, TimeRange};
pub use borrowing::BorrowingPage;
pub use inventory::InventoryPage;
pub use monitoring::AreasPage;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{message}")]
    Network { message: String },
}

impl PageError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ActionText {
    pub prefix: &'static str,
    pub fallback: &'static str,
    pub show_server_message: bool,
    pub network: &'static str,
}

impl ActionText {
    pub const fn fixed(message: &'static str) -> Self {
        Self {
            prefix: "",
            fallback: message,
            show_server_message: false,
            network: message,
        }
    }

    pub const fn server_or(message: &'static str) -> Self {
        Self {
            prefix: "",
            fallback: message,
            show_server_message: true,
            network: message,
        }
    }

    pub fn rejected_message(&self, server: Option<&str>) -> String {
        let detail = match server {
            Some(m) if self.show_server_message && !m.is_empty() => m,
            _ => self.fallback,
        };
        format!("{}{}", self.prefix, detail)
    }

    pub fn map(&self, err: RemoteError) -> PageError {
        match err {
            RemoteError::Rejected { status, message } => PageError::Rejected {
                status,
                message: self.rejected_message(message.as_deref()),
            },
            _ => PageError::Network {
                message: self.network.to_string(),
            },
        }
    }
}

pub trait Resource:
    Identified + Searchable + RowTemplate + Clone + DeserializeOwned + Send + Sync + 'static
{
    const PATH: &'static str;
    const TABLE: TableSpec;

    type Envelope: DeserializeOwned + Send;

    fn into_records(envelope: Self::Envelope) -> Vec<Self>;

    fn summarize(records: &[Self], today: NaiveDate) -> Summary;

    fn slots() -> SlotMap;
}

#[derive(Debug)]
pub struct Completed {
    pub outcome: WriteOutcome,
    pub reload: Result<Applied, PageError>,
}

const LOAD_TEXT: ActionText = ActionText::server_or("Failed to load data");

#[derive(Debug)]
pub struct ListController<R: Resource> {
    client: ApiClient,
    cache: ListCache<R>,
    search: String,
}

impl<R: Resource> ListController<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: ListCache::new(),
            search: String::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn records(&self) -> &[R] {
        self.cache.records()
    }

    pub fn get(&self, id: u64) -> Option<&R> {
        self.cache.get(id)
    }

    pub fn cache_mut(&mut self) -> &mut ListCache<R> {
        &mut self.cache
    }

    pub fn begin_load(&mut self) -> Generation {
        self.cache.begin_request()
    }

    pub async fn fetch(client: &ApiClient) -> Result<Vec<R>, RemoteError> {
        let envelope: R::Envelope = client.get(R::PATH).await?;
        Ok(R::into_records(envelope))
    }

    pub fn finish_load(
        &mut self,
        generation: Generation,
        fetched: Result<Vec<R>, RemoteError>,
    ) -> Result<Applied, PageError> {
        let records = fetched.map_err(|e| LOAD_TEXT.map(e))?;
        Ok(self.cache.apply(generation, records))
    }

    pub async fn load(&mut self) -> Result<Applied, PageError> {
        let generation = self.begin_load();
        let fetched = Self::fetch(&self.client).await;
        self.finish_load(generation, fetched)
    }

    pub async fn create<B: Serialize + Sync>(
        &mut self,
        body: &B,
        text: ActionText,
    ) -> Result<Completed, PageError> {
        let outcome: WriteOutcome = self
            .client
            .post(R::PATH, body)
            .await
            .map_err(|e| text.map(e))?;
        Ok(self.reload_after(outcome).await)
    }

    pub async fn update<B: Serialize + Sync>(
        &mut self,
        id: u64,
        body: &B,
        text: ActionText,
    ) -> Result<Completed, PageError> {
        let outcome: WriteOutcome = self
            .client
            .put(&record_path(R::PATH, id), body)
            .await
            .map_err(|e| text.map(e))?;
        Ok(self.reload_after(outcome).await)
    }

    pub async fn delete(&mut self, id: u64, text: ActionText) -> Result<Completed, PageError> {
        let outcome: WriteOutcome = self
            .client
            .delete(&record_path(R::PATH, id))
            .await
            .map_err(|e| text.map(e))?;
        Ok(self.reload_after(outcome).await)
    }

    async fn reload_after(&mut self, outcome: WriteOutcome) -> Completed {
        let reload = self.load().await;
        Completed { outcome, reload }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visible(&self, today: NaiveDate) -> Vec<&R> {
        filter_records(self.cache.records(), &self.search, today)
    }

    pub fn body(&self, ctx: &RenderContext) -> TableBody {
        let view = self.visible(ctx.today);
        build_body(&R::TABLE, self.cache.len(), &view, ctx)
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        R::summarize(self.cache.records(), today)
    }
}
