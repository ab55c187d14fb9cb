use std::sync::Arc;

use chrono::{Local, TimeZone};
use reqwest::Method;

use crate::cache::Applied;
use crate::clock::{Clock, FixedClock};
use crate::model::{Area, Borrowing, InventoryItem};
use crate::pages::{
    forms, AnalyticsPage, AreasPage, BorrowingPage, InventoryPage, ListController, PageError,
    Resource, TimeRange,
};
use crate::remote::{ApiClient, ApiResponse, MemoryTransport, BORROWINGS_PATH};
use crate::render::{ActionKind, EmptyReason, TableBody};
use crate::status::StockStatus;
use crate::summary::Metric;

fn clock_at(y: i32, m: u32, d: u32) -> FixedClock {
    FixedClock::new(Local.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap())
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

fn borrowing(id: u64, item_id: u64, status: &str, due: &str) -> Borrowing {
    Borrowing {
        id,
        borrower_name: "A. Dela Cruz".to_string(),
        item_id,
        item_name: "Projector".to_string(),
        quantity: 1,
        unit: "unit".to_string(),
        date_borrowed: "2024-05-01".to_string(),
        due_date: due.to_string(),
        status: status.to_string(),
        purpose: None,
    }
}

fn client(transport: &Arc<MemoryTransport>) -> ApiClient {
    ApiClient::new(transport.clone())
}

fn body_html(body: &TableBody) -> String {
    body.to_html()
}

#[tokio::test]
async fn new_out_of_stock_item_shows_critical_and_counts() {
    let transport = Arc::new(MemoryTransport::new().with_inventory(vec![item(1, "Marker", 12, 5)]));
    let clock = Arc::new(clock_at(2024, 5, 10));
    let mut page = InventoryPage::new(client(&transport), clock);
    page.load().await.unwrap();
    let before = page.summary().get(Metric::OutOfStock);

    page.open_create();
    let form = page.form_mut();
    form.name = "Printer ink".to_string();
    form.stock = "0".to_string();
    form.alert = "5".to_string();
    form.unit = "pcs".to_string();
    let id = page.save().unwrap();

    let added = page.list().get(id).unwrap();
    assert_eq!(added.status(), StockStatus::Critical);
    assert_eq!(page.summary().get(Metric::OutOfStock), before + 1);
    assert_eq!(page.summary().get(Metric::Total), 2);

    let html = body_html(&page.body());
    assert!(html.contains("Printer ink"));
    assert!(html.contains("status-badge critical\">Out of Stock"));
    // Local adds never reach the server.
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn delete_removes_only_that_item_and_ids_are_not_reused() {
    let transport = Arc::new(MemoryTransport::new().with_inventory(vec![
        item(1, "Marker", 12, 5),
        item(2, "Tape", 3, 5),
        item(3, "Glue", 0, 2),
    ]));
    let mut page = InventoryPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await.unwrap();

    let removed = page.delete(2).unwrap();
    assert_eq!(removed.name, "Tape");
    let ids: Vec<u64> = page.list().records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(page.summary().get(Metric::Total), 2);
    assert_eq!(page.summary().get(Metric::LowStock), 0);
    assert!(page.delete(2).is_none());

    page.open_create();
    let form = page.form_mut();
    form.name = "Stapler".to_string();
    form.stock = "4".to_string();
    form.alert = "1".to_string();
    let first = page.save().unwrap();
    assert_eq!(first, 4);
    page.delete(first);

    page.open_create();
    let form = page.form_mut();
    form.name = "Scissors".to_string();
    form.stock = "4".to_string();
    form.alert = "1".to_string();
    assert_eq!(page.save().unwrap(), 5);
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_one() {
    let transport = Arc::new(MemoryTransport::new().with_inventory(vec![item(1, "Marker", 12, 5)]));
    let api = client(&transport);
    let mut list: ListController<InventoryItem> = ListController::new(api.clone());

    let older = list.begin_load();
    let older_result = ListController::<InventoryItem>::fetch(&api).await;
    let newer = list.begin_load();
    let newer_result = Ok(vec![item(1, "Marker", 12, 5), item(2, "Tape", 3, 5)]);

    let applied = list.finish_load(newer, newer_result).unwrap();
    assert!(applied.is_replaced());
    let applied = list.finish_load(older, older_result).unwrap();
    assert!(matches!(applied, Applied::Stale { .. }));
    assert_eq!(list.records().len(), 2);
}

#[tokio::test]
async fn failed_load_keeps_previous_cache() {
    let transport = Arc::new(MemoryTransport::new().with_inventory(vec![item(1, "Marker", 12, 5)]));
    let mut page = InventoryPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await.unwrap();

    transport.set_offline(true);
    let err = page.load().await.unwrap_err();
    assert!(matches!(err, PageError::Network { .. }));
    assert_eq!(page.list().records().len(), 1);
}

#[tokio::test]
async fn empty_state_distinguishes_no_records_from_no_matches() {
    let transport = Arc::new(MemoryTransport::new());
    let mut page = InventoryPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await.unwrap();

    let body = page.body();
    assert_eq!(body.empty_reason(), Some(EmptyReason::NoRecords));
    assert!(body_html(&body).contains("Get started by adding your first inventory item."));
    assert!(body_html(&body).contains(&format!(
        "colspan=\"{}\"",
        InventoryItem::TABLE.columns.len()
    )));

    page.open_create();
    page.form_mut().name = "Marker".to_string();
    page.form_mut().stock = "3".to_string();
    page.form_mut().alert = "1".to_string();
    page.save().unwrap();
    page.set_search("projector");
    let body = page.body();
    assert_eq!(body.empty_reason(), Some(EmptyReason::NoMatches));
    assert!(body_html(&body).contains("No items match your search criteria."));

    page.set_search("MARK");
    assert_eq!(page.body().rows().len(), 1);
}

#[tokio::test]
async fn creating_a_borrowing_reloads_both_lists() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_inventory(vec![item(2, "Projector", 3, 1)])
            .with_borrow_date("2024-05-10"),
    );
    let mut page = BorrowingPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await.borrowings.unwrap();

    page.open_create();
    let form = page.form_mut();
    form.borrower_name = "J. Cruz".to_string();
    form.item_id = "2".to_string();
    form.quantity = "2".to_string();
    form.due_date = "2024-05-20".to_string();
    let done = page.save().await.unwrap();
    assert!(done.reload.is_ok());
    assert!(!page.modal().is_visible());

    let rows = page.body();
    assert_eq!(rows.rows().len(), 1);
    assert!(rows.rows()[0].has_action(ActionKind::MarkReturned));
    assert_eq!(page.inventory().records()[0].stock, 1);
    assert_eq!(page.summary().get(Metric::Active), 1);

    let post = transport
        .requests()
        .into_iter()
        .find(|r| r.method == Method::POST)
        .unwrap();
    assert_eq!(post.path, BORROWINGS_PATH);
    let body = post.body.unwrap();
    assert_eq!(body["item_id"], 2);
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["due_date"], "2024-05-20");
}

#[tokio::test]
async fn invalid_borrow_form_never_reaches_the_server() {
    let transport = Arc::new(MemoryTransport::new().with_inventory(vec![item(2, "Projector", 3, 1)]));
    let mut page = BorrowingPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await;
    let sent = transport.requests().len();

    page.open_create();
    page.form_mut().borrower_name = "J. Cruz".to_string();
    page.form_mut().item_id = "2".to_string();
    page.form_mut().quantity = "two".to_string();
    page.form_mut().due_date = "2024-05-20".to_string();
    let err = page.save().await.unwrap_err();
    assert_eq!(err, PageError::validation(forms::FILL_REQUIRED));
    assert_eq!(transport.requests().len(), sent);
    assert!(page.modal().is_visible());
}

#[tokio::test]
async fn rejected_borrowing_shows_server_message_or_fallback() {
    let transport = Arc::new(MemoryTransport::new().with_inventory(vec![item(2, "Projector", 1, 1)]));
    let mut page = BorrowingPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await;

    page.open_create();
    let form = page.form_mut();
    form.borrower_name = "J. Cruz".to_string();
    form.item_id = "2".to_string();
    form.quantity = "5".to_string();
    form.due_date = "2024-05-20".to_string();
    let err = page.save().await.unwrap_err();
    assert_eq!(err.to_string(), "Insufficient stock");

    transport.set_offline(true);
    let err = page.save().await.unwrap_err();
    assert_eq!(
        err,
        PageError::Network {
            message: "Failed to create borrowing".to_string()
        }
    );
    assert!(page.list().records().is_empty());
}

#[tokio::test]
async fn marking_returned_drops_the_action_and_counts_returned() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_inventory(vec![item(2, "Projector", 2, 1)])
            .with_borrowings(vec![borrowing(7, 2, "borrowed", "2024-05-20")]),
    );
    let mut page = BorrowingPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await.borrowings.unwrap();

    let done = page.mark_returned(7).await.unwrap();
    assert_eq!(done.outcome.message.as_deref(), Some("Borrowing updated"));
    let body = page.body();
    let row = &body.rows()[0];
    assert!(!row.has_action(ActionKind::MarkReturned));
    assert!(row.has_action(ActionKind::Delete));
    assert_eq!(page.summary().get(Metric::Returned), 1);
    assert_eq!(page.summary().get(Metric::Active), 0);
    assert_eq!(page.inventory().records()[0].stock, 3);

    page.delete(7).await.unwrap();
    assert!(page.list().records().is_empty());
    assert_eq!(page.body().empty_reason(), Some(EmptyReason::NoRecords));
}

#[tokio::test]
async fn overdue_is_derived_from_the_clock_but_returned_stays_returned() {
    let transport = Arc::new(MemoryTransport::new().with_borrowings(vec![
        borrowing(1, 2, "borrowed", "2024-05-10"),
        borrowing(2, 2, "returned", "2024-05-01"),
        borrowing(3, 2, "borrowed", "not a date"),
    ]));
    let clock = clock_at(2024, 5, 10);
    let mut page = BorrowingPage::new(client(&transport), Arc::new(clock.clone()));
    page.load().await.borrowings.unwrap();

    assert_eq!(page.summary().get(Metric::Overdue), 0);
    assert_eq!(page.summary().get(Metric::Active), 2);

    clock.advance(chrono::Duration::days(1));
    assert_eq!(clock.today().to_string(), "2024-05-11");
    let summary = page.summary();
    assert_eq!(summary.get(Metric::Overdue), 1);
    assert_eq!(summary.get(Metric::Returned), 1);
    assert_eq!(summary.get(Metric::Active), 1);

    let html = body_html(&page.body());
    assert!(html.contains("status-badge overdue\">Overdue"));
}

#[tokio::test]
async fn area_writes_follow_server_message_rules() {
    let transport = Arc::new(MemoryTransport::new().with_areas(vec![Area {
        id: 1,
        name: "Chem Lab".to_string(),
        building: "Science Hall".to_string(),
        status: None,
    }]));
    let mut page = AreasPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.load().await.unwrap();

    page.open_create();
    page.form_mut().name = "chem lab".to_string();
    page.form_mut().building = "Science Hall".to_string();
    let err = page.add().await.unwrap_err();
    assert_eq!(err.to_string(), "Error: Area already exists");

    page.form_mut().name = "Storage Room".to_string();
    let done = page.add().await.unwrap();
    assert_eq!(done.outcome.message.as_deref(), Some("Area added"));
    assert_eq!(page.summary().get(Metric::Areas), 2);

    let err = page.delete(99).await.unwrap_err();
    assert_eq!(err.to_string(), "Error: Area not found");

    transport.set_offline(true);
    let err = page.delete(1).await.unwrap_err();
    assert_eq!(err.to_string(), "An error occurred while deleting the area");
    transport.set_offline(false);

    page.delete(1).await.unwrap();
    let names: Vec<&str> = page.list().records().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Storage Room"]);
}

#[tokio::test]
async fn empty_area_fields_are_rejected_before_sending() {
    let transport = Arc::new(MemoryTransport::new());
    let mut page = AreasPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    page.open_create();
    page.form_mut().name = "  ".to_string();
    page.form_mut().building = "Annex".to_string();
    let err = page.add().await.unwrap_err();
    assert_eq!(err.to_string(), forms::FILL_ALL);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn analytics_refresh_counts_stock_and_usage() {
    let mut b1 = borrowing(1, 2, "returned", "2024-05-05");
    b1.quantity = 3;
    b1.date_borrowed = "2024-05-02".to_string();
    let mut b2 = borrowing(2, 4, "borrowed", "2024-05-20");
    b2.item_name = "Speaker".to_string();
    b2.quantity = 2;
    b2.date_borrowed = "2024-03-01".to_string();

    let transport = Arc::new(
        MemoryTransport::new()
            .with_inventory(vec![
                item(2, "Projector", 0, 1),
                item(4, "Speaker", 8, 2),
                item(5, "Cable", 2, 2),
            ])
            .with_borrowings(vec![b1, b2]),
    );
    let mut page = AnalyticsPage::new(client(&transport), Arc::new(clock_at(2024, 5, 10)));
    let loaded = page.refresh().await;
    assert!(loaded.borrowings.is_ok() && loaded.inventory.is_ok());

    let stats = page.stats();
    assert_eq!(stats.range, TimeRange::Month);
    assert_eq!(stats.most_used_label(), "Projector");
    assert_eq!((stats.out_of_stock, stats.low_stock, stats.high_stock), (1, 1, 1));

    page.set_range(TimeRange::Week);
    assert!(page.stats().most_used.is_none());
}

#[test]
fn summary_slots_are_keyed_per_page() {
    let slots = Borrowing::slots();
    assert_eq!(slots.target(Metric::Overdue), Some("overdueBorrowings"));
    assert_eq!(slots.target(Metric::LowStock), None);
    let slots = InventoryItem::slots();
    assert_eq!(slots.target(Metric::OutOfStock), Some("outOfStockItems"));
}
