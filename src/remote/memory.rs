//! In-process stand-in for the panel server.
//!
//! Serves the same JSON endpoints as the real API from a mutex-guarded
//! state, so page controllers can be driven without a network. Tests can
//! queue canned responses or flip the transport offline to exercise the
//! rejection and network-failure paths.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::{
    ApiRequest, ApiResponse, RemoteError, Transport, AREAS_PATH, BORROWINGS_PATH,
    INVENTORY_PATH, LOGOUT_PATH,
};
use crate::model::{Area, Borrowing, InventoryItem};

#[derive(Debug, Default)]
struct State {
    inventory: Vec<InventoryItem>,
    borrowings: Vec<Borrowing>,
    areas: Vec<Area>,
    next_id: u64,
    borrow_date: String,
    queued: VecDeque<ApiResponse>,
    offline: bool,
    log: Vec<ApiRequest>,
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                borrow_date: "2024-01-01".to_string(),
                ..State::default()
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn with_inventory(self, items: Vec<InventoryItem>) -> Self {
        self.with_state(|s| {
            s.next_id = s.next_id.max(items.iter().map(|i| i.id + 1).max().unwrap_or(1));
            s.inventory = items;
        });
        self
    }

    pub fn with_borrowings(self, borrowings: Vec<Borrowing>) -> Self {
        self.with_state(|s| {
            s.next_id = s
                .next_id
                .max(borrowings.iter().map(|b| b.id + 1).max().unwrap_or(1));
            s.borrowings = borrowings;
        });
        self
    }

    pub fn with_areas(self, areas: Vec<Area>) -> Self {
        self.with_state(|s| {
            s.next_id = s.next_id.max(areas.iter().map(|a| a.id + 1).max().unwrap_or(1));
            s.areas = areas;
        });
        self
    }

    pub fn with_borrow_date(self, date: &str) -> Self {
        self.with_state(|s| s.borrow_date = date.to_string());
        self
    }

    pub fn respond_next(&self, response: ApiResponse) {
        self.with_state(|s| s.queued.push_back(response));
    }

    pub fn set_offline(&self, offline: bool) {
        self.with_state(|s| s.offline = offline);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.with_state(|s| s.log.clone())
    }

    pub fn inventory(&self) -> Vec<InventoryItem> {
        self.with_state(|s| s.inventory.clone())
    }

    pub fn borrowings(&self) -> Vec<Borrowing> {
        self.with_state(|s| s.borrowings.clone())
    }

    pub fn areas(&self) -> Vec<Area> {
        self.with_state(|s| s.areas.clone())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RemoteError> {
        self.with_state(|s| {
            s.log.push(request.clone());
            if s.offline {
                return Err(RemoteError::Network {
                    path: request.path.clone(),
                    message: "connection refused".to_string(),
                });
            }
            if let Some(queued) = s.queued.pop_front() {
                return Ok(queued);
            }
            Ok(route(s, &request))
        })
    }
}

fn not_found(what: &str) -> ApiResponse {
    ApiResponse::json(404, json!({ "error": format!("{what} not found") }))
}

fn bad_request(message: &str) -> ApiResponse {
    ApiResponse::json(400, json!({ "error": message }))
}

fn split_id<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    path.strip_prefix(base)?.strip_prefix('/')
}

fn route(s: &mut State, request: &ApiRequest) -> ApiResponse {
    use reqwest::Method;

    let path = request.path.as_str();
    let method = &request.method;

    if path == INVENTORY_PATH && method == Method::GET {
        return ApiResponse::json(200, json!({ "inventory": s.inventory }));
    }
    if path == BORROWINGS_PATH && method == Method::GET {
        return ApiResponse::json(200, json!({ "borrowings": s.borrowings }));
    }
    if path == AREAS_PATH && method == Method::GET {
        return ApiResponse::json(200, json!({ "areas": s.areas }));
    }
    if path == LOGOUT_PATH {
        return ApiResponse::json(200, json!({ "message": "Logged out" }));
    }
    if path == BORROWINGS_PATH && method == Method::POST {
        return create_borrowing(s, request.body.as_ref());
    }
    if path == AREAS_PATH && method == Method::POST {
        return create_area(s, request.body.as_ref());
    }

    if let Some(raw_id) = split_id(path, BORROWINGS_PATH) {
        let Ok(id) = raw_id.parse::<u64>() else {
            return not_found("Borrowing");
        };
        let Some(idx) = s.borrowings.iter().position(|b| b.id == id) else {
            return not_found("Borrowing");
        };
        if method == Method::PUT {
            let status = request
                .body
                .as_ref()
                .and_then(|b| b.get("status"))
                .and_then(|v| v.as_str());
            let Some(status) = status else {
                return bad_request("Missing status");
            };
            let borrowing = &mut s.borrowings[idx];
            if status == "returned" && borrowing.status != "returned" {
                let (item_id, quantity) = (borrowing.item_id, borrowing.quantity);
                if let Some(item) = s.inventory.iter_mut().find(|i| i.id == item_id) {
                    item.stock += quantity;
                }
            }
            s.borrowings[idx].status = status.to_string();
            return ApiResponse::json(200, json!({ "message": "Borrowing updated" }));
        }
        if method == Method::DELETE {
            s.borrowings.remove(idx);
            return ApiResponse::json(200, json!({ "message": "Borrowing deleted" }));
        }
    }

    if let Some(raw_id) = split_id(path, AREAS_PATH) {
        if method == Method::DELETE {
            let id = raw_id.parse::<u64>().ok();
            let Some(idx) = id.and_then(|id| s.areas.iter().position(|a| a.id == id)) else {
                return not_found("Area");
            };
            s.areas.remove(idx);
            return ApiResponse::json(200, json!({ "message": "Area deleted" }));
        }
    }

    ApiResponse::json(405, json!({ "error": "Method not allowed" }))
}

fn create_borrowing(s: &mut State, body: Option<&serde_json::Value>) -> ApiResponse {
    let Some(body) = body else {
        return bad_request("Missing body");
    };
    let borrower_name = body.get("borrower_name").and_then(|v| v.as_str());
    let item_id = body.get("item_id").and_then(|v| v.as_u64());
    let quantity = body.get("quantity").and_then(|v| v.as_i64());
    let due_date = body.get("due_date").and_then(|v| v.as_str());
    let (Some(borrower_name), Some(item_id), Some(quantity), Some(due_date)) =
        (borrower_name, item_id, quantity, due_date)
    else {
        return bad_request("Missing required fields");
    };
    let Some(item) = s.inventory.iter_mut().find(|i| i.id == item_id) else {
        return bad_request("Item not found");
    };
    if quantity <= 0 || quantity > item.stock {
        return bad_request("Insufficient stock");
    }
    item.stock -= quantity;
    let (item_name, unit) = (item.name.clone(), item.unit.clone());

    let id = s.next_id;
    s.next_id += 1;
    s.borrowings.push(Borrowing {
        id,
        borrower_name: borrower_name.to_string(),
        item_id,
        item_name,
        quantity,
        unit,
        date_borrowed: s.borrow_date.clone(),
        due_date: due_date.to_string(),
        status: "borrowed".to_string(),
        purpose: body
            .get("purpose")
            .and_then(|v| v.as_str())
            .filter(|p| !p.is_empty())
            .map(|p| p.to_string()),
    });
    ApiResponse::json(201, json!({ "message": "Borrowing created", "id": id }))
}

fn create_area(s: &mut State, body: Option<&serde_json::Value>) -> ApiResponse {
    let name = body.and_then(|b| b.get("name")).and_then(|v| v.as_str());
    let building = body.and_then(|b| b.get("building")).and_then(|v| v.as_str());
    let (Some(name), Some(building)) = (name, building) else {
        return bad_request("Name and building are required");
    };
    if s
        .areas
        .iter()
        .any(|a| a.name.eq_ignore_ascii_case(name) && a.building.eq_ignore_ascii_case(building))
    {
        return bad_request("Area already exists");
    }
    let id = s.next_id;
    s.next_id += 1;
    s.areas.push(Area {
        id,
        name: name.to_string(),
        building: building.to_string(),
        status: None,
    });
    ApiResponse::json(201, json!({ "message": "Area added", "id": id }))
}
