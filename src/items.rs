//! In-memory items collection, the JSON API behind `items_server`.
//!
//! State lives behind a mutex and resets on restart; there is no persistence.

use std::sync::Mutex;

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<u64>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// Envelope for responses that are not an item.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

pub struct AppState {
    pub items: Mutex<Vec<Item>>,
}

impl AppState {
    /// The two sample items the service starts with.
    pub fn seeded() -> AppState {
        AppState {
            items: Mutex::new(vec![
                Item {
                    id: Some(1),
                    name: "Item 1".to_string(),
                    description: Some("First item".to_string()),
                    price: 100.0,
                },
                Item {
                    id: Some(2),
                    name: "Item 2".to_string(),
                    description: Some("Second item".to_string()),
                    price: 200.0,
                },
            ]),
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(Message {
        message: "Item not found".to_string(),
        data: None,
    })
}

#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(Message {
        message: "Items service is running!".to_string(),
        data: None,
    })
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(Message {
        message: "Service is healthy".to_string(),
        data: Some(json!({"status": "ok"})),
    })
}

#[get("/items")]
pub async fn get_items(state: web::Data<AppState>) -> impl Responder {
    let items = state.items.lock().unwrap();
    HttpResponse::Ok().json(&*items)
}

#[get("/items/{id}")]
pub async fn get_item(state: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    let items = state.items.lock().unwrap();
    match items.iter().find(|item| item.id == Some(id)) {
        Some(item) => HttpResponse::Ok().json(item),
        None => not_found(),
    }
}

#[post("/items")]
pub async fn create_item(state: web::Data<AppState>, payload: web::Json<Item>) -> impl Responder {
    let mut items = state.items.lock().unwrap();
    let next_id = items.iter().filter_map(|item| item.id).max().unwrap_or(0) + 1;
    let mut item = payload.into_inner();
    item.id = Some(next_id);
    info!("Creating item {} with id {}", item.name, next_id);
    items.push(item.clone());
    HttpResponse::Ok().json(item)
}

#[put("/items/{id}")]
pub async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<Item>,
) -> impl Responder {
    let id = path.into_inner();
    let mut items = state.items.lock().unwrap();
    match items.iter_mut().find(|item| item.id == Some(id)) {
        Some(existing) => {
            let mut item = payload.into_inner();
            item.id = Some(id);
            *existing = item.clone();
            info!("Updated item with id {}", id);
            HttpResponse::Ok().json(item)
        }
        None => not_found(),
    }
}

#[delete("/items/{id}")]
pub async fn delete_item(state: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    let mut items = state.items.lock().unwrap();
    match items.iter().position(|item| item.id == Some(id)) {
        Some(index) => {
            let deleted = items.remove(index);
            info!("Deleted item with id {}", id);
            HttpResponse::Ok().json(Message {
                message: "Item deleted successfully".to_string(),
                data: Some(serde_json::to_value(deleted).unwrap()),
            })
        }
        None => not_found(),
    }
}
