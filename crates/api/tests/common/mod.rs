#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use crackers_api::app::build_app;
use crackers_api::config::ServerConfig;
use crackers_api::state::AppState;
use crackers_core::assets::{AssetError, AssetStore, DestroyOutcome, UploadedAsset};
use crackers_core::catalog::{CrackerSortField, ImageUpload};
use crackers_core::order::OrderSortField;
use crackers_core::pagination::SortDirection;
use crackers_core::types::DbId;
use crackers_db::models::cracker::{CreateCracker, Cracker, CrackerListQuery, UpdateCracker};
use crackers_db::models::order::{NewOrder, Order, OrderListQuery, OrderStatus};
use crackers_db::store::{RecordStore, StoreError};
use http_body_util::BodyExt;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// In-memory record store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    next_id: DbId,
    crackers: BTreeMap<DbId, Cracker>,
    orders: BTreeMap<DbId, Order>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// [`RecordStore`] over in-process maps, with switchable write failures.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<Tables>,
    fail_cracker_writes: AtomicBool,
    fail_ping: AtomicBool,
    cracker_write_delay: Mutex<Option<Duration>>,
}

fn injected() -> StoreError {
    StoreError::Database(sqlx::Error::Protocol("injected write failure".into()))
}

impl MemoryRecordStore {
    /// Make cracker inserts and updates fail until switched off.
    pub fn fail_cracker_writes(&self, fail: bool) {
        self.fail_cracker_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// Stall cracker inserts and updates before they touch the tables.
    pub fn delay_cracker_writes(&self, delay: Duration) {
        *self.cracker_write_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_ping(&self, fail: bool) {
        self.fail_ping.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn cracker_count(&self) -> usize {
        self.tables.lock().unwrap().crackers.len()
    }

    pub fn cracker(&self, id: DbId) -> Option<Cracker> {
        self.tables.lock().unwrap().crackers.get(&id).cloned()
    }

    pub fn order(&self, id: DbId) -> Option<Order> {
        self.tables.lock().unwrap().orders.get(&id).cloned()
    }

    fn writes_fail(&self) -> bool {
        self.fail_cracker_writes.load(AtomicOrdering::SeqCst)
    }

    async fn stall_write(&self) {
        let delay = *self.cracker_write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn compare_crackers(a: &Cracker, b: &Cracker, field: CrackerSortField) -> Ordering {
    match field {
        CrackerSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        CrackerSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        CrackerSortField::EnglishName => a.english_name.cmp(&b.english_name),
        CrackerSortField::TamilName => a.tamil_name.cmp(&b.tamil_name),
        CrackerSortField::OriginalRate => a.original_rate.total_cmp(&b.original_rate),
        CrackerSortField::DiscountRate => a.discount_rate.total_cmp(&b.discount_rate),
        CrackerSortField::Category => a.category.cmp(&b.category),
    }
}

fn compare_orders(a: &Order, b: &Order, field: OrderSortField) -> Ordering {
    match field {
        OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        OrderSortField::OrderNumber => a.order_number.cmp(&b.order_number),
        OrderSortField::OrderDate => a.order_date.cmp(&b.order_date),
        OrderSortField::CustomerName => a.customer_name.cmp(&b.customer_name),
        OrderSortField::TotalRate => a.total_rate.total_cmp(&b.total_rate),
        OrderSortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn window<T>(rows: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_cracker(&self, input: &CreateCracker) -> Result<Cracker, StoreError> {
        self.stall_write().await;
        if self.writes_fail() {
            return Err(injected());
        }
        let mut tables = self.tables.lock().unwrap();
        let now = chrono::Utc::now();
        let cracker = Cracker {
            id: tables.next_id(),
            english_name: input.english_name.clone(),
            tamil_name: input.tamil_name.clone(),
            original_rate: input.original_rate,
            discount_rate: input.discount_rate,
            category: input.category.clone(),
            is_active: input.is_active,
            image_url: input.image.as_ref().map(|a| a.url.clone()),
            image_public_id: input.image.as_ref().map(|a| a.asset_id.clone()),
            created_at: now,
            updated_at: now,
        };
        tables.crackers.insert(cracker.id, cracker.clone());
        Ok(cracker)
    }

    async fn find_cracker(&self, id: DbId) -> Result<Option<Cracker>, StoreError> {
        Ok(self.cracker(id))
    }

    async fn list_crackers(&self, query: &CrackerListQuery) -> Result<Vec<Cracker>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Cracker> = tables
            .crackers
            .values()
            .filter(|c| !query.only_active || c.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            directed(
                compare_crackers(a, b, query.sort.field).then(a.id.cmp(&b.id)),
                query.sort.direction,
            )
        });
        Ok(window(rows, query.page.offset(), query.page.limit))
    }

    async fn count_crackers(&self, only_active: bool) -> Result<i64, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .crackers
            .values()
            .filter(|c| !only_active || c.is_active)
            .count() as i64)
    }

    async fn update_cracker(
        &self,
        id: DbId,
        changes: &UpdateCracker,
    ) -> Result<Option<Cracker>, StoreError> {
        self.stall_write().await;
        if self.writes_fail() {
            return Err(injected());
        }
        let mut tables = self.tables.lock().unwrap();
        let Some(cracker) = tables.crackers.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.english_name {
            cracker.english_name = v.clone();
        }
        if let Some(v) = &changes.tamil_name {
            cracker.tamil_name = v.clone();
        }
        if let Some(v) = changes.original_rate {
            cracker.original_rate = v;
        }
        if let Some(v) = changes.discount_rate {
            cracker.discount_rate = v;
        }
        if let Some(v) = &changes.category {
            cracker.category = v.clone();
        }
        if let Some(v) = changes.is_active {
            cracker.is_active = v;
        }
        if let Some(asset) = &changes.image {
            cracker.image_url = Some(asset.url.clone());
            cracker.image_public_id = Some(asset.asset_id.clone());
        }
        cracker.updated_at = chrono::Utc::now();
        Ok(Some(cracker.clone()))
    }

    async fn set_cracker_active(
        &self,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Cracker>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.crackers.get_mut(&id).map(|c| {
            c.is_active = is_active;
            c.clone()
        }))
    }

    async fn delete_cracker(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().unwrap().crackers.remove(&id).is_some())
    }

    async fn insert_order(&self, input: &NewOrder) -> Result<Order, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .orders
            .values()
            .any(|o| o.order_number == input.order_number)
        {
            return Err(StoreError::Duplicate {
                constraint: "uq_orders_order_number".into(),
            });
        }
        let now = chrono::Utc::now();
        let order = Order {
            id: tables.next_id(),
            order_number: input.order_number.clone(),
            order_date: input.order_date.clone(),
            customer_name: input.customer_name.clone(),
            customer_number: input.customer_number.clone(),
            customer_address: input.customer_address.clone(),
            customer_state: input.customer_state.clone(),
            total_rate: input.total_rate,
            status: input.status,
            items: sqlx::types::Json(input.items.clone()),
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: DbId) -> Result<Option<Order>, StoreError> {
        Ok(self.order(id))
    }

    async fn list_orders(&self, query: &OrderListQuery) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Order> = tables.orders.values().cloned().collect();
        rows.sort_by(|a, b| {
            directed(
                compare_orders(a, b, query.sort.field).then(a.id.cmp(&b.id)),
                query.sort.direction,
            )
        });
        Ok(window(rows, query.page.offset(), query.page.limit))
    }

    async fn count_orders(&self) -> Result<i64, StoreError> {
        Ok(self.tables.lock().unwrap().orders.len() as i64)
    }

    async fn update_order_status(
        &self,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.orders.get_mut(&id).map(|o| {
            o.status = status;
            o.clone()
        }))
    }

    async fn delete_order(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().unwrap().orders.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_ping.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recording asset store
// ---------------------------------------------------------------------------

/// [`AssetStore`] that records every call and can fail or stall on demand.
#[derive(Default)]
pub struct FakeAssetStore {
    counter: AtomicU64,
    live: Mutex<HashSet<String>>,
    uploads: Mutex<Vec<UploadedAsset>>,
    destroys: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
    fail_destroys: AtomicBool,
    upload_delay: Mutex<Option<Duration>>,
    pinned_asset_id: Mutex<Option<String>>,
}

impl FakeAssetStore {
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn fail_destroys(&self, fail: bool) {
        self.fail_destroys.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn delay_uploads(&self, delay: Duration) {
        *self.upload_delay.lock().unwrap() = Some(delay);
    }

    /// Return `asset_id` for every later upload instead of a fresh one.
    pub fn pin_asset_id(&self, asset_id: &str) {
        *self.pinned_asset_id.lock().unwrap() = Some(asset_id.to_string());
    }

    /// Every successful upload, in order.
    pub fn uploads(&self) -> Vec<UploadedAsset> {
        self.uploads.lock().unwrap().clone()
    }

    /// Every destroy call, in order, including failed ones.
    pub fn destroys(&self) -> Vec<String> {
        self.destroys.lock().unwrap().clone()
    }

    /// Assets currently held by the store.
    pub fn live(&self) -> HashSet<String> {
        self.live.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for FakeAssetStore {
    async fn upload(
        &self,
        image: &ImageUpload,
        namespace: &str,
    ) -> Result<UploadedAsset, AssetError> {
        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_uploads.load(AtomicOrdering::SeqCst) {
            return Err(AssetError::Rejected {
                status: 500,
                body: "injected upload failure".into(),
            });
        }

        let n = self.counter.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let stem = image.file_name.as_deref().unwrap_or("upload");
        let asset_id = self
            .pinned_asset_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("{namespace}/{n}"));
        let asset = UploadedAsset {
            url: format!("https://cdn.test/{namespace}/{n}-{stem}"),
            asset_id,
        };
        self.live.lock().unwrap().insert(asset.asset_id.clone());
        self.uploads.lock().unwrap().push(asset.clone());
        Ok(asset)
    }

    async fn destroy(&self, asset_id: &str) -> DestroyOutcome {
        self.destroys.lock().unwrap().push(asset_id.to_string());
        if self.fail_destroys.load(AtomicOrdering::SeqCst) {
            return DestroyOutcome::Failed(AssetError::Transport("injected destroy failure".into()));
        }
        if self.live.lock().unwrap().remove(asset_id) {
            DestroyOutcome::Deleted
        } else {
            DestroyOutcome::NoOp
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        asset_folder: "crackers-test".to_string(),
        upload_timeout_secs: 60,
    }
}

/// The router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub records: Arc<MemoryRecordStore>,
    pub assets: Arc<FakeAssetStore>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application over fresh fakes, using the same middleware
/// stack as production.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let records = Arc::new(MemoryRecordStore::default());
    let assets = Arc::new(FakeAssetStore::default());
    let state = AppState::new(records.clone(), assets.clone(), config);
    TestApp {
        router: build_app(state.clone()),
        state,
        records,
        assets,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

/// An image part for [`multipart`]: file name, content type, bytes.
pub struct ImagePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

pub fn png(len: usize) -> ImagePart<'static> {
    ImagePart {
        file_name: "rocket.png",
        content_type: "image/png",
        bytes: vec![0x89; len],
    }
}

const BOUNDARY: &str = "crackers-test-boundary";

/// Send a `multipart/form-data` request with text fields and an optional image.
pub async fn multipart(
    app: Router,
    method: Method,
    uri: &str,
    fields: &[(&str, &str)],
    image: Option<ImagePart<'_>>,
) -> Response<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                image.file_name, image.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&image.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Text fields for a complete, valid catalog form.
pub fn cracker_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("englishName", name.to_string()),
        ("tamilName", format!("{name} தமிழ்")),
        ("originalRate", "200".to_string()),
        ("discountRate", "100".to_string()),
        ("category", "Rockets".to_string()),
    ]
}

/// Borrow owned field pairs as `(&str, &str)`.
pub fn as_pairs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

/// Collect the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
