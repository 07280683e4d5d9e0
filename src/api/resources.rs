//! One accessor per backend capability.
//!
//! Reads degrade to their documented defaults through `ApiClient::degrade`;
//! writes return the raw backend response and propagate errors so the
//! calling screen can show a failure dialog.
use reqwest::multipart;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;

use super::model::{AutomationStats, ListFilter, ListPage, StatsSummary};
use super::{ApiClient, ApiError};
use crate::normalize::{self, UpsertRoute};

/// Bare-array list bodies; anything else yields no rows.
fn as_rows(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

impl ApiClient {
    // === notifications ===

    pub async fn notification_history(&self) -> Vec<Value> {
        match self.get("notifications").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("notifications", err, Vec::new()),
        }
    }

    pub async fn save_notification(&self, notification: &Value) -> Result<Value, ApiError> {
        self.post("notifications", notification).await
    }

    // === orders ===

    pub async fn orders(&self, filter: &ListFilter) -> ListPage {
        match self.get_with("orders", filter).await {
            Ok(body) => {
                let mut page = normalize::normalize_list(body);
                for record in &mut page.data {
                    normalize::enrich_order(record);
                }
                page
            }
            Err(err) => self.degrade("orders", err, ListPage::empty()),
        }
    }

    pub async fn order(&self, id: i64) -> Option<Value> {
        match self.get(&format!("orders/{}", id)).await {
            Ok(body) => Some(body),
            Err(err) => self.degrade("order", err, None),
        }
    }

    pub async fn update_order_status(&self, id: i64, status: &str) -> Result<Value, ApiError> {
        self.patch(&format!("orders/{}/status", id), &json!({ "status": status }))
            .await
    }

    pub async fn bulk_update_order_status(
        &self,
        ids: &[i64],
        status: &str,
    ) -> Result<Value, ApiError> {
        self.post("orders/bulk-status", &json!({ "ids": ids, "status": status }))
            .await
    }

    // === customers (backed by /users) ===

    pub async fn customers(&self, filter: &ListFilter) -> ListPage {
        match self.get_with("users", filter).await {
            Ok(body) => normalize::normalize_list(body),
            Err(err) => self.degrade("customers", err, ListPage::empty()),
        }
    }

    /// Update goes to `PUT /users/:id`; new customers register instead.
    pub async fn save_customer(&self, customer: &Value) -> Result<Value, ApiError> {
        match normalize::upsert_route("users", customer, self.default_ceiling) {
            UpsertRoute::Update(path) => self.put(&path, customer).await,
            UpsertRoute::Create(_) => self.post("users/register", customer).await,
        }
    }

    pub async fn update_customer(&self, id: i64, data: &Value) -> Result<Value, ApiError> {
        self.put(&format!("users/{}", id), data).await
    }

    pub async fn delete_customer(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("users/{}", id)).await
    }

    // === settings ===

    pub async fn settings(&self) -> Value {
        match self.get("settings").await {
            Ok(Value::Null) => json!({}),
            Ok(body) => body,
            Err(err) => self.degrade("settings", err, json!({})),
        }
    }

    pub async fn save_settings(&self, settings: &Value) -> Result<Value, ApiError> {
        self.post("settings", settings).await
    }

    // === tickets ===

    pub async fn tickets(&self) -> Vec<Value> {
        match self.get("tickets").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("tickets", err, Vec::new()),
        }
    }

    pub async fn update_ticket(&self, id: i64, status: &str) -> Result<Value, ApiError> {
        self.patch(&format!("tickets/{}/status", id), &json!({ "status": status }))
            .await
    }

    pub async fn reply_to_ticket(&self, id: i64, message: &str) -> Result<Value, ApiError> {
        self.post(&format!("tickets/{}/reply", id), &json!({ "message": message }))
            .await
    }

    // === reviews ===

    pub async fn reviews(&self) -> Vec<Value> {
        match self.get("reviews").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("reviews", err, Vec::new()),
        }
    }

    pub async fn update_review(&self, id: i64, status: &str) -> Result<Value, ApiError> {
        self.patch(&format!("reviews/{}/status", id), &json!({ "status": status }))
            .await
    }

    pub async fn delete_review(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("reviews/{}", id)).await
    }

    // === categories ===
    // Both views come from the same fetch; the split lives in normalize so
    // the partitioning predicate stays symmetric.

    pub async fn categories(&self) -> Vec<Value> {
        match self.get("categories").await {
            Ok(body) => normalize::partition_categories(as_rows(body)).0,
            Err(err) => self.degrade("categories", err, Vec::new()),
        }
    }

    pub async fn sub_categories(&self) -> Vec<Value> {
        match self.get("categories").await {
            Ok(body) => normalize::partition_categories(as_rows(body)).1,
            Err(err) => self.degrade("sub_categories", err, Vec::new()),
        }
    }

    pub async fn save_category(&self, category: &Value) -> Result<Value, ApiError> {
        self.upsert("categories", category, self.default_ceiling)
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("categories/{}", id)).await
    }

    /// Sub-categories persist through the same collection, re-keyed for the
    /// backend (`parentId`).
    pub async fn save_sub_category(&self, sub: &Value) -> Result<Value, ApiError> {
        let mut payload = sub.clone();
        if let Some(map) = payload.as_object_mut() {
            if let Some(parent_id) = map.get("parent_id").cloned() {
                map.insert("parentId".into(), parent_id);
            }
        }
        self.upsert("categories", &payload, self.default_ceiling)
            .await
    }

    pub async fn delete_sub_category(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("categories/{}", id)).await
    }

    // === brands ===

    /// The brand list falls back to a seeded sample set so the catalog
    /// screens stay usable against an empty or unreachable backend.
    pub async fn brands(&self) -> Vec<Value> {
        match self.get("brands").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("brands", err, sample_brands()),
        }
    }

    pub async fn save_brand(&self, brand: &Value) -> Result<Value, ApiError> {
        self.upsert("brands", brand, self.default_ceiling).await
    }

    pub async fn delete_brand(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("brands/{}", id)).await
    }

    // === products ===

    pub async fn products(&self, filter: &ListFilter) -> ListPage {
        match self.get_with("products", filter).await {
            Ok(body) => {
                let mut page = normalize::normalize_list(body);
                for record in &mut page.data {
                    normalize::enrich_product(record);
                }
                page
            }
            Err(err) => self.degrade("products", err, ListPage::empty()),
        }
    }

    /// Mirrors the form fields back into backend names before saving:
    /// `quantity` becomes `stock`, `category_id` becomes `categoryId`.
    /// Products use the wider id ceiling.
    pub async fn save_product(&self, product: &Value) -> Result<Value, ApiError> {
        let mut payload = product.clone();
        if let Some(map) = payload.as_object_mut() {
            if let Some(stock) = map.get("quantity").and_then(normalize::coerce_int) {
                map.insert("stock".into(), json!(stock));
            }
            if let Some(category) = map.get("category_id").and_then(normalize::coerce_int) {
                map.insert("categoryId".into(), json!(category));
            }
        }
        self.upsert("products", &payload, self.product_ceiling)
            .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("products/{}", id)).await
    }

    pub async fn bulk_delete_products(&self, ids: &[i64]) -> Result<Value, ApiError> {
        self.post("products/bulk-delete", &json!({ "ids": ids })).await
    }

    pub async fn bulk_update_product_status(
        &self,
        ids: &[i64],
        is_active: bool,
    ) -> Result<Value, ApiError> {
        self.post("products/bulk-status", &json!({ "ids": ids, "isActive": is_active }))
            .await
    }

    // === offers & banners ===

    pub async fn offers(&self) -> Vec<Value> {
        match self.get("offers").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("offers", err, Vec::new()),
        }
    }

    pub async fn save_offer(&self, offer: &Value) -> Result<Value, ApiError> {
        self.post("offers", offer).await
    }

    pub async fn delete_offer(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("offers/{}", id)).await
    }

    pub async fn banners(&self) -> Vec<Value> {
        match self.get("banners").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("banners", err, Vec::new()),
        }
    }

    pub async fn save_banner(&self, banner: &Value) -> Result<Value, ApiError> {
        self.post("banners", banner).await
    }

    pub async fn delete_banner(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("banners/{}", id)).await
    }

    // === coupons ===

    pub async fn coupons(&self) -> Vec<Value> {
        match self.get("coupons").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("coupons", err, Vec::new()),
        }
    }

    pub async fn save_coupon(&self, coupon: &Value) -> Result<Value, ApiError> {
        self.post("coupons", coupon).await
    }

    pub async fn delete_coupon(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("coupons/{}", id)).await
    }

    // === profile ===

    pub async fn update_profile(&self, data: &Value) -> Result<Value, ApiError> {
        self.post("users/update-profile", data).await
    }

    pub async fn update_password(&self, data: &Value) -> Result<Value, ApiError> {
        self.post("users/update-password", data).await
    }

    pub async fn test_email(&self, data: &Value) -> Result<Value, ApiError> {
        self.post("users/test-email", data).await
    }

    // === riders ===

    pub async fn riders(&self) -> Vec<Value> {
        match self.get("riders").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("riders", err, Vec::new()),
        }
    }

    pub async fn save_rider(&self, rider: &Value) -> Result<Value, ApiError> {
        self.upsert("riders", rider, self.default_ceiling).await
    }

    pub async fn delete_rider(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("riders/{}", id)).await
    }

    // === zones ===

    pub async fn zones(&self) -> Vec<Value> {
        match self.get("zones").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("zones", err, Vec::new()),
        }
    }

    pub async fn save_zone(&self, zone: &Value) -> Result<Value, ApiError> {
        self.upsert("zones", zone, self.default_ceiling).await
    }

    pub async fn delete_zone(&self, id: i64) -> Result<Value, ApiError> {
        self.delete(&format!("zones/{}", id)).await
    }

    pub async fn toggle_surge(
        &self,
        id: i64,
        active: bool,
        multiplier: f64,
    ) -> Result<Value, ApiError> {
        self.post(
            &format!("zones/{}/surge", id),
            &json!({ "active": active, "multiplier": multiplier }),
        )
        .await
    }

    // === wallet ===

    pub async fn wallet_history(&self, user_id: i64) -> Vec<Value> {
        match self.get(&format!("wallet/history/{}", user_id)).await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("wallet", err, Vec::new()),
        }
    }

    pub async fn add_wallet_funds(
        &self,
        user_id: i64,
        amount: f64,
        reason: &str,
    ) -> Result<Value, ApiError> {
        self.post(
            "wallet/add",
            &json!({ "userId": user_id, "amount": amount, "reason": reason }),
        )
        .await
    }

    // === automation ===

    pub async fn abandoned_carts(&self) -> Vec<Value> {
        match self.get("automation/abandoned-carts").await {
            Ok(body) => as_rows(body),
            Err(err) => self.degrade("automation", err, Vec::new()),
        }
    }

    pub async fn trigger_recovery(&self, cart_id: i64) -> Result<Value, ApiError> {
        self.post("automation/trigger-recovery", &json!({ "cartId": cart_id }))
            .await
    }

    pub async fn automation_stats(&self) -> AutomationStats {
        match self.get("automation/stats").await {
            Ok(body) => serde_json::from_value(body).unwrap_or_default(),
            Err(err) => self.degrade("automation_stats", err, AutomationStats::default()),
        }
    }

    // === analytics ===

    pub async fn stats(&self) -> StatsSummary {
        match self.get("analytics/stats").await {
            Ok(body) => serde_json::from_value(body).unwrap_or_default(),
            Err(err) => self.degrade("analytics", err, StatsSummary::default()),
        }
    }

    // === upload ===

    /// Multipart upload under the `image` field. Resolves to the `url`
    /// property of the response; the server is the sole validator.
    pub async fn upload_image(&self, path: impl AsRef<Path>) -> Result<String, ApiError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let bytes = fs::read(path).await?;

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_content_type(path))?;
        let form = multipart::Form::new().part("image", part);

        let body = self.send_multipart("upload", form).await?;
        body.get("url")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(ApiError::Shape("upload response missing url"))
    }

    async fn upsert(
        &self,
        collection: &str,
        record: &Value,
        ceiling: i64,
    ) -> Result<Value, ApiError> {
        match normalize::upsert_route(collection, record, ceiling) {
            UpsertRoute::Update(path) => self.put(&path, record).await,
            UpsertRoute::Create(path) => self.post(&path, record).await,
        }
    }
}

fn sample_brands() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "Samsung" }),
        json!({ "id": 2, "name": "Apple" }),
        json!({ "id": 3, "name": "Nike" }),
        json!({ "id": 4, "name": "Nestle" }),
    ]
}

fn image_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
    {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
