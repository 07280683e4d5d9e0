//! Response-shape normalization and the view-model rules shared by every
//! screen: the list envelope, order/product enrichment, the category
//! split, and the persisted-id rule behind create-vs-update routing.
use serde_json::{json, Value};

use crate::api::model::{ListPage, PageMeta};

/// JSON truthiness as the backend's consumers expect it: null, false,
/// zero, and the empty string are all "absent".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Normalizes a list response body into the `{data, meta}` envelope.
///
/// Bare arrays become the `data` field with a synthesized whole-result
/// meta; an existing envelope passes through unchanged; anything else
/// yields no rows.
pub fn normalize_list(body: Value) -> ListPage {
    let data: Vec<Value> = match &body {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    let meta = body
        .get("meta")
        .cloned()
        .and_then(|m| serde_json::from_value(m).ok())
        .unwrap_or_else(|| PageMeta::whole(data.len()));
    ListPage { data, meta }
}

/// Derives the order view model in place: `customer` falls back through
/// `user.name` then `customer` then `"Guest"`, `date` prefers `createdAt`,
/// `type` defaults to `"Standard"`. All other fields are untouched.
pub fn enrich_order(record: &mut Value) {
    let Some(map) = record.as_object_mut() else {
        return;
    };

    let customer = map
        .get("user")
        .and_then(|u| u.get("name"))
        .filter(|v| truthy(*v))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| {
            map.get("customer")
                .filter(|v| truthy(*v))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "Guest".to_string());
    map.insert("customer".into(), Value::String(customer));

    if let Some(created) = map.get("createdAt").filter(|v| truthy(*v)).cloned() {
        map.insert("date".into(), created);
    }

    if !map.get("type").map(truthy).unwrap_or(false) {
        map.insert("type".into(), json!("Standard"));
    }
}

/// Derives the product view model in place: `category_id` prefers the
/// nested `category.id`, `status` reflects stock, `quantity` mirrors
/// `stock` when present.
pub fn enrich_product(record: &mut Value) {
    let Some(map) = record.as_object_mut() else {
        return;
    };

    if let Some(cat_id) = map
        .get("category")
        .and_then(|c| c.get("id"))
        .filter(|v| truthy(*v))
        .cloned()
    {
        map.insert("category_id".into(), cat_id);
    }

    let stock = map.get("stock").and_then(Value::as_f64).unwrap_or(0.0);
    let status = if stock > 0.0 { "Active" } else { "Out of Stock" };
    map.insert("status".into(), json!(status));

    if let Some(stock_value) = map.get("stock").cloned() {
        map.insert("quantity".into(), stock_value);
    }
}

/// The single predicate both category views share: a record with a truthy
/// `parent` is a sub-category.
fn has_parent(record: &Value) -> bool {
    record.get("parent").map(truthy).unwrap_or(false)
}

/// Splits one `/categories` fetch into (categories, sub-categories).
/// Sub-categories are re-keyed with `parent_id = parent.id`.
pub fn partition_categories(records: Vec<Value>) -> (Vec<Value>, Vec<Value>) {
    let (subs, cats): (Vec<Value>, Vec<Value>) = records.into_iter().partition(has_parent);
    let subs = subs
        .into_iter()
        .map(|mut record| {
            let parent_id = record.get("parent").and_then(|p| p.get("id")).cloned();
            if let (Some(map), Some(parent_id)) = (record.as_object_mut(), parent_id) {
                map.insert("parent_id".into(), parent_id);
            }
            record
        })
        .collect();
    (cats, subs)
}

/// The persisted-id rule: a numeric, non-zero id below the resource's
/// ceiling belongs to a record the backend already owns. Millisecond draft
/// ids sit far above every ceiling and therefore route to create.
pub fn is_persisted_id(id: &Value, ceiling: i64) -> bool {
    matches!(id.as_i64(), Some(n) if n != 0 && n < ceiling)
}

/// Where a save should go: `Update` paths carry the record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertRoute {
    Create(String),
    Update(String),
}

/// Routes a save through the shared persisted-id rule.
pub fn upsert_route(collection: &str, record: &Value, ceiling: i64) -> UpsertRoute {
    match record.get("id") {
        Some(id) if is_persisted_id(id, ceiling) => {
            let n = id.as_i64().unwrap_or_default();
            UpsertRoute::Update(format!("{}/{}", collection, n))
        }
        _ => UpsertRoute::Create(collection.to_string()),
    }
}

/// Lenient integer coercion for form-sourced fields (`"12"` or `12`).
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Pulls the human-readable `message` out of a backend error payload.
pub fn error_message(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_gets_whole_result_meta() {
        let body = json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]);
        let page = normalize_list(body);
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.page, 1);
        assert_eq!(page.meta.limit, 3);
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn envelope_passes_through_unchanged() {
        let body = json!({
            "data": [{ "id": 9 }],
            "meta": { "total": 40, "page": 2, "limit": 20, "totalPages": 2 }
        });
        let page = normalize_list(body);
        assert_eq!(page.data, vec![json!({ "id": 9 })]);
        assert_eq!(page.meta.total, 40);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.limit, 20);
        assert_eq!(page.meta.total_pages, 2);
    }

    #[test]
    fn object_without_data_array_yields_no_rows() {
        let page = normalize_list(json!({ "message": "nothing here" }));
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);

        let page = normalize_list(json!({ "data": "not an array" }));
        assert!(page.data.is_empty());
    }

    #[test]
    fn order_enrichment_prefers_user_name_and_created_at() {
        let mut order = json!({ "id": 1, "user": { "name": "A" }, "createdAt": "2024-01-01" });
        enrich_order(&mut order);
        assert_eq!(order["customer"], "A");
        assert_eq!(order["date"], "2024-01-01");
        assert_eq!(order["type"], "Standard");
        // untouched fields survive
        assert_eq!(order["user"]["name"], "A");
    }

    #[test]
    fn order_enrichment_falls_back_to_guest() {
        let mut order = json!({ "id": 2 });
        enrich_order(&mut order);
        assert_eq!(order["customer"], "Guest");
        assert!(order.get("date").is_none());
        assert_eq!(order["type"], "Standard");
    }

    #[test]
    fn order_enrichment_keeps_existing_fields() {
        let mut order = json!({ "customer": "B", "date": "2023-05-05", "type": "Express" });
        enrich_order(&mut order);
        assert_eq!(order["customer"], "B");
        assert_eq!(order["date"], "2023-05-05");
        assert_eq!(order["type"], "Express");
    }

    #[test]
    fn product_enrichment_derives_status_and_quantity() {
        let mut product = json!({ "id": 5, "stock": 3, "category": { "id": 12 } });
        enrich_product(&mut product);
        assert_eq!(product["category_id"], 12);
        assert_eq!(product["status"], "Active");
        assert_eq!(product["quantity"], 3);

        let mut empty = json!({ "id": 6, "stock": 0, "category_id": 4 });
        enrich_product(&mut empty);
        assert_eq!(empty["status"], "Out of Stock");
        assert_eq!(empty["category_id"], 4);
    }

    #[test]
    fn category_split_partitions_and_rekeys() {
        let records = vec![
            json!({ "id": 1, "name": "Grocery" }),
            json!({ "id": 2, "name": "Dairy", "parent": { "id": 1 } }),
            json!({ "id": 3, "name": "Pharmacy" }),
            json!({ "id": 4, "name": "Bakery", "parent": { "id": 1 } }),
            json!({ "id": 5, "name": "Electronics", "parent": null }),
        ];
        let (cats, subs) = partition_categories(records);

        assert_eq!(cats.len(), 3);
        assert!(cats.iter().all(|c| !c["id"].is_null()));

        assert_eq!(subs.len(), 2);
        for sub in &subs {
            assert_eq!(sub["parent_id"], 1);
            assert_eq!(sub["parent"]["id"], 1);
        }
    }

    #[test]
    fn persisted_id_rule() {
        let ceiling = 1_000_000_000;
        assert!(is_persisted_id(&json!(42), ceiling));
        assert!(!is_persisted_id(&json!(0), ceiling));
        assert!(!is_persisted_id(&json!(1_706_000_000_000_i64), ceiling));
        assert!(!is_persisted_id(&json!("42"), ceiling));
        assert!(!is_persisted_id(&Value::Null, ceiling));
    }

    #[test]
    fn upsert_routes_draft_to_create_and_real_id_to_update() {
        let ceiling = 1_000_000_000;
        let draft = json!({ "id": 1_706_000_000_000_i64, "name": "new" });
        assert_eq!(
            upsert_route("categories", &draft, ceiling),
            UpsertRoute::Create("categories".into())
        );

        let persisted = json!({ "id": 42, "name": "old" });
        assert_eq!(
            upsert_route("categories", &persisted, ceiling),
            UpsertRoute::Update("categories/42".into())
        );

        let no_id = json!({ "name": "fresh" });
        assert_eq!(
            upsert_route("brands", &no_id, ceiling),
            UpsertRoute::Create("brands".into())
        );
    }

    #[test]
    fn coerce_int_accepts_numbers_and_strings() {
        assert_eq!(coerce_int(&json!(7)), Some(7));
        assert_eq!(coerce_int(&json!("12")), Some(12));
        assert_eq!(coerce_int(&json!(" 3 ")), Some(3));
        assert_eq!(coerce_int(&json!(null)), None);
        assert_eq!(coerce_int(&json!("abc")), None);
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"bad password"}"#).as_deref(),
            Some("bad password")
        );
        assert_eq!(error_message(r#"{"error":"x"}"#), None);
        assert_eq!(error_message("not json"), None);
    }
}
