//! Wire and view types shared by the accessors.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination metadata for list envelopes. Wire names are camelCase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: 50,
            total_pages: 0,
        }
    }
}

impl PageMeta {
    /// Meta synthesized for a bare-array response: the whole result is one
    /// page.
    pub fn whole(len: usize) -> Self {
        Self {
            total: len as u64,
            page: 1,
            limit: len as u64,
            total_pages: 1,
        }
    }
}

/// The `{data, meta}` envelope every paginated read resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListPage {
    pub data: Vec<Value>,
    pub meta: PageMeta,
}

impl ListPage {
    /// The read-failure default: no rows, zeroed totals.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::default(),
        }
    }
}

/// Filter and pagination parameters, forwarded verbatim as query
/// parameters. Unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Result of a login attempt. Auth and transport failures are folded into
/// `Failure`; callers never see an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure { message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

/// Platform-wide dashboard counters, zeroed when the backend is
/// unreachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSummary {
    pub total_orders: u64,
    pub total_products: u64,
    pub total_customers: u64,
    pub total_revenue: f64,
    pub active_users: u64,
}

/// Cart-recovery counters from the automation service, zeroed when the
/// backend is unreachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationStats {
    pub total_carts: u64,
    pub abandoned_count: u64,
    pub recovery_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_meta_defaults_match_read_failure_shape() {
        let meta = PageMeta::default();
        assert_eq!(meta.total, 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 50);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn page_meta_uses_camel_case_wire_names() {
        let meta: PageMeta =
            serde_json::from_value(json!({ "total": 8, "page": 1, "limit": 4, "totalPages": 2 }))
                .unwrap();
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn list_filter_omits_unset_fields_and_renames_kind() {
        let filter = ListFilter {
            page: Some(2),
            kind: Some("Express".into()),
            ..Default::default()
        };
        let q = serde_json::to_value(&filter).unwrap();
        assert_eq!(q, json!({ "page": 2, "type": "Express" }));
    }

    #[test]
    fn stats_tolerate_partial_payloads() {
        let stats: StatsSummary =
            serde_json::from_value(json!({ "totalOrders": 12, "totalRevenue": 99.5 })).unwrap();
        assert_eq!(stats.total_orders, 12);
        assert_eq!(stats.total_revenue, 99.5);
        assert_eq!(stats.active_users, 0);

        let auto: AutomationStats = serde_json::from_value(json!({ "totalCarts": 3 })).unwrap();
        assert_eq!(auto.total_carts, 3);
        assert_eq!(auto.recovery_rate, 0.0);
    }
}
