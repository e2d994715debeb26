//! Query parameter types for the list endpoints.

use serde::Deserialize;

/// `GET /api/crackers?page=&limit=&sort=&onlyActive=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrackerListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    /// Only `true` filters; any other value lists everything.
    pub only_active: Option<String>,
}

impl CrackerListParams {
    pub fn only_active(&self) -> bool {
        self.only_active.as_deref() == Some("true")
    }
}

/// `GET /api/orders?page=&limit=&sort=`
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}
