//! Receipt records as the backend returns them.
//!
//! Records are read-only input for the engine. Every accessor here is total:
//! missing or malformed fields come back as an [`EngineError`] or a default
//! group key, never as a panic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// Group key for records without a category.
pub const DEFAULT_CATEGORY: &str = "Other";
/// Group key for records without a merchant name.
pub const DEFAULT_MERCHANT: &str = "Unknown";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Processing status of a receipt.
///
/// The worker moves a receipt from `PROCESSING` to `COMPLETED`, or to
/// `FAILED` when extraction crashes. Any value the engine does not know
/// deserializes as [`ReceiptStatus::Unknown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Anomaly flagged on a receipt by the extraction pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Wire form of a receipt total.
///
/// The backend stores totals as strings, older payloads carry plain JSON
/// numbers. Any other JSON value is kept as [`RawAmount::Other`]. Parsing
/// is lazy, so a bad value only affects the record it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl RawAmount {
    /// Parses the total into an exact [`Money`] value.
    pub fn parse(&self) -> ResultEngine<Money> {
        match self {
            Self::Number(number) => number.to_string().parse(),
            Self::Text(text) => text.parse(),
            Self::Other(value) => Err(EngineError::InvalidAmount(format!(
                "{value} is not a number or numeric string"
            ))),
        }
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single uploaded receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    #[serde(alias = "receipt_id")]
    pub id: String,
    #[serde(default)]
    pub status: ReceiptStatus,
    #[serde(default, alias = "totalAmount")]
    pub total_amount: Option<RawAmount>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "merchantName")]
    pub merchant_name: Option<String>,
    #[serde(default, alias = "purchaseDate")]
    pub purchase_date: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alerts: Vec<Alert>,
}

impl ReceiptRecord {
    pub fn is_completed(&self) -> bool {
        self.status == ReceiptStatus::Completed
    }

    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// The extracted total, if there is one and it is a finite number.
    pub fn amount(&self) -> ResultEngine<Money> {
        self.total_amount
            .as_ref()
            .ok_or(EngineError::MissingAmount)?
            .parse()
    }

    /// Category used for grouping, [`DEFAULT_CATEGORY`] when blank.
    pub fn category_key(&self) -> &str {
        non_blank(self.category.as_deref()).unwrap_or(DEFAULT_CATEGORY)
    }

    /// Merchant used for grouping, [`DEFAULT_MERCHANT`] when blank.
    pub fn merchant_key(&self) -> &str {
        non_blank(self.merchant_name.as_deref()).unwrap_or(DEFAULT_MERCHANT)
    }

    /// Calendar date the spend is attributed to.
    ///
    /// The purchase date printed on the receipt wins. Without one, the UTC
    /// date of the upload timestamp is used.
    pub fn effective_date(&self) -> ResultEngine<String> {
        if let Some(purchase) = non_blank(self.purchase_date.as_deref()) {
            let purchase = purchase.trim();
            return Ok(match NaiveDate::parse_from_str(purchase, DATE_FORMAT) {
                Ok(date) => date.format(DATE_FORMAT).to_string(),
                Err(_) => purchase.to_string(),
            });
        }
        utc_date(&self.created_at).map(|date| date.format(DATE_FORMAT).to_string())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// UTC calendar date of an ingestion timestamp.
///
/// Offset-less timestamps are taken as UTC, which is how the backend writes
/// them.
fn utc_date(raw: &str) -> ResultEngine<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts.date());
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| EngineError::InvalidTimestamp(raw.to_string()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: serde_json::Value) -> ReceiptRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn deserializes_backend_payload() {
        let r = record(serde_json::json!({
            "receipt_id": "r-1",
            "user_id": "7",
            "s3_key": "uploads/r-1.jpg",
            "status": "COMPLETED",
            "total_amount": "42.10",
            "category": "Groceries",
            "merchant_name": "Corner Shop",
            "purchase_date": "2024-03-02",
            "created_at": "2024-03-02T18:22:01.123456",
            "alerts": [{"type": "HIGH_TOTAL", "message": "too much"}],
            "confidence": 0.93
        }));
        assert_eq!(r.id, "r-1");
        assert!(r.is_completed());
        assert!(r.has_alerts());
        assert_eq!(r.alerts[0].kind, "HIGH_TOTAL");
        assert_eq!(r.amount().unwrap().to_string(), "42.10");
    }

    #[test]
    fn accepts_camel_case_fields_and_numeric_amounts() {
        let r = record(serde_json::json!({
            "id": "r-2",
            "status": "PROCESSING",
            "totalAmount": 10.005,
            "merchantName": "Cafe",
            "purchaseDate": "2024-01-05",
            "createdAt": "2024-01-06T00:00:00Z"
        }));
        assert_eq!(r.status, ReceiptStatus::Processing);
        assert_eq!(r.amount().unwrap().value(), rust_decimal::Decimal::new(10005, 3));
        assert_eq!(r.merchant_key(), "Cafe");
        assert_eq!(r.effective_date().unwrap(), "2024-01-05");
    }

    #[test]
    fn unknown_status_and_null_alerts_are_tolerated() {
        let r = record(serde_json::json!({
            "id": "r-3",
            "status": "ARCHIVED",
            "created_at": "2024-01-01T00:00:00",
            "alerts": null
        }));
        assert_eq!(r.status, ReceiptStatus::Unknown);
        assert!(!r.has_alerts());
        assert_eq!(r.amount(), Err(EngineError::MissingAmount));
    }

    #[test]
    fn failed_status_is_recognized() {
        let r = record(serde_json::json!({
            "id": "r-4",
            "status": "FAILED",
            "created_at": "2024-01-01T00:00:00"
        }));
        assert_eq!(r.status, ReceiptStatus::Failed);
    }

    #[test]
    fn blank_group_keys_fall_back_to_defaults() {
        let r = record(serde_json::json!({
            "id": "r-5",
            "category": "  ",
            "merchant_name": "",
            "created_at": "2024-01-01T00:00:00"
        }));
        assert_eq!(r.category_key(), DEFAULT_CATEGORY);
        assert_eq!(r.merchant_key(), DEFAULT_MERCHANT);
    }

    #[test]
    fn malformed_amount_is_reported() {
        let r = record(serde_json::json!({
            "id": "r-6",
            "total_amount": "N/A",
            "created_at": "2024-01-01T00:00:00"
        }));
        assert!(matches!(r.amount(), Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn non_numeric_json_amount_stays_on_its_record() {
        for total in [serde_json::json!(true), serde_json::json!({"value": 1}), serde_json::json!([1])] {
            let r = record(serde_json::json!({
                "id": "r-9",
                "total_amount": total,
                "created_at": "2024-01-01T00:00:00"
            }));
            assert!(matches!(r.total_amount, Some(RawAmount::Other(_))));
            assert!(matches!(r.amount(), Err(EngineError::InvalidAmount(_))));
        }
    }

    #[test]
    fn purchase_date_is_canonicalized_when_it_parses() {
        let mut r = record(serde_json::json!({
            "id": "r-10",
            "purchase_date": " 2024-1-5 ",
            "created_at": "2024-02-10T12:00:00Z"
        }));
        assert_eq!(r.effective_date().unwrap(), "2024-01-05");

        r.purchase_date = Some("05/01/2024".to_string());
        assert_eq!(r.effective_date().unwrap(), "05/01/2024");
    }

    #[test]
    fn created_at_is_read_in_utc() {
        let mut r = record(serde_json::json!({
            "id": "r-7",
            "created_at": "2024-03-01T23:30:00-05:00"
        }));
        assert_eq!(r.effective_date().unwrap(), "2024-03-02");

        r.created_at = "2024-03-01T23:30:00".to_string();
        assert_eq!(r.effective_date().unwrap(), "2024-03-01");

        r.created_at = "2024-03-01 08:00:00.5".to_string();
        assert_eq!(r.effective_date().unwrap(), "2024-03-01");

        r.created_at = "2024-03-01".to_string();
        assert_eq!(r.effective_date().unwrap(), "2024-03-01");

        r.created_at = "yesterday".to_string();
        assert!(matches!(r.effective_date(), Err(EngineError::InvalidTimestamp(_))));
    }

    #[test]
    fn blank_purchase_date_uses_created_at() {
        let r = record(serde_json::json!({
            "id": "r-8",
            "purchase_date": "",
            "created_at": "2024-02-10T12:00:00Z"
        }));
        assert_eq!(r.effective_date().unwrap(), "2024-02-10");
    }
}
