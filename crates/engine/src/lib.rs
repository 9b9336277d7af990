//! Receipt analytics engine.
//!
//! Takes a snapshot of receipt records as fetched from the backend and
//! derives the dashboard figures: status counters, spend by category, the
//! top merchants and a daily spend series. See [`summarize`].
//!
//! The engine performs no I/O and keeps no state between calls, so it can be
//! called from any thread on independent snapshots.
//!
//! ```rust
//! use receipt_engine::{ReceiptRecord, summarize};
//!
//! let records: Vec<ReceiptRecord> = serde_json::from_str(r#"[
//!     {"id": "a", "status": "COMPLETED", "total_amount": "10.005",
//!      "category": "Groceries", "created_at": "2024-05-01T09:00:00"},
//!     {"id": "b", "status": "COMPLETED", "total_amount": "5.005",
//!      "category": "Groceries", "created_at": "2024-05-01T10:00:00"}
//! ]"#).unwrap();
//!
//! let summary = summarize(&records);
//! assert_eq!(summary.total_spent.to_string(), "15.01");
//! assert_eq!(summary.by_category[0].value.to_string(), "15.01");
//! ```

pub use analytics::{
    AnalyticsSummary, Counters, DailyAmount, MERCHANT_RANKING_LIMIT, NamedAmount, summarize,
};
pub use error::EngineError;
pub use money::{MONEY_SCALE, Money, round_money};
pub use receipt::{
    Alert, DEFAULT_CATEGORY, DEFAULT_MERCHANT, RawAmount, ReceiptRecord, ReceiptStatus,
};
pub use rust_decimal::{Decimal, RoundingStrategy};

mod analytics;
mod error;
mod money;
mod receipt;

type ResultEngine<T> = Result<T, EngineError>;
