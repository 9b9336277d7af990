//! Receipt data sources.
//!
//! The analytics engine never fetches anything itself. This crate provides
//! the collaborators that hand it a full snapshot of receipts: the backend's
//! HTTP API ([`HttpSource`], which also carries the admin mutations) and a
//! JSON file on disk ([`FileSource`]).

use std::future::Future;

use receipt_engine::ReceiptRecord;
use serde::{Deserialize, Serialize};

pub use error::{ClientError, Result};
pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder};

mod error;
mod file;
mod http;

/// Anything that can produce the current receipt snapshot for a user.
pub trait ReceiptSource {
    /// Returns every receipt, not a delta since the last call.
    fn fetch_receipts(&self) -> impl Future<Output = Result<Vec<ReceiptRecord>>> + Send;
}

/// Response envelope of `GET /receipts`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReceiptList {
    #[serde(default)]
    pub receipts: Option<Vec<ReceiptRecord>>,
}

/// A snapshot as stored or served: the envelope or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Snapshot {
    Envelope(ReceiptList),
    Bare(Vec<ReceiptRecord>),
}

impl Snapshot {
    pub(crate) fn into_records(self) -> Vec<ReceiptRecord> {
        match self {
            Self::Envelope(list) => list.receipts.unwrap_or_default(),
            Self::Bare(records) => records,
        }
    }
}
