//! Spend analytics over a receipt snapshot.
//!
//! [`summarize`] is a pure function of its input: one pass builds the
//! counters and the grouped sums, then each breakdown is emitted with
//! amounts rounded by [`Money::rounded`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ReceiptRecord, ReceiptStatus, ResultEngine};

/// Number of merchants kept in [`AnalyticsSummary::by_merchant`].
pub const MERCHANT_RANKING_LIMIT: usize = 5;

/// Receipt counts over the whole snapshot, eligible or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub total: u64,
    pub completed: u64,
    pub processing: u64,
    pub with_alerts: u64,
}

/// Spend attributed to a category or merchant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAmount {
    pub name: String,
    pub value: Money,
}

/// Spend attributed to a calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAmount {
    pub date: String,
    pub amount: Money,
}

/// Everything the dashboard shows, derived from one receipt snapshot.
///
/// Monetary figures only include *eligible* receipts: `COMPLETED` with a
/// total that parses to a finite number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub counters: Counters,
    pub total_spent: Money,
    /// One entry per category, ascending by name. Treat it as a set.
    pub by_category: Vec<NamedAmount>,
    /// Top merchants, descending by value, ties by ascending name.
    pub by_merchant: Vec<NamedAmount>,
    /// One entry per day with spend, ascending by date.
    pub over_time: Vec<DailyAmount>,
}

impl AnalyticsSummary {
    /// Same as [`summarize`].
    pub fn from_records(records: &[ReceiptRecord]) -> Self {
        summarize(records)
    }
}

/// Builds the analytics summary for a receipt snapshot.
///
/// Records with a missing or malformed total are counted but left out of
/// every monetary figure. A record whose day cannot be determined still
/// counts toward the totals and the category and merchant breakdowns, and
/// is only missing from [`AnalyticsSummary::over_time`].
///
/// ```rust
/// use receipt_engine::summarize;
///
/// let summary = summarize(&[]);
/// assert_eq!(summary.counters.total, 0);
/// assert_eq!(summary.total_spent.to_string(), "0.00");
/// assert!(summary.by_category.is_empty());
/// ```
pub fn summarize(records: &[ReceiptRecord]) -> AnalyticsSummary {
    let mut counters = Counters::default();
    let mut spend = SpendGroups::default();

    for record in records {
        counters.total += 1;
        match record.status {
            ReceiptStatus::Completed => counters.completed += 1,
            ReceiptStatus::Processing => counters.processing += 1,
            _ => {}
        }
        if record.has_alerts() {
            counters.with_alerts += 1;
        }

        if !record.is_completed() {
            continue;
        }
        if let Err(err) = spend.add(record) {
            tracing::debug!("receipt {} excluded from spend: {err}", record.id);
        }
    }

    let summary = spend.emit(counters);
    tracing::debug!(
        total = summary.counters.total,
        categories = summary.by_category.len(),
        days = summary.over_time.len(),
        "receipt summary computed"
    );
    summary
}

/// Exact running sums, keyed by group. Nothing is rounded until [`emit`].
///
/// [`emit`]: SpendGroups::emit
#[derive(Debug, Default)]
struct SpendGroups<'a> {
    total: Money,
    by_category: BTreeMap<&'a str, Money>,
    by_merchant: BTreeMap<&'a str, Money>,
    by_day: BTreeMap<String, Money>,
}

impl<'a> SpendGroups<'a> {
    /// Adds an eligible record to every group it belongs to.
    ///
    /// All sums are computed before any is stored, so a record that fails
    /// leaves the groups untouched.
    fn add(&mut self, record: &'a ReceiptRecord) -> ResultEngine<()> {
        let amount = record.amount()?;
        let category = record.category_key();
        let merchant = record.merchant_key();
        let day = match record.effective_date() {
            Ok(day) => Some(day),
            Err(err) => {
                tracing::warn!("receipt {} left out of the time series: {err}", record.id);
                None
            }
        };

        let overflow = || EngineError::AmountOverflow(record.id.clone());
        let add = |sum: Option<&Money>| {
            sum.copied()
                .unwrap_or_default()
                .checked_add(amount)
                .ok_or_else(overflow)
        };

        let total = add(Some(&self.total))?;
        let category_sum = add(self.by_category.get(category))?;
        let merchant_sum = add(self.by_merchant.get(merchant))?;
        let day_sum = match &day {
            Some(day) => Some(add(self.by_day.get(day))?),
            None => None,
        };

        self.total = total;
        self.by_category.insert(category, category_sum);
        self.by_merchant.insert(merchant, merchant_sum);
        if let (Some(day), Some(day_sum)) = (day, day_sum) {
            self.by_day.insert(day, day_sum);
        }
        Ok(())
    }

    fn emit(self, counters: Counters) -> AnalyticsSummary {
        AnalyticsSummary {
            counters,
            total_spent: self.total.rounded(),
            by_category: emit_named(self.by_category),
            by_merchant: rank_merchants(self.by_merchant),
            over_time: self
                .by_day
                .into_iter()
                .map(|(date, amount)| DailyAmount {
                    date,
                    amount: amount.rounded(),
                })
                .collect(),
        }
    }
}

fn emit_named(groups: BTreeMap<&str, Money>) -> Vec<NamedAmount> {
    groups
        .into_iter()
        .map(|(name, value)| NamedAmount {
            name: name.to_string(),
            value: value.rounded(),
        })
        .collect()
}

fn rank_merchants(groups: BTreeMap<&str, Money>) -> Vec<NamedAmount> {
    let mut ranked = emit_named(groups);
    ranked.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(MERCHANT_RANKING_LIMIT);
    ranked
}
