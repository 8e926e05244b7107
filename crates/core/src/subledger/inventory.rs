//! Inventory sub-ledger (spec 4.4): per-SKU costing under
//! moving-average, FIFO, or standard costing, with a configurable
//! negative-inventory policy.
//!
//! Each costing method keeps just enough state to answer "what does the
//! next issue cost": moving-average tracks a running weighted-average
//! cost, FIFO tracks an ordered batch queue, and standard costing tracks a
//! single fixed cost plus a variance account. Receiving and issuing both
//! return the functional-currency amount to post (and, for standard
//! costing, the variance line) so the caller can build the voucher through
//! [`crate::ledger::VoucherRequest`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_shared::types::InventoryBatchId;

use crate::ledger::error::LedgerError;

/// Which costing method an inventory item uses (spec 4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostingMethod {
    /// Weighted-average cost, recomputed on every receipt.
    MovingAverage,
    /// First-in-first-out: issues consume the oldest batches first.
    Fifo,
    /// Fixed standard cost; receipts post actual-vs-standard variance,
    /// issues post at standard.
    Standard,
}

/// What happens when an issue would drive on-hand quantity negative
/// (spec 4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeInventoryPolicy {
    /// Reject the issue outright (default).
    Reject,
    /// Issue at the last known cost, track the quantity deficit as
    /// `pending_cost_adjustment`, and correct on the next receipt.
    Allow,
}

/// One FIFO costing layer: a batch received at a point in time, with
/// whatever quantity of it has not yet been consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    /// Unique identifier.
    pub id: InventoryBatchId,
    /// Date received — FIFO consumes in this order.
    pub received_at: NaiveDate,
    /// Quantity remaining in this batch.
    pub quantity: Decimal,
    /// Unit cost this batch was received at.
    pub unit_cost: Decimal,
}

/// Full per-SKU inventory state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Stock-keeping unit.
    pub sku: String,
    /// Costing method in effect.
    pub costing_method: CostingMethod,
    /// Negative-inventory policy in effect.
    pub negative_policy: NegativeInventoryPolicy,
    /// Total quantity currently on hand (sum of FIFO batch quantities,
    /// under any costing method).
    pub quantity_on_hand: Decimal,
    /// Current weighted-average unit cost (meaningful for
    /// [`CostingMethod::MovingAverage`]; otherwise ignored).
    pub moving_average_cost: Decimal,
    /// Configured standard unit cost (meaningful for
    /// [`CostingMethod::Standard`]; otherwise ignored).
    pub standard_cost: Decimal,
    /// FIFO costing layers, oldest first (meaningful for
    /// [`CostingMethod::Fifo`]; otherwise left empty).
    pub batches: Vec<InventoryBatch>,
    /// Quantity issued under the `allow` negative-inventory policy that
    /// has not yet been corrected by a subsequent receipt (spec 4.4:
    /// "marks the deficit as `pending_cost_adjustment`").
    pub pending_cost_adjustment_qty: Decimal,
    /// The cost basis the pending deficit was issued at, so the
    /// correction voucher on next receipt knows what it over- or
    /// under-charged COGS by.
    pub pending_cost_adjustment_cost: Decimal,
}

/// Outcome of receiving a quantity into an item.
#[derive(Debug, Clone)]
pub struct ReceiptOutcome {
    /// Functional-currency amount to debit to inventory at actual cost.
    pub inventory_debit: Decimal,
    /// Under [`CostingMethod::Standard`] only: the actual-vs-standard
    /// variance to post (positive = unfavorable/debit to the variance
    /// account, negative = favorable/credit).
    pub standard_variance: Option<Decimal>,
    /// Correction amount for a previously pending negative-inventory
    /// deficit, if this receipt clears one (spec 4.4: "emits a correction
    /// voucher on the next receipt"). Positive means COGS was previously
    /// understated and must be topped up; negative the reverse.
    pub deficit_correction: Option<Decimal>,
}

/// Outcome of issuing a quantity from an item.
#[derive(Debug, Clone)]
pub struct IssueOutcome {
    /// Functional-currency amount to credit from inventory / debit to
    /// COGS.
    pub cogs: Decimal,
    /// Whether this issue was allowed to go negative under the `allow`
    /// policy (and by how much, in quantity).
    pub deficit_qty: Decimal,
}

impl InventoryItem {
    /// Creates a fresh, empty item under the given costing method and
    /// negative-inventory policy.
    #[must_use]
    pub fn new(sku: impl Into<String>, costing_method: CostingMethod, negative_policy: NegativeInventoryPolicy) -> Self {
        Self {
            sku: sku.into(),
            costing_method,
            negative_policy,
            quantity_on_hand: Decimal::ZERO,
            moving_average_cost: Decimal::ZERO,
            standard_cost: Decimal::ZERO,
            batches: Vec::new(),
            pending_cost_adjustment_qty: Decimal::ZERO,
            pending_cost_adjustment_cost: Decimal::ZERO,
        }
    }

    /// The cost a same-quantity issue would be charged at right now, used
    /// as "last known cost" when the `allow` policy drives quantity
    /// negative.
    #[must_use]
    pub fn last_known_cost(&self) -> Decimal {
        match self.costing_method {
            CostingMethod::MovingAverage => self.moving_average_cost,
            CostingMethod::Standard => self.standard_cost,
            CostingMethod::Fifo => self.batches.last().map_or(Decimal::ZERO, |b| b.unit_cost),
        }
    }

    /// Receives `quantity` units at `unit_cost` (the actual cost paid).
    ///
    /// Under [`CostingMethod::Standard`], `unit_cost` is the actual cost
    /// and the item's `standard_cost` is the posting cost; the difference
    /// becomes the variance line. Under the other two methods `unit_cost`
    /// is both the actual and posting cost.
    pub fn receive(&mut self, id: InventoryBatchId, received_at: NaiveDate, quantity: Decimal, unit_cost: Decimal) -> ReceiptOutcome {
        let deficit_correction = self.clear_pending_deficit(quantity, unit_cost);

        match self.costing_method {
            CostingMethod::MovingAverage => {
                let prior_value = self.moving_average_cost * self.quantity_on_hand;
                let new_quantity = self.quantity_on_hand + quantity;
                self.moving_average_cost = if new_quantity.is_zero() {
                    Decimal::ZERO
                } else {
                    (prior_value + unit_cost * quantity) / new_quantity
                };
                self.quantity_on_hand = new_quantity;
                ReceiptOutcome {
                    inventory_debit: unit_cost * quantity,
                    standard_variance: None,
                    deficit_correction,
                }
            }
            CostingMethod::Fifo => {
                self.quantity_on_hand += quantity;
                self.batches.push(InventoryBatch { id, received_at, quantity, unit_cost });
                ReceiptOutcome {
                    inventory_debit: unit_cost * quantity,
                    standard_variance: None,
                    deficit_correction,
                }
            }
            CostingMethod::Standard => {
                self.quantity_on_hand += quantity;
                let posting_cost = self.standard_cost * quantity;
                let actual_cost = unit_cost * quantity;
                let variance = actual_cost - posting_cost;
                ReceiptOutcome {
                    inventory_debit: posting_cost,
                    standard_variance: if variance.is_zero() { None } else { Some(variance) },
                    deficit_correction,
                }
            }
        }
    }

    /// If a prior `allow`-policy issue left a deficit and this receipt
    /// covers it, zeroes out (or partially reduces) the deficit and
    /// returns the correction amount — the gap between what COGS was
    /// charged at the time (`pending_cost_adjustment_cost`) and what the
    /// now-known replacement cost implies.
    fn clear_pending_deficit(&mut self, received_quantity: Decimal, unit_cost: Decimal) -> Option<Decimal> {
        if self.pending_cost_adjustment_qty.is_zero() {
            return None;
        }
        let covered = self.pending_cost_adjustment_qty.min(received_quantity);
        let prior_cost = covered * self.pending_cost_adjustment_cost;
        let replacement_cost = covered * unit_cost;
        let correction = replacement_cost - prior_cost;

        self.pending_cost_adjustment_qty -= covered;
        if self.pending_cost_adjustment_qty.is_zero() {
            self.pending_cost_adjustment_cost = Decimal::ZERO;
        }
        if correction.is_zero() {
            None
        } else {
            Some(correction)
        }
    }

    /// Issues `quantity` units, consuming FIFO layers oldest-first when
    /// applicable.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeInventory`] if `quantity` exceeds
    /// `quantity_on_hand` and the policy is [`NegativeInventoryPolicy::Reject`].
    pub fn issue(&mut self, quantity: Decimal) -> Result<IssueOutcome, LedgerError> {
        if quantity > self.quantity_on_hand && self.negative_policy == NegativeInventoryPolicy::Reject {
            return Err(LedgerError::NegativeInventory {
                sku: self.sku.clone(),
                on_hand: self.quantity_on_hand,
                requested: quantity,
            });
        }

        let covered_qty = quantity.min(self.quantity_on_hand.max(Decimal::ZERO));
        let deficit_qty = quantity - covered_qty;

        let covered_cogs = match self.costing_method {
            CostingMethod::MovingAverage => {
                self.quantity_on_hand -= covered_qty;
                covered_qty * self.moving_average_cost
            }
            CostingMethod::Standard => {
                self.quantity_on_hand -= covered_qty;
                covered_qty * self.standard_cost
            }
            CostingMethod::Fifo => self.consume_fifo(covered_qty),
        };

        let mut total_cogs = covered_cogs;
        if deficit_qty > Decimal::ZERO {
            let deficit_cost = self.last_known_cost();
            total_cogs += deficit_qty * deficit_cost;
            self.pending_cost_adjustment_qty += deficit_qty;
            self.pending_cost_adjustment_cost = deficit_cost;
            // quantity_on_hand dips negative to reflect the deficit, per
            // spec 4.4's "allow" path.
            self.quantity_on_hand -= deficit_qty;
        }

        Ok(IssueOutcome { cogs: total_cogs, deficit_qty })
    }

    fn consume_fifo(&mut self, mut quantity: Decimal) -> Decimal {
        let mut cogs = Decimal::ZERO;
        while quantity > Decimal::ZERO {
            let Some(batch) = self.batches.first_mut() else { break };
            let take = batch.quantity.min(quantity);
            cogs += take * batch.unit_cost;
            batch.quantity -= take;
            quantity -= take;
            self.quantity_on_hand -= take;
            if batch.quantity.is_zero() {
                self.batches.remove(0);
            }
        }
        cogs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fifo_issue_consumes_oldest_batches_first() {
        let mut item = InventoryItem::new("WIDGET", CostingMethod::Fifo, NegativeInventoryPolicy::Reject);
        item.receive(InventoryBatchId::new(), date(2025, 1, 1), dec!(10), dec!(10.00));
        item.receive(InventoryBatchId::new(), date(2025, 1, 5), dec!(5), dec!(12.00));

        let outcome = item.issue(dec!(12)).unwrap();
        assert_eq!(outcome.cogs, dec!(124.00)); // 10*10 + 2*12
        assert_eq!(item.quantity_on_hand, dec!(3));
        assert_eq!(item.batches.len(), 1);
        assert_eq!(item.batches[0].quantity, dec!(3));
        assert_eq!(item.batches[0].unit_cost, dec!(12.00));
    }

    #[test]
    fn moving_average_recomputes_on_receipt() {
        let mut item = InventoryItem::new("WIDGET", CostingMethod::MovingAverage, NegativeInventoryPolicy::Reject);
        item.receive(InventoryBatchId::new(), date(2025, 1, 1), dec!(10), dec!(10));
        item.receive(InventoryBatchId::new(), date(2025, 1, 5), dec!(10), dec!(20));
        // (10*10 + 10*20) / 20 = 15
        assert_eq!(item.moving_average_cost, dec!(15));

        let outcome = item.issue(dec!(5)).unwrap();
        assert_eq!(outcome.cogs, dec!(75));
        assert_eq!(item.quantity_on_hand, dec!(15));
    }

    #[test]
    fn standard_costing_posts_variance_on_receipt_and_standard_on_issue() {
        let mut item = InventoryItem::new("WIDGET", CostingMethod::Standard, NegativeInventoryPolicy::Reject);
        item.standard_cost = dec!(10);
        let receipt = item.receive(InventoryBatchId::new(), date(2025, 1, 1), dec!(10), dec!(11));
        assert_eq!(receipt.inventory_debit, dec!(100));
        assert_eq!(receipt.standard_variance, Some(dec!(10))); // unfavorable

        let outcome = item.issue(dec!(4)).unwrap();
        assert_eq!(outcome.cogs, dec!(40));
    }

    #[test]
    fn reject_policy_errors_on_negative_issue() {
        let mut item = InventoryItem::new("WIDGET", CostingMethod::Fifo, NegativeInventoryPolicy::Reject);
        item.receive(InventoryBatchId::new(), date(2025, 1, 1), dec!(5), dec!(10));
        let err = item.issue(dec!(8)).unwrap_err();
        assert!(matches!(err, LedgerError::NegativeInventory { .. }));
    }

    #[test]
    fn allow_policy_issues_at_last_known_cost_and_tracks_deficit() {
        let mut item = InventoryItem::new("WIDGET", CostingMethod::MovingAverage, NegativeInventoryPolicy::Allow);
        item.receive(InventoryBatchId::new(), date(2025, 1, 1), dec!(5), dec!(10));
        let outcome = item.issue(dec!(8)).unwrap();
        assert_eq!(outcome.deficit_qty, dec!(3));
        assert_eq!(outcome.cogs, dec!(80)); // 5*10 + 3*10 (last known cost)
        assert_eq!(item.pending_cost_adjustment_qty, dec!(3));
        assert_eq!(item.quantity_on_hand, dec!(-3));
    }

    #[test]
    fn next_receipt_corrects_pending_deficit() {
        let mut item = InventoryItem::new("WIDGET", CostingMethod::MovingAverage, NegativeInventoryPolicy::Allow);
        item.receive(InventoryBatchId::new(), date(2025, 1, 1), dec!(5), dec!(10));
        item.issue(dec!(8)).unwrap();

        let receipt = item.receive(InventoryBatchId::new(), date(2025, 1, 15), dec!(10), dec!(12));
        // 3 units of the deficit were issued at cost 10; actual replacement is 12.
        assert_eq!(receipt.deficit_correction, Some(dec!(6))); // 3 * (12 - 10)
        assert_eq!(item.pending_cost_adjustment_qty, Decimal::ZERO);
    }
}
