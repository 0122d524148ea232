use chrono::NaiveDate;

use crate::db::Storage;
use crate::error::{FinflowError, Result};
use crate::ledger::TransactionLedger;
use crate::models::{Cost, CostStatus, Transaction, TransactionType};
use crate::store::{Collection, COSTS_KEY};

fn payment_description(cost: &Cost) -> String {
    format!("Pagamento Mensal: {}", cost.description)
}

fn not_found(id: &str) -> FinflowError {
    FinflowError::NotFound {
        kind: "cost",
        id: id.to_string(),
    }
}

fn check_day(day: u32) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(FinflowError::InvalidInput(format!(
            "day of month must be between 1 and 31, got {day}"
        )));
    }
    Ok(())
}

/// Recurring monthly costs.
pub struct CostStore<'a> {
    costs: Collection<'a, Cost>,
}

impl<'a> CostStore<'a> {
    pub fn load(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            costs: Collection::load(storage, COSTS_KEY)?,
        })
    }

    pub fn list(&self) -> &[Cost] {
        self.costs.items()
    }

    pub fn get(&self, id: &str) -> Option<&Cost> {
        self.list().iter().find(|c| c.id == id)
    }

    pub fn add(&mut self, cost: Cost) -> Result<()> {
        check_day(cost.day_of_month)?;
        self.costs.mutate(|costs| costs.push(cost))
    }

    /// Replace the stored cost carrying the same id.
    pub fn update(&mut self, cost: Cost) -> Result<()> {
        check_day(cost.day_of_month)?;
        let idx = self
            .list()
            .iter()
            .position(|c| c.id == cost.id)
            .ok_or_else(|| not_found(&cost.id))?;
        self.costs.mutate(|costs| costs[idx] = cost)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        Ok(self.costs.retain(|c| c.id != id)? > 0)
    }

    /// Flip whether the cost counts toward totals. Returns the new state.
    pub fn toggle_active(&mut self, id: &str) -> Result<bool> {
        let idx = self.position(id)?;
        self.costs.mutate(|costs| {
            costs[idx].active = !costs[idx].active;
            costs[idx].active
        })
    }

    /// Mark a pending cost paid (booking an expense dated `today`) or revert a
    /// paid one to pending (removing the first same-day payment it booked).
    pub fn toggle_status(
        &mut self,
        id: &str,
        today: NaiveDate,
        ledger: &mut TransactionLedger,
    ) -> Result<CostStatus> {
        let idx = self.position(id)?;
        let cost = self.list()[idx].clone();

        let next = match cost.status {
            CostStatus::Pending => {
                ledger.add(Transaction {
                    id: format!("cost-pay-{}-{}", cost.id, chrono::Utc::now().timestamp_millis()),
                    description: payment_description(&cost),
                    amount: cost.amount,
                    txn_type: TransactionType::Expense,
                    category: cost.category.clone(),
                    date: today,
                    import_id: None,
                    scope: cost.scope,
                })?;
                CostStatus::Paid
            }
            CostStatus::Paid => {
                let description = payment_description(&cost);
                let removed = ledger.remove_first(|t| {
                    t.description == description
                        && t.amount == cost.amount
                        && t.txn_type == TransactionType::Expense
                        && t.date == today
                })?;
                if removed.is_none() {
                    tracing::debug!(cost = %cost.id, "no same-day payment to reverse");
                }
                CostStatus::Pending
            }
        };

        self.costs.mutate(|costs| costs[idx].status = next)?;
        Ok(next)
    }

    pub fn total_pending(&self) -> f64 {
        self.total_with(CostStatus::Pending)
    }

    pub fn total_paid(&self) -> f64 {
        self.total_with(CostStatus::Paid)
    }

    fn total_with(&self, status: CostStatus) -> f64 {
        self.list()
            .iter()
            .filter(|c| c.active && c.status == status)
            .map(|c| c.amount)
            .sum()
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.list()
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(id))
    }
}
