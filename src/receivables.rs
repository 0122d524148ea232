use chrono::NaiveDate;

use crate::db::Storage;
use crate::error::{FinflowError, Result};
use crate::ledger::TransactionLedger;
use crate::models::{generate_id, ReceivableRecord, ReceivableStatus, Transaction, TransactionType};
use crate::store::{Collection, RECEIVABLES_KEY};

pub const CATEGORY_SERVICE: &str = "Serviço";

pub struct ReceivableStore<'a> {
    records: Collection<'a, ReceivableRecord>,
}

impl<'a> ReceivableStore<'a> {
    pub fn load(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            records: Collection::load(storage, RECEIVABLES_KEY)?,
        })
    }

    pub fn list(&self) -> &[ReceivableRecord] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&ReceivableRecord> {
        self.list().iter().find(|r| r.id == id)
    }

    pub fn add(&mut self, record: ReceivableRecord) -> Result<()> {
        if record.total_value <= 0.0 {
            return Err(FinflowError::InvalidInput(
                "total value must be positive".to_string(),
            ));
        }
        self.records.mutate(|records| records.insert(0, record))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        Ok(self.records.retain(|r| r.id != id)? > 0)
    }

    /// Book `amount` against a receivable and log it as income dated `today`.
    pub fn record_payment(
        &mut self,
        id: &str,
        amount: f64,
        today: NaiveDate,
        ledger: &mut TransactionLedger,
    ) -> Result<ReceivableStatus> {
        if amount <= 0.0 {
            return Err(FinflowError::InvalidInput(
                "payment amount must be positive".to_string(),
            ));
        }
        let idx = self
            .list()
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FinflowError::NotFound {
                kind: "receivable",
                id: id.to_string(),
            })?;
        let record = &self.list()[idx];
        let received = record.amount_received + amount;
        let status = if received >= record.total_value {
            ReceivableStatus::Paid
        } else {
            ReceivableStatus::Partial
        };

        ledger.add(Transaction {
            id: generate_id("receipt"),
            description: format!(
                "Recebimento Parcial: {} ({})",
                record.project_title, record.client_name
            ),
            amount,
            txn_type: TransactionType::Income,
            category: CATEGORY_SERVICE.to_string(),
            date: today,
            import_id: None,
            scope: record.scope,
        })?;

        self.records.mutate(|records| {
            records[idx].amount_received = received;
            records[idx].status = status;
        })?;
        Ok(status)
    }

    pub fn total_outstanding(&self) -> f64 {
        self.list().iter().map(ReceivableRecord::outstanding).sum()
    }
}
