use crate::db::Storage;
use crate::error::Result;
use crate::models::{Transaction, TransactionType};
use crate::store::{Collection, TRANSACTIONS_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialStats {
    pub balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
}

pub fn stats<'t>(transactions: impl IntoIterator<Item = &'t Transaction>) -> FinancialStats {
    transactions
        .into_iter()
        .fold(FinancialStats::default(), |mut acc, t| {
            match t.txn_type {
                TransactionType::Income => {
                    acc.total_income += t.amount;
                    acc.balance += t.amount;
                }
                TransactionType::Expense => {
                    acc.total_expense += t.amount;
                    acc.balance -= t.amount;
                }
            }
            acc
        })
}

/// The global transaction ledger, newest entries first.
pub struct TransactionLedger<'a> {
    items: Collection<'a, Transaction>,
}

impl<'a> TransactionLedger<'a> {
    pub fn load(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            items: Collection::load(storage, TRANSACTIONS_KEY)?,
        })
    }

    pub fn list(&self) -> &[Transaction] {
        self.items.items()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.list().iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, transaction: Transaction) -> Result<()> {
        self.items.mutate(|items| items.insert(0, transaction))
    }

    /// Prepend a batch, keeping the batch's own order.
    pub fn add_many(&mut self, transactions: Vec<Transaction>) -> Result<()> {
        self.items.mutate(|items| {
            items.splice(0..0, transactions);
        })
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        Ok(self.items.retain(|t| t.id != id)? > 0)
    }

    /// Remove the first transaction matching `pred`; returns it if found.
    pub fn remove_first(
        &mut self,
        pred: impl Fn(&Transaction) -> bool,
    ) -> Result<Option<Transaction>> {
        let Some(idx) = self.list().iter().position(|t| pred(t)) else {
            return Ok(None);
        };
        self.items.mutate(|items| Some(items.remove(idx)))
    }

    pub fn remove_by_import_id(&mut self, import_id: &str) -> Result<usize> {
        self.items
            .retain(|t| t.import_id.as_deref() != Some(import_id))
    }

    /// Drop every imported transaction; manual entries stay.
    pub fn clear_imported(&mut self) -> Result<usize> {
        self.items.retain(|t| !t.is_imported())
    }

    pub fn clear_all(&mut self) -> Result<usize> {
        let count = self.items.len();
        self.items.mutate(|items| items.clear())?;
        Ok(count)
    }

    /// Batch ids embed a zero-padded timestamp, so the greatest one is the newest.
    pub fn last_import_id(&self) -> Option<&str> {
        self.list().iter().filter_map(|t| t.import_id.as_deref()).max()
    }

    pub fn stats(&self) -> FinancialStats {
        stats(self.list())
    }
}
