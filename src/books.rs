use crate::categorizer::RuleStore;
use crate::costs::CostStore;
use crate::db::Storage;
use crate::error::Result;
use crate::history::ImportHistory;
use crate::ledger::TransactionLedger;
use crate::logistics::LogisticsLedger;
use crate::receivables::ReceivableStore;

/// Every repository, loaded once from one storage backend.
pub struct Books<'a> {
    pub ledger: TransactionLedger<'a>,
    pub logistics: LogisticsLedger<'a>,
    pub costs: CostStore<'a>,
    pub receivables: ReceivableStore<'a>,
    pub history: ImportHistory<'a>,
    pub rules: RuleStore<'a>,
}

impl<'a> Books<'a> {
    pub fn open(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            ledger: TransactionLedger::load(storage)?,
            logistics: LogisticsLedger::load(storage)?,
            costs: CostStore::load(storage)?,
            receivables: ReceivableStore::load(storage)?,
            history: ImportHistory::load(storage)?,
            rules: RuleStore::load(storage)?,
        })
    }
}
