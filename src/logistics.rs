use crate::db::Storage;
use crate::error::Result;
use crate::models::{LogisticsKind, LogisticsTransaction};
use crate::store::{Collection, LOGISTICS_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogisticsStats {
    pub total: f64,
    pub uber_total: f64,
    pub shipping_total: f64,
    pub uber_count: usize,
    pub shipping_count: usize,
    pub uber_pct: u32,
    pub shipping_pct: u32,
}

pub struct LogisticsLedger<'a> {
    items: Collection<'a, LogisticsTransaction>,
}

impl<'a> LogisticsLedger<'a> {
    pub fn load(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            items: Collection::load(storage, LOGISTICS_KEY)?,
        })
    }

    pub fn list(&self) -> &[LogisticsTransaction] {
        self.items.items()
    }

    pub fn add(&mut self, entry: LogisticsTransaction) -> Result<()> {
        self.items.mutate(|items| items.insert(0, entry))
    }

    pub fn add_many(&mut self, entries: Vec<LogisticsTransaction>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.items.mutate(|items| {
            items.splice(0..0, entries);
        })
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        Ok(self.items.retain(|t| t.id != id)? > 0)
    }

    pub fn remove_by_import_id(&mut self, import_id: &str) -> Result<usize> {
        self.items
            .retain(|t| t.import_id.as_deref() != Some(import_id))
    }

    pub fn clear_imported(&mut self) -> Result<usize> {
        self.items.retain(|t| t.import_id.is_none())
    }

    pub fn stats(&self) -> LogisticsStats {
        let mut s = LogisticsStats::default();
        for t in self.list() {
            s.total += t.amount;
            match t.kind {
                LogisticsKind::Uber => {
                    s.uber_total += t.amount;
                    s.uber_count += 1;
                }
                LogisticsKind::Shipping => {
                    s.shipping_total += t.amount;
                    s.shipping_count += 1;
                }
            }
        }
        let split = s.uber_total + s.shipping_total;
        let denom = if split == 0.0 { 1.0 } else { split };
        s.uber_pct = (s.uber_total / denom * 100.0).round() as u32;
        s.shipping_pct = (s.shipping_total / denom * 100.0).round() as u32;
        s
    }
}
