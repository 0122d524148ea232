use crate::db::Storage;
use crate::error::Result;
use crate::models::ImportRecord;
use crate::store::{Collection, IMPORTS_KEY};

/// Record of past import runs, oldest first.
pub struct ImportHistory<'a> {
    records: Collection<'a, ImportRecord>,
}

impl<'a> ImportHistory<'a> {
    pub fn load(storage: &'a dyn Storage) -> Result<Self> {
        Ok(Self {
            records: Collection::load(storage, IMPORTS_KEY)?,
        })
    }

    pub fn list(&self) -> &[ImportRecord] {
        self.records.items()
    }

    pub fn record(&mut self, record: ImportRecord) -> Result<()> {
        self.records.mutate(|records| records.push(record))
    }

    pub fn find(&self, import_id: &str) -> Option<&ImportRecord> {
        self.list().iter().find(|r| r.import_id == import_id)
    }

    pub fn find_by_checksum(&self, checksum: &str) -> Option<&ImportRecord> {
        self.list().iter().find(|r| r.checksum == checksum)
    }

    pub fn remove(&mut self, import_id: &str) -> Result<bool> {
        Ok(self.records.retain(|r| r.import_id != import_id)? > 0)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.records.mutate(|records| records.clear())
    }
}
