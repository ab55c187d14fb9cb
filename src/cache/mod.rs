pub mod filter;

pub use filter::{filter_records, Searchable};

pub trait Identified {
    fn id(&self) -> u64;
}

/// Ticket handed out when a fetch starts. Only the most recent ticket may
/// replace the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Replaced { generation: Generation, len: usize },
    Stale { generation: Generation, latest: Generation },
}

impl Applied {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ListCache<T> {
    records: Vec<T>,
    issued: u64,
    applied: u64,
    next_local_id: u64,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issued: 0,
            applied: 0,
            next_local_id: 1,
        }
    }
}

impl<T: Identified> ListCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied
    }

    pub fn begin_request(&mut self) -> Generation {
        self.issued += 1;
        Generation(self.issued)
    }

    /// Replaces the whole list if `generation` is still the latest issued
    /// ticket; older responses are dropped.
    pub fn apply(&mut self, generation: Generation, records: Vec<T>) -> Applied {
        let latest = Generation(self.issued);
        if generation != latest || generation.0 <= self.applied {
            return Applied::Stale { generation, latest };
        }
        self.records = records;
        self.applied = generation.0;
        self.bump_local_ids();
        Applied::Replaced {
            generation,
            len: self.records.len(),
        }
    }

    pub fn push_local(&mut self, build: impl FnOnce(u64) -> T) -> u64 {
        self.bump_local_ids();
        let id = self.next_local_id;
        self.next_local_id += 1;
        self.records.push(build(id));
        id
    }

    pub fn replace(&mut self, record: T) -> bool {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<T> {
        let idx = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(idx))
    }

    fn bump_local_ids(&mut self) {
        let max = self.records.iter().map(|r| r.id()).max().unwrap_or(0);
        if self.next_local_id <= max {
            self.next_local_id = max + 1;
        }
    }
}
