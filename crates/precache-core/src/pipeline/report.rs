//! Per-item outcomes and the aggregate batch report.

use crate::cache::CacheKey;
use crate::error::PrecacheError;
use crate::package::PackageKind;

/// A requested package that was left out of the batch.
#[derive(Debug)]
pub struct SkippedItem {
    pub slug: String,
    pub error: PrecacheError,
}

/// What happened to a single requested package.
#[derive(Debug)]
pub enum Outcome {
    Written(CacheKey),
    Skipped(SkippedItem),
}

/// Result of a completed batch.
#[derive(Debug)]
pub struct BatchReport {
    pub kind: PackageKind,
    /// Keys written, in request order.
    pub written: Vec<CacheKey>,
    pub skipped: Vec<SkippedItem>,
}

impl BatchReport {
    pub fn new(kind: PackageKind) -> Self {
        Self {
            kind,
            written: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written(key) => self.written.push(key),
            Outcome::Skipped(item) => self.skipped.push(item),
        }
    }

    /// Line printed after the batch, naming every key that was written.
    pub fn success_message(&self) -> String {
        let subject = match self.kind {
            PackageKind::Core => "WordPress",
            PackageKind::Theme => "Theme(s)",
            PackageKind::Plugin => "Plugin(s)",
        };
        if self.written.is_empty() {
            return format!("{subject} pre-cache finished; nothing was cached.");
        }
        let keys: Vec<&str> = self.written.iter().map(CacheKey::as_str).collect();
        format!("{subject} pre-cached: {}.", keys.join(", "))
    }
}
