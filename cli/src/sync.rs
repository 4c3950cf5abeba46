//! Bookkeeping for `spend sync`.
//!
//! A record the server rejects is noted and the sync moves on to the next
//! one. Transport failures still abort, since every later push would fail the
//! same way.

use std::fmt::Write;

use uuid::Uuid;

use crate::CliError;
use crate::api::PushOutcome;

#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub already: usize,
    pub failed: Vec<(Uuid, String)>,
}

impl SyncReport {
    /// Fold one push result into the report.
    ///
    /// # Errors
    ///
    /// Returns the error unchanged unless it is a per-record server rejection.
    pub fn record(&mut self, id: Uuid, outcome: Result<PushOutcome, CliError>) -> Result<(), CliError> {
        match outcome {
            Ok(PushOutcome::Created) => self.created = self.created.saturating_add(1),
            Ok(PushOutcome::AlreadySynced) => self.already = self.already.saturating_add(1),
            Err(CliError::Server { status, message }) => self.failed.push((id, format!("HTTP {status}: {message}"))),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "synced {} new, {} already on server, {} failed",
            self.created,
            self.already,
            self.failed.len()
        );
        for (id, reason) in &self.failed {
            let _ = write!(out, "\n  {id}: {reason}");
        }
        out
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
