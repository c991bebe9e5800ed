//! Persistence port for the ledger
//!
//! The ledger loads its state once when opened and saves the full state
//! after every mutation. [`crate::storage::JsonStore`] is the on-disk
//! implementation; [`MemoryStore`] keeps everything in process.

use anyhow::{bail, Result};

use super::state::LedgerState;

/// Durable home for the ledger's books and loans
pub trait LedgerStore {
    /// Reads the full state. A store that was never written yields an
    /// empty state.
    fn load(&self) -> Result<LedgerState>;

    /// Replaces the stored state with `state`
    fn save(&mut self, state: &LedgerState) -> Result<()>;
}

/// In-process store, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: LedgerState,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing state
    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// A store whose saves always fail
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Last saved state
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<LedgerState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &LedgerState) -> Result<()> {
        if self.fail_saves {
            bail!("memory store is read-only");
        }
        self.state = state.clone();
        self.saves += 1;
        Ok(())
    }
}
