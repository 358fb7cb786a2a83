// core.rs splits the ledger into the block model and hasher (chain),
// the lock-protected ledger state (state) and chain validation (validation).
pub mod chain;
pub mod state;
pub mod validation;

pub use chain::*;
pub use state::*;
pub use validation::*;
