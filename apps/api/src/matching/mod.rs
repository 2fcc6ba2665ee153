// Match scoring pipeline.
// Orchestrates resolve -> score -> persist per unscored application and
// assembles the per-run Result Map and Error Map.

pub mod handlers;
pub mod orchestrator;
pub mod outcome;
