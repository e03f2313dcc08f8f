pub mod leases;
pub mod outcomes;
pub mod records;
pub mod stats;

pub use leases::LeasesRepo;
pub use outcomes::{FinalizeOutcome, OutcomesRepo};
pub use records::{ImportBatch, ImportEntry, RecordsRepo};
pub use stats::StatsRepo;
