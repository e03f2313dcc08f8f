pub mod attempts;

pub use attempts::{
    attempts_from_stored, validate_max_attempts, AttemptPolicy, Eligibility, MAX_ATTEMPTS,
    MAX_ATTEMPTS_LIMIT,
};
