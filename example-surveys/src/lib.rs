pub mod election_tracker;
pub mod household;

// Re-export household fixtures
pub use household::{HOUSEHOLD_JSON, household};

// Re-export election tracker fixtures
pub use election_tracker::{BYE_ELECTION_SEAT, TRACKER_CONFIG, TRACKER_ID, election_tracker};
