pub mod cv_match;
pub mod job;
