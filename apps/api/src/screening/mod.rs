// CV screening: text extraction, skill detection, match scoring, batch orchestration.
// Persistence goes through `store::MatchStore`; nothing here talks to sqlx directly
// except the Postgres store implementation.

pub mod extractor;
pub mod fallback;
pub mod handlers;
pub mod pipeline;
pub mod scoring;
pub mod skills;
pub mod store;
pub mod vocabulary;
