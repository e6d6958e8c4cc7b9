// Application lifecycle — apply, read views, HR review.
// Screening itself lives in pipeline; this module only validates, persists
// and queues.

pub mod handlers;
pub mod service;
