// Résumé version registration. Files are already on disk (upload transport
// is out of scope); this module validates, hashes and flips `is_current`.

pub mod handlers;
pub mod service;
