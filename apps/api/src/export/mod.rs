// Exports: selected member profiles as JSON, a rendered PDF, or queued email.
// Profiles are loaded through directory::profile so every format sees the same data.
pub mod email;
pub mod handlers;
pub mod pdf;
