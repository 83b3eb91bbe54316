//! Profile photos: avatar images stored next to, but apart from, resumes.

pub mod handlers;
pub mod photos;
