// Interview context: resume and job-description text that personalise questions.

pub mod handlers;
pub mod resume;
