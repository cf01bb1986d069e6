pub mod context;
pub mod profile;
pub mod session;

pub use context::InterviewContext;
pub use profile::UserProfile;
pub use session::{QuestionResult, SessionRecord};
