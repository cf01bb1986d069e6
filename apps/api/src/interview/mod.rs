// Interview sessions: categories, question generation, answer evaluation and
// the per-user session state machine. All LLM calls go through llm_client.

pub mod category;
pub mod coach;
pub mod feedback;
pub mod handlers;
pub mod prompts;
pub mod registry;
pub mod session;
pub mod transcript;
