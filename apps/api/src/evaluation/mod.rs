// GEO judgment pipeline: rubric → prompt → completion → permissive parse.
// All LLM calls go through llm_client — no direct Groq calls here.

pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod rubric;
pub mod score;
