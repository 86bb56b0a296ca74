// Report formalization pipeline: five chained prompts turn an informal
// incident report into the formal VORFALLBERICHT template.
// All model calls go through llm_client::TextGenerator.

pub mod context;
pub mod formalizer;
pub mod handlers;
pub mod prompts;
pub mod steps;
