//! Email triage: classify incoming email as actionable or not and draft a reply.

pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod pipeline;
