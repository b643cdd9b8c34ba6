//! These models represent the objects passed around by the agent
//!
//! There are two related formats we need to interact with:
//! - conversation turns, recorded in memory and rendered into transcripts
//! - chat messages, sent from the agent to the LLM (openai-compatible wire format)
//!
//! Turns are always plain text. Messages may carry content parts the provider returned
//! that we do not understand; those are kept as raw json and only stringified on demand.
pub mod message;
pub mod role;
pub mod turn;
