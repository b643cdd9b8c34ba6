pub mod agent;
pub mod errors;
pub mod executor;
pub mod history;
pub mod memory;
pub mod models;
pub mod policy;
pub mod prompt_template;
pub mod providers;
pub mod retrieval;
