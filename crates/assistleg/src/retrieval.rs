//! Topic-bound retrieval: locating a topic's index, querying it and flattening the
//! result into text that can be injected into a prompt.
pub mod catalog;
pub mod normalize;
pub mod retriever;
pub mod tool;

pub use catalog::{HttpRetrieverSource, RetrieverSource, TopicCatalog};
pub use normalize::normalize;
pub use retriever::{HttpRetriever, Retriever, SearchParams, SearchType};
pub use tool::RetrievalTool;
