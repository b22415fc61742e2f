pub mod cache;
pub mod corpus;
pub mod tfidf;
