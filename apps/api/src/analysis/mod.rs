pub mod decoders;
pub mod extractor;
pub mod fields;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod scoring;
pub mod skills;
