pub mod chunker;
pub mod merger;
pub mod pipeline;
pub mod separator;
