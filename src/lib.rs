pub mod chain;
pub mod core;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod rag;
pub mod server;
pub mod session;
pub mod state;
pub mod vector_math;
