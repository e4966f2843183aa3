use serde_json::{json, Value};

pub const DEFAULT_PORT: u16 = 8501;

/// Built-in configuration; `config.yml` is deep-merged over this.
pub fn default_config() -> Value {
    json!({
        "server": {
            "host": "127.0.0.1",
            "port": DEFAULT_PORT,
            "cors_allowed_origins": []
        },
        "llm": {
            "provider": "ollama",
            "base_url": "http://127.0.0.1:11434",
            "chat_model": "llama3",
            "embedding_model": "nomic-embed-text",
            "temperature": 0.2,
            "request_timeout_secs": 300
        },
        "rag": {
            "chunk_size": 1000,
            "chunk_overlap": 200,
            "top_k": 4,
            "similarity_threshold": 0.2,
            "max_context_length": 6000,
            "embedding_batch_size": 32,
            "embedding_concurrency": 2
        },
        "upload": {
            "max_upload_bytes": 50 * 1024 * 1024
        },
        "session": {
            "idle_ttl_secs": 4 * 60 * 60,
            "sweep_interval_secs": 5 * 60
        }
    })
}
