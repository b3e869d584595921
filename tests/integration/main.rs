//! Integration tests with mock HTTP server

mod mock_server;
mod openai_generator;
mod query_service;
mod rest_kv;
