//! Process-local adapters for running without external infrastructure.

mod in_memory_user_gateway;

pub use in_memory_user_gateway::InMemoryUserGateway;
