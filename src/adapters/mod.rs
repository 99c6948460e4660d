//! Adapters implementing the persistence port.
//!
//! [`MsgPackRepository`] writes saved learners to disk; [`InMemoryRepository`]
//! keeps the same bytes in a shared map for tests.

pub mod in_memory_repository;
pub mod msgpack_repository;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
