//! Echo server — a stand-in for the gateway that answers every chat request
//! with a canned reply, useful for wiring up clients before an upstream API
//! key exists.

pub mod dto;
pub mod routes;
