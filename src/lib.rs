//! MCP server exposing read-oriented LangSmith tools.
//!
//! The crate is organized around four layers: [`config`] resolves credentials
//! and endpoints, [`client`] talks to the LangSmith REST API, [`tools`] maps
//! MCP tool calls onto client calls, and [`server`] speaks JSON-RPC over
//! stdio. [`pagination`] implements the character-budget pagination shared by
//! the run and thread-history tools.

pub mod client;
pub mod config;
pub mod formatters;
pub mod pagination;
pub mod server;
pub mod tools;
