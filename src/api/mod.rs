//! HTTP surface: the on-demand welcome trigger and health probes.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
