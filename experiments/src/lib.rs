pub mod api;
pub mod config;
pub mod contexts;
pub mod flows;
pub mod grouping;
pub mod metrics_consts;
pub mod metrics_utils;
pub mod router;
pub mod routes;
pub mod server;
