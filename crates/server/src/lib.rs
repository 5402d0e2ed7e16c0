// Coin dashboard backend - market data client, view controllers and HTTP surface

pub mod chart;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod handlers;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
