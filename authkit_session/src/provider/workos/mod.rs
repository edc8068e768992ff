mod client;
mod jwks;
mod seal;
mod types;

pub use client::WorkosClient;
