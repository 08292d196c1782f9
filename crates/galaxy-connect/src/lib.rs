//! Galaxy Connect: HTTP access to a Galaxy server
//!
//! This crate provides [`GalaxyClient`], the production implementation of
//! `galaxy_interface::GalaxyApi`. It talks to the Galaxy REST API with an
//! API key sent in the `x-api-key` header.
//!
//! # Example
//!
//! ```rust,no_run
//! use galaxy_connect::GalaxyClient;
//! use galaxy_interface::GalaxyApi;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GalaxyClient::builder("https://usegalaxy.org", "my-api-key")
//!         .page_size(200)
//!         .build()?;
//!
//!     for history in client.list_histories().await? {
//!         println!("{:?}", history.get("name"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

pub use client::{GalaxyClient, GalaxyClientBuilder};
pub use error::ConnectError;
