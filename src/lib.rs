//! Screen Catalog: a REST service that records projects, the categories
//! grouping their screens, and structured design metadata for every screen.

pub mod config;
pub mod entities;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod repository;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;
