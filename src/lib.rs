//! Warehouse Tenant Lead Finder Library
//!
//! This library provides the core functionality for the warehouse lead API:
//! resolving pasted map links into a map pin, fetching prospects from an
//! external provider (generative model, web search, local-business search or
//! a search-engine wrapper), normalizing them into a fixed contact schema,
//! and exporting them as CSV.
//!
//! # Modules
//!
//! - `api`: HTTP-layer namespace.
//! - `core`: Domain-layer namespace.
//! - `integrations`: External provider namespace.
//! - `cache_validator`: Checksummed provider response cache entries.
//! - `circuit_breaker`: Circuit breaker for provider calls.
//! - `config`: Configuration management.
//! - `contact_validation`: Email and phone validation.
//! - `errors`: Error handling types.
//! - `export`: CSV export and import of lead tables.
//! - `handlers`: HTTP request handlers and router.
//! - `lead_search`: Lead search workflow.
//! - `location`: Coordinate extraction from free text.
//! - `mock`: Placeholder leads.
//! - `models`: Core data models.
//! - `normalizer`: Provider payload normalization.
//! - `services`: External provider clients (OpenAI, Serper, SerpApi).
//! - `session`: Per-session state.

pub mod api;
pub mod core;
pub mod integrations;

pub mod cache_validator;
pub mod circuit_breaker;
pub mod config;
pub mod contact_validation;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod lead_search;
pub mod location;
pub mod mock;
pub mod models;
pub mod normalizer;
pub mod services;
pub mod session;
