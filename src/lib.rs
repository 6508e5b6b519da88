//! salatlink - prayer times, devotional reminders and nearby mosques
//!
//! This library provides the core functionality for the salatlink service:
//! prayer schedules from an upstream calculator, location resolution,
//! periodic adkar / Quran reminders, in-app notifications and mosque search
//! with routing. The same services back both the HTTP API and the CLI.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//! - **full**: All features enabled
//!
//! # Architecture
//! - `prayer` / `geo`: Pure schedule and distance computations
//! - `content`: Bundled adkar, verses and hadiths
//! - `providers`: Upstream HTTP data sources behind traits
//! - `services`: Application state shared by API and CLI
//! - `api`: HTTP services and middleware
//! - `interfaces`: User interfaces (CLI)
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

#[cfg(feature = "server")]
pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod errors;
pub mod geo;
#[cfg(feature = "cli")]
pub mod interfaces;
pub mod prayer;
pub mod providers;
pub mod runtime;
pub mod services;
pub mod system;
