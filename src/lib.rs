//! # News Archive
//!
//! Ingests a flat folder of plain-text news articles into a store and serves
//! pagination, keyword search, and extractive question answering over them.
//!
//! Each article file carries an optional front-matter header (`key: value`
//! lines) terminated by a `---` line, followed by the body. Files are
//! upserted keyed by filename, so re-running an import only writes what
//! changed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Archive    │──▶│   Ingest     │──▶│ ArticleStore │
//! │  *.txt      │   │ parse+upsert │   │ SQLite/Mem   │
//! └─────────────┘   └──────────────┘   └──────┬───────┘
//!                                             │
//!                         ┌───────────────────┤
//!                         ▼                   ▼
//!                    ┌──────────┐       ┌──────────┐
//!                    │   CLI    │       │   HTTP   │
//!                    │  (news)  │       │  (axum)  │
//!                    └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! news init                       # create database
//! news import                     # ingest the archive folder
//! news search "warehouse fire"
//! news ask "What destroyed the warehouse?"
//! news serve                      # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`context`] | Explicit application context (config + store) |
//! | [`front_matter`] | Header/body splitting |
//! | [`normalize`] | Raw file to article record |
//! | [`ingest`] | Directory import with batched upserts |
//! | [`store`] | Storage trait with SQLite and in-memory backends |
//! | [`articles`] | Pagination and lookup by id |
//! | [`search`] | Keyword search with previews |
//! | [`qa`] | Extractive question answering |
//! | [`server`] | HTTP API |
//! | [`stats`] | Archive statistics |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod articles;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod front_matter;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod qa;
pub mod search;
pub mod server;
pub mod stats;
pub mod store;
pub mod text;
