//! Windows context-menu and startup entry manager.
//!
//! Finds the verbs and shell extensions that populate Explorer's
//! right-click menus and the programs launched at logon, merges duplicate
//! registrations into single entries, and enables, disables, deletes or
//! exports them as `.reg` files.
//!
//! The public API is organised into these layers:
//!
//! - **[`registry`]**: the [`RegistryStore`](registry::RegistryStore) seam,
//!   with a live `winreg` backend and an in-memory one
//! - **[`model`]**: entries, locations, classifications and startup kinds
//! - **[`context_menu`]** and **[`startup`]**: discovery, lifecycle and
//!   backup for each domain
//! - **[`lifecycle`]** and **[`backup`]**: per-location mutation reports and
//!   the `.reg` serializer they share
//! - **[`commands`]**: top-level subcommand orchestration (`menu`, `startup`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cli;
pub mod command_line;
pub mod commands;
pub mod config;
pub mod context_menu;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod platform;
pub mod publisher;
pub mod registry;
pub mod resolver;
pub mod startup;
pub mod worker;
