// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway exposing the ledger to local frontends.
//!
//! The gateway is a thin translation layer: JSON in, ledger call with a
//! deadline, enveloped JSON out. All domain rules live in the ledger.

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{start_server, GatewayState, ServerConfig};
