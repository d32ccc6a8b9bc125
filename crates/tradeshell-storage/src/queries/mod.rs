// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per entity.

pub mod accounts;
pub mod profiles;
