// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the registry tables.

pub mod dependencies;
pub mod plugins;
pub mod versions;
