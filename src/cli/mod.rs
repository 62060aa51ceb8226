// Copyright 2025 pwdns Contributors
// Licensed under GPL-3.0

//! CLI command implementations

pub mod host;
pub mod server;
