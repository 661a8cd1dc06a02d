// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vaultd`: the appliance control-plane process. Loads [`config::Settings`]
//! from the environment, wires the subsystem crates into one `AppState`
//! via [`build`], and serves the HTTP+WebSocket surface from `vault-api`.

pub mod build;
pub mod config;
