// SPDX-License-Identifier: GPL-3.0-or-later
// src/service/mod.rs
//
// Fusion service transports.

pub mod http;

pub use http::HttpFusionClient;
