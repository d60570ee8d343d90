// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Domain layer: geometry, documents and the fusion service contract.
// No UI state and no runtime concerns live here.

pub mod document;
pub mod fusion;
pub mod viewport;
