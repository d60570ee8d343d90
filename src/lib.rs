// SPDX-License-Identifier: GPL-3.0-or-later
// src/lib.rs
//
// Region selection and fusion workflow engine for garment image compositing.

pub mod app;
pub mod config;
pub mod constant;
pub mod domain;
pub mod error;
#[cfg(feature = "http")]
pub mod service;

pub use app::{AppMessage, AppModel, Session, Slot, WorkflowState};
pub use config::AppConfig;
