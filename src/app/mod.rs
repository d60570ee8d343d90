// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Application layer: workbench model, messages, transitions and the event loop.

pub mod message;
pub mod model;
pub mod runtime;
pub mod update;
pub mod view;

pub use message::AppMessage;
pub use model::{AppModel, CommittedSelection, Notice, Preview, RequestTicket, Slot, WorkflowState};
pub use runtime::Session;
pub use update::UpdateResult;
