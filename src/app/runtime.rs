// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/runtime.rs
//
// Single-threaded event loop: run update tasks and feed completions back.

use std::rc::Rc;

use tokio::sync::mpsc;

use crate::app::message::AppMessage;
use crate::app::model::AppModel;
use crate::app::update::UpdateResult;
use crate::config::AppConfig;
use crate::domain::document::ImageHandle;
use crate::domain::fusion::FusionService;
use crate::error::{DecodeError, RemoteCallError};

/// Drives an [`AppModel`] against a fusion service.
///
/// All transitions run on the calling task. Decodes go to the blocking pool
/// and remote calls run as local tasks; both report back through a channel,
/// so no two transitions ever interleave.
///
/// Must be used from within a [`tokio::task::LocalSet`].
pub struct Session<S> {
    model: AppModel,
    service: Rc<S>,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: mpsc::UnboundedReceiver<AppMessage>,
    pending: usize,
}

impl<S: FusionService + 'static> Session<S> {
    pub fn new(config: &AppConfig, service: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            model: AppModel::new(config),
            service: Rc::new(service),
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut AppModel {
        &mut self.model
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Number of tasks whose completion has not been applied yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Apply a message and start whatever task it asks for.
    pub fn dispatch(&mut self, message: AppMessage) {
        let result = self.model.update(message);
        self.spawn(result);
    }

    fn spawn(&mut self, result: UpdateResult) {
        match result {
            UpdateResult::None => {}
            UpdateResult::Decode { slot, ticket, file } => {
                self.pending += 1;
                let tx = self.tx.clone();
                tokio::task::spawn_local(async move {
                    let result = tokio::task::spawn_blocking(move || ImageHandle::decode(&file))
                        .await
                        .unwrap_or_else(|e| Err(DecodeError::Interrupted(e.to_string())));
                    if tx
                        .send(AppMessage::ImageDecoded {
                            slot,
                            ticket,
                            result,
                        })
                        .is_err()
                    {
                        log::debug!("Session closed before {slot} decode #{ticket} finished");
                    }
                });
            }
            UpdateResult::Fuse { ticket, request } => {
                self.pending += 1;
                let tx = self.tx.clone();
                let service = Rc::clone(&self.service);
                tokio::task::spawn_local(async move {
                    // The call runs as its own task so a panic still reports back.
                    let call = tokio::task::spawn_local(async move { service.fuse(request).await });
                    let result = call.await.unwrap_or_else(|e| {
                        log::error!("Fusion #{} task failed: {e}", ticket.seq);
                        Err(RemoteCallError::Transport(format!("fusion task failed: {e}")))
                    });
                    if tx.send(AppMessage::FusionFinished { ticket, result }).is_err() {
                        log::debug!("Session closed before fusion #{} finished", ticket.seq);
                    }
                });
            }
        }
    }

    /// Wait for the next task completion and apply it.
    ///
    /// Returns `false` when nothing is pending.
    pub async fn step(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        let Some(message) = self.rx.recv().await else {
            return false;
        };
        self.pending -= 1;
        self.dispatch(message);
        true
    }

    /// Apply completions until no task is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }
}
