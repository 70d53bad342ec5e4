// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Confirmation gate, sequencing host requests against physical button input.
//!
//! A [PendingAction] is only executed once it is both _armed_ (displayed, and
//! acknowledged by the host where required) and _decided_ by a button press.
//! Presses recorded before arming are dropped rather than replayed.

use strum::{Display, EnumIter};

use super::{Action, Driver, Error, PendingAction};

/// Externally visible gate state
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter)]
pub enum ConfirmState {
    /// No pending action
    Empty,
    /// Displayed, awaiting host acknowledgement
    Shown,
    /// Awaiting button decision
    Armed,
    /// Button decision recorded, awaiting resolution
    Decided,
}

#[derive(Default)]
enum Inner {
    #[default]
    Empty,
    Shown(PendingAction),
    Armed(PendingAction),
    Decided(PendingAction, bool),
}

/// Confirmation gate, owning at most one [PendingAction]
#[derive(Default)]
pub struct ConfirmationGate {
    inner: Inner,
}

impl ConfirmationGate {
    pub const fn new() -> Self {
        Self { inner: Inner::Empty }
    }

    /// Display a new pending action, replacing any prior action.
    ///
    /// Where `require_ack` is set the action remains unarmed until [Self::acknowledge].
    pub fn request<DRV: Driver>(&mut self, drv: &mut DRV, pending: PendingAction, require_ack: bool) {
        drv.show_question(&pending);

        self.inner = match require_ack {
            true => Inner::Shown(pending),
            false => Inner::Armed(pending),
        };
    }

    /// Arm a displayed action, returns false where no action is pending
    pub fn acknowledge(&mut self) -> bool {
        match core::mem::take(&mut self.inner) {
            Inner::Shown(p) | Inner::Armed(p) => {
                self.inner = Inner::Armed(p);
                true
            }
            Inner::Decided(p, b) => {
                self.inner = Inner::Decided(p, b);
                true
            }
            Inner::Empty => false,
        }
    }

    /// Record a button decision, dropped unless an armed action exists
    pub fn record_button(&mut self, accept: bool) {
        self.inner = match core::mem::take(&mut self.inner) {
            Inner::Armed(p) | Inner::Decided(p, _) => Inner::Decided(p, accept),
            other => {
                #[cfg(feature = "log")]
                log::debug!("dropping button press (no armed action)");

                other
            }
        };
    }

    /// Resolve a decided action.
    ///
    /// Returns `None` until an armed action has a recorded decision, then the
    /// bound [Action] on accept or [Error::ActionCancelled] on decline.
    /// The gate is empty following either outcome.
    pub fn resolve(&mut self) -> Option<Result<Action, Error>> {
        match core::mem::take(&mut self.inner) {
            Inner::Decided(p, true) => Some(Ok(p.action)),
            Inner::Decided(_, false) => Some(Err(Error::ActionCancelled)),
            other => {
                self.inner = other;
                None
            }
        }
    }

    /// Discard any pending action
    pub fn cancel(&mut self) {
        self.inner = Inner::Empty;
    }

    /// Fetch the pending action, if any
    pub fn prompt(&self) -> Option<&PendingAction> {
        match &self.inner {
            Inner::Empty => None,
            Inner::Shown(p) | Inner::Armed(p) | Inner::Decided(p, _) => Some(p),
        }
    }

    /// Fetch gate state
    pub fn state(&self) -> ConfirmState {
        match &self.inner {
            Inner::Empty => ConfirmState::Empty,
            Inner::Shown(_) => ConfirmState::Shown,
            Inner::Armed(_) => ConfirmState::Armed,
            Inner::Decided(..) => ConfirmState::Decided,
        }
    }
}
