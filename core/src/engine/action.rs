// Copyright (c) 2022-2023 The MobileCoin Foundation

use strum::Display;

/// Deferred privileged operation, executed once authorised
#[derive(Clone, PartialEq, Debug, Display)]
pub enum Action {
    /// Sign a plugin configuration
    SignPluginConfig { config: Vec<u8>, protospec: Vec<u8> },

    /// Replace the stored PIN
    ChangePin,
}

/// Confirmation pending on the device display
#[derive(Clone, PartialEq, Debug)]
pub struct PendingAction {
    /// Ordered display lines
    pub prompt: Vec<String>,
    /// Short question shown above the buttons
    pub question: String,
    /// Right (accept) button label
    pub accept_label: String,
    /// Left (decline) button label
    pub decline_label: String,
    /// Operation bound to the confirmation
    pub action: Action,
}

/// Operation resumed following PIN entry
#[derive(Clone, PartialEq, Debug, Display)]
pub enum Continuation {
    /// Execute an authorised action
    Run(Action),

    /// Store the entered PIN
    StorePin,
}
