// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device constants

/// Label shown on the idle screen
pub const IDLE_LABEL: &str = "PLUGIN SIGNER";

/// Characters per line in confirmation previews
pub const PREVIEW_WIDTH: usize = 21;

/// First line of the signing confirmation preview
pub const SIGN_PROMPT: &str = "Sign plugin config?";

/// First line of the PIN change confirmation
pub const CHANGE_PIN_PROMPT: &str = "Change PIN?";

/// Left (decline) button label
pub const DECLINE_LABEL: &str = "{ Cancel";

/// Right (accept) button label
pub const ACCEPT_LABEL: &str = "Confirm }";

/// Maximum PIN backoff in seconds
pub const MAX_PIN_DELAY_S: u64 = 3600;

/// Seconds per day, for configuration validity
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Control loop idle period in milliseconds
pub const IDLE_PERIOD_MS: u64 = 100;
