// Copyright (c) 2022-2023 The MobileCoin Foundation

//! PIN gate, obfuscated PIN entry via a randomised digit matrix.
//!
//! Each challenge displays a fresh permutation of the digits 1-9 on a 3x3
//! grid. The host returns the grid _positions_ selected by the user
//! (`'1'..='9'`, row-major from the top left), which are mapped back to
//! digits through the stored matrix. A matrix is never reused across challenges.

use core::time::Duration;

use rand::seq::SliceRandom;
use rand_core::{CryptoRng, RngCore};
use strum::Display;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::{Continuation, Driver, Error};
use crate::consts::MAX_PIN_DELAY_S;

/// PIN matrix, `matrix[n]` is the digit displayed at position `n + 1`
pub type PinMatrix = [u8; 9];

/// Maximum PIN length (in digits)
pub const MAX_PIN_LEN: usize = 9;

/// PIN challenge mode
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum PinMode {
    /// Compare against the stored PIN
    VerifyStored,
    /// Forward the entered PIN to the continuation
    PassThrough,
}

/// Outstanding PIN challenge
struct PinChallenge {
    matrix: PinMatrix,
    mode: PinMode,
    continuation: Continuation,
}

impl Drop for PinChallenge {
    fn drop(&mut self) {
        self.matrix.zeroize();
    }
}

/// Result of a successful PIN submission
#[derive(Debug)]
pub struct PinOutcome {
    /// Operation to resume
    pub continuation: Continuation,
    /// Decoded PIN
    pub pin: Zeroizing<String>,
}

/// PIN gate, owning at most one outstanding challenge
#[derive(Default)]
pub struct PinGate {
    challenge: Option<PinChallenge>,
}

impl PinGate {
    pub const fn new() -> Self {
        Self { challenge: None }
    }

    /// Issue a new challenge with a freshly shuffled matrix, replacing any prior challenge
    pub fn challenge<DRV: Driver, RNG: RngCore + CryptoRng>(
        &mut self,
        drv: &mut DRV,
        rng: &mut RNG,
        mode: PinMode,
        continuation: Continuation,
    ) -> PinMatrix {
        let mut matrix: PinMatrix = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        matrix.shuffle(rng);

        #[cfg(feature = "log")]
        log::debug!("issuing {} pin challenge for {}", mode, continuation);

        drv.show_matrix(&matrix);

        self.challenge = Some(PinChallenge {
            matrix,
            mode,
            continuation,
        });

        matrix
    }

    /// Check whether a challenge is outstanding
    pub fn is_waiting(&self) -> bool {
        self.challenge.is_some()
    }

    /// Fetch the outstanding challenge mode
    pub fn mode(&self) -> Option<PinMode> {
        self.challenge.as_ref().map(|c| c.mode)
    }

    /// Submit a position-encoded PIN, consuming the outstanding challenge.
    ///
    /// On mismatch (in [PinMode::VerifyStored]) the persisted attempt counter
    /// is incremented and the call blocks for the backoff period via
    /// [Driver::delay] before returning [Error::PinInvalid].
    ///
    /// Failure to persist the attempt counter fails the submission.
    pub fn submit<DRV: Driver>(&mut self, drv: &mut DRV, encoded: &str) -> Result<PinOutcome, Error> {
        let mut c = self.challenge.take().ok_or(Error::UnexpectedMessage)?;

        let pin = matrix_decode(&c.matrix, encoded)?;

        let continuation = core::mem::replace(&mut c.continuation, Continuation::StorePin);

        if c.mode == PinMode::PassThrough {
            return Ok(PinOutcome { continuation, pin });
        }

        let stored = drv.pin().unwrap_or_default();
        if bool::from(pin.as_bytes().ct_eq(stored.as_bytes())) {
            drv.set_pin_attempts(0)?;
            return Ok(PinOutcome { continuation, pin });
        }

        let attempts = drv.pin_attempts().saturating_add(1);
        let persisted = drv.set_pin_attempts(attempts);

        let delay = pin_delay(attempts);

        #[cfg(feature = "log")]
        log::warn!("invalid pin (attempt {}), waiting {:?}", attempts, delay);

        drv.delay(delay);

        persisted?;

        Err(Error::PinInvalid)
    }

    /// Discard any outstanding challenge
    pub fn cancel(&mut self) {
        self.challenge = None;
    }
}

/// Backoff following `attempts` consecutive failures
pub fn pin_delay(attempts: u32) -> Duration {
    if attempts == 0 {
        return Duration::ZERO;
    }

    let s = 1u64
        .checked_shl(attempts - 1)
        .unwrap_or(u64::MAX)
        .min(MAX_PIN_DELAY_S);

    Duration::from_secs(s)
}

/// Decode position symbols to a PIN via the provided matrix
pub fn matrix_decode(matrix: &PinMatrix, encoded: &str) -> Result<Zeroizing<String>, Error> {
    if encoded.is_empty() || encoded.len() > MAX_PIN_LEN {
        return Err(Error::SyntaxError);
    }

    let mut pin = Zeroizing::new(String::with_capacity(encoded.len()));

    for c in encoded.chars() {
        let p = match c {
            '1'..='9' => c as usize - '1' as usize,
            _ => return Err(Error::SyntaxError),
        };
        pin.push((b'0' + matrix[p]) as char);
    }

    Ok(pin)
}

/// Encode a PIN to position symbols via the provided matrix (inverse of [matrix_decode])
///
/// Returns `None` for digits not present in the matrix.
pub fn matrix_encode(matrix: &PinMatrix, pin: &str) -> Option<String> {
    pin.chars()
        .map(|c| {
            let d = c.to_digit(10)? as u8;
            let i = matrix.iter().position(|m| *m == d)?;
            Some((b'1' + i as u8) as char)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use rand::{rngs::OsRng, Rng};

    use super::*;
    use crate::engine::{test::NullDriver, Action};

    fn random_matrix() -> PinMatrix {
        let mut m: PinMatrix = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        m.shuffle(&mut OsRng);
        m
    }

    #[test]
    fn encode_decode_pins() {
        for _ in 0..256 {
            let m = random_matrix();

            let n = OsRng.gen_range(1..=MAX_PIN_LEN);
            let pin: String = (0..n)
                .map(|_| (b'0' + OsRng.gen_range(1..=9u8)) as char)
                .collect();

            let encoded = matrix_encode(&m, &pin).unwrap();
            assert_eq!(matrix_decode(&m, &encoded).unwrap().as_str(), pin);
        }
    }

    #[test]
    fn decode_positions() {
        let m = [9, 8, 7, 6, 5, 4, 3, 2, 1];
        assert_eq!(matrix_decode(&m, "19").unwrap().as_str(), "91");
        assert_eq!(matrix_encode(&m, "91").unwrap(), "19");
        assert_eq!(matrix_encode(&m, "0"), None);
    }

    #[test]
    fn decode_syntax_errors() {
        let m = random_matrix();

        for p in ["", "0", "12a", "1234567891", " 1", "١"] {
            assert!(
                matches!(matrix_decode(&m, p), Err(Error::SyntaxError)),
                "expected syntax error for '{p}'"
            );
        }
    }

    #[test]
    fn backoff_delays() {
        assert_eq!(pin_delay(0), Duration::ZERO);
        assert_eq!(pin_delay(1), Duration::from_secs(1));
        assert_eq!(pin_delay(2), Duration::from_secs(2));
        assert_eq!(pin_delay(5), Duration::from_secs(16));
        assert_eq!(pin_delay(12), Duration::from_secs(MAX_PIN_DELAY_S));
        assert_eq!(pin_delay(u32::MAX), Duration::from_secs(MAX_PIN_DELAY_S));

        for i in 0..100 {
            assert!(pin_delay(i) <= pin_delay(i + 1));
        }
    }

    #[test]
    fn challenges_use_fresh_matrices() {
        let mut d = NullDriver::default();
        let mut g = PinGate::new();

        let mut matches = 0;
        for _ in 0..16 {
            let a = g.challenge(&mut d, &mut OsRng, PinMode::PassThrough, Continuation::StorePin);
            let b = g.challenge(&mut d, &mut OsRng, PinMode::PassThrough, Continuation::StorePin);
            if a == b {
                matches += 1;
            }
        }

        // Expected 1/9! per pair
        assert!(matches <= 1);
    }

    #[test]
    fn verify_stored() {
        let mut d = NullDriver::default();
        d.pin = Some("1234".to_string());
        d.attempts = 2;

        let mut g = PinGate::new();

        let m = g.challenge(
            &mut d,
            &mut OsRng,
            PinMode::VerifyStored,
            Continuation::Run(Action::ChangePin),
        );

        let r = g.submit(&mut d, &matrix_encode(&m, "1234").unwrap()).unwrap();
        assert_eq!(r.continuation, Continuation::Run(Action::ChangePin));
        assert_eq!(d.attempts, 0);
        assert!(d.delays.is_empty());
        assert!(!g.is_waiting());
    }

    #[test]
    fn verify_stored_mismatch() {
        let mut d = NullDriver::default();
        d.pin = Some("1234".to_string());

        let mut g = PinGate::new();

        for i in 1..=3 {
            let m = g.challenge(&mut d, &mut OsRng, PinMode::VerifyStored, Continuation::StorePin);

            let r = g.submit(&mut d, &matrix_encode(&m, "4321").unwrap());
            assert!(matches!(r, Err(Error::PinInvalid)));
            assert_eq!(d.attempts, i);
            assert!(!g.is_waiting());
        }

        assert_eq!(
            d.delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn verify_stored_prefix_mismatch() {
        let mut d = NullDriver::default();
        d.pin = Some("1234".to_string());

        let mut g = PinGate::new();

        for p in ["123", "12345", "4"] {
            let m = g.challenge(&mut d, &mut OsRng, PinMode::VerifyStored, Continuation::StorePin);

            let r = g.submit(&mut d, &matrix_encode(&m, p).unwrap());
            assert!(matches!(r, Err(Error::PinInvalid)), "expected mismatch for '{p}'");
        }

        assert_eq!(d.attempts, 3);
    }

    #[test]
    fn verify_stored_unpersisted_attempts() {
        let mut d = NullDriver::default();
        d.pin = Some("1234".to_string());
        d.readonly = true;

        let mut g = PinGate::new();

        // Mismatch still backs off, then reports the storage fault
        let m = g.challenge(&mut d, &mut OsRng, PinMode::VerifyStored, Continuation::StorePin);
        let r = g.submit(&mut d, &matrix_encode(&m, "4321").unwrap());
        assert!(matches!(r, Err(Error::Other(_))));
        assert_eq!(d.delays, vec![Duration::from_secs(1)]);

        // A correct PIN is not accepted where the counter cannot be reset
        let m = g.challenge(&mut d, &mut OsRng, PinMode::VerifyStored, Continuation::StorePin);
        let r = g.submit(&mut d, &matrix_encode(&m, "1234").unwrap());
        assert!(matches!(r, Err(Error::Other(_))));
        assert!(!g.is_waiting());
    }

    #[test]
    fn pass_through() {
        let mut d = NullDriver::default();
        let mut g = PinGate::new();

        let m = g.challenge(&mut d, &mut OsRng, PinMode::PassThrough, Continuation::StorePin);
        assert_eq!(g.mode(), Some(PinMode::PassThrough));

        let r = g.submit(&mut d, &matrix_encode(&m, "9999").unwrap()).unwrap();
        assert_eq!(r.pin.as_str(), "9999");
        assert_eq!(r.continuation, Continuation::StorePin);

        // Single use
        assert!(matches!(g.submit(&mut d, "1"), Err(Error::UnexpectedMessage)));
    }
}
