use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Duration, Utc};

pub const CODE_LENGTH: usize = 6;
pub const MAX_ATTEMPTS: u8 = 3;
const CODE_TTL_MINUTES: i64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Verification code not found or expired, request a new one")]
    NotFound,
    #[error("Verification code has expired, request a new one")]
    Expired,
    #[error("Too many failed attempts, request a new verification code")]
    TooManyAttempts,
    #[error("Incorrect verification code, {attempts_remaining} attempts remaining")]
    CodeMismatch { attempts_remaining: u8 },
}

#[derive(Clone, Debug)]
struct Challenge {
    code: String,
    expires_at: DateTime<Utc>,
    attempts: u8,
}

/// In-memory store of pending verification challenges, one per email.
///
/// Challenges do not survive a restart, and a multi-instance deployment
/// needs a shared store instead of this per-process map.
#[derive(Clone)]
pub struct CodeStore {
    challenges: Arc<Mutex<HashMap<String, Challenge>>>,
    ttl: Duration,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(CODE_TTL_MINUTES))
    }

    fn with_ttl(ttl: Duration) -> Self {
        Self {
            challenges: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Issues a fresh code for `email`, silently invalidating any
    /// previously stored challenge for the same address.
    pub fn issue(&self, email: &str) -> String {
        let code = generate_code();
        let challenge = Challenge {
            code: code.clone(),
            expires_at: Utc::now() + self.ttl,
            attempts: 0,
        };
        self.lock().insert(email.to_owned(), challenge);
        code
    }

    /// Judges `code` against the stored challenge for `email`.
    ///
    /// Expiry and the attempt limit are checked before code equality, for
    /// login and registration alike. Every terminal outcome (match, expiry,
    /// exhaustion) consumes the challenge; only a plain mismatch below the
    /// limit leaves it in place with its attempt counter bumped.
    pub fn verify(&self, email: &str, code: &str) -> Result<(), VerifyError> {
        let mut challenges = self.lock();
        let outcome = match challenges.get_mut(email) {
            None => return Err(VerifyError::NotFound),
            Some(challenge) if Utc::now() > challenge.expires_at => Err(VerifyError::Expired),
            Some(challenge) if challenge.attempts >= MAX_ATTEMPTS => {
                Err(VerifyError::TooManyAttempts)
            }
            Some(challenge) if challenge.code != code => {
                challenge.attempts += 1;
                if challenge.attempts >= MAX_ATTEMPTS {
                    Err(VerifyError::TooManyAttempts)
                } else {
                    return Err(VerifyError::CodeMismatch {
                        attempts_remaining: MAX_ATTEMPTS - challenge.attempts,
                    });
                }
            }
            Some(_) => Ok(()),
        };
        challenges.remove(email);
        outcome
    }

    /// Removes a pending challenge, e.g. when the code could not be
    /// delivered and must not stay usable.
    pub fn revoke(&self, email: &str) {
        self.lock().remove(email);
    }

    /// Drops every expired challenge; returns how many were removed.
    /// Called periodically so that abandoned challenges do not pile up
    /// between accesses.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut challenges = self.lock();
        let before = challenges.len();
        challenges.retain(|_, challenge| challenge.expires_at >= now);
        before - challenges.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Challenge>> {
        self.challenges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_code() -> String {
    use rand::{thread_rng, Rng};
    let mut rng = thread_rng();
    std::iter::repeat_with(|| rng.gen_range(0u8..10))
        .take(CODE_LENGTH)
        .map(|digit| char::from(b'0' + digit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrong_code(code: &str) -> String {
        if code == "000000" {
            "111111".into()
        } else {
            "000000".into()
        }
    }

    #[test]
    fn issued_codes_are_six_digits() {
        let store = CodeStore::new();
        for _ in 0..100 {
            let code = store.issue("a@x.com");
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn a_correct_code_verifies_exactly_once() {
        let store = CodeStore::new();
        let code = store.issue("a@x.com");

        assert!(store.verify("a@x.com", &code).is_ok());
        assert!(matches!(
            store.verify("a@x.com", &code),
            Err(VerifyError::NotFound)
        ));
    }

    #[test]
    fn verifying_an_unknown_email_fails_with_not_found() {
        let store = CodeStore::new();
        assert!(matches!(
            store.verify("nobody@x.com", "123456"),
            Err(VerifyError::NotFound)
        ));
    }

    #[test]
    fn reissuing_overwrites_the_previous_challenge() {
        let store = CodeStore::new();
        let old_code = store.issue("a@x.com");
        let new_code = store.issue("a@x.com");

        if old_code != new_code {
            assert!(matches!(
                store.verify("a@x.com", &old_code),
                Err(VerifyError::CodeMismatch { .. })
            ));
        }
        assert!(store.verify("a@x.com", &new_code).is_ok());
    }

    #[test]
    fn mismatches_count_down_then_exhaust_the_challenge() {
        let store = CodeStore::new();
        let code = store.issue("a@x.com");
        let wrong = wrong_code(&code);

        match store.verify("a@x.com", &wrong) {
            Err(VerifyError::CodeMismatch { attempts_remaining }) => {
                assert_eq!(attempts_remaining, 2)
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }
        match store.verify("a@x.com", &wrong) {
            Err(VerifyError::CodeMismatch { attempts_remaining }) => {
                assert_eq!(attempts_remaining, 1)
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }
        assert!(matches!(
            store.verify("a@x.com", &wrong),
            Err(VerifyError::TooManyAttempts)
        ));
        // The challenge is consumed; even the right code is now useless.
        assert!(matches!(
            store.verify("a@x.com", &code),
            Err(VerifyError::NotFound)
        ));
    }

    #[test]
    fn mismatch_error_messages_carry_the_remaining_count() {
        let store = CodeStore::new();
        let code = store.issue("a@x.com");
        let wrong = wrong_code(&code);

        let message = store.verify("a@x.com", &wrong).unwrap_err().to_string();
        assert!(message.contains("2 attempts remaining"));
        let message = store.verify("a@x.com", &wrong).unwrap_err().to_string();
        assert!(message.contains("1 attempts remaining"));
    }

    #[test]
    fn an_expired_challenge_fails_regardless_of_code_correctness() {
        let store = CodeStore::with_ttl(Duration::zero());
        let code = store.issue("a@x.com");

        assert!(matches!(
            store.verify("a@x.com", &code),
            Err(VerifyError::Expired)
        ));
        // Expiry consumed the challenge.
        assert!(matches!(
            store.verify("a@x.com", &code),
            Err(VerifyError::NotFound)
        ));
    }

    #[test]
    fn revoked_challenges_no_longer_verify() {
        let store = CodeStore::new();
        let code = store.issue("a@x.com");

        store.revoke("a@x.com");
        assert!(matches!(
            store.verify("a@x.com", &code),
            Err(VerifyError::NotFound)
        ));
    }

    #[test]
    fn purge_removes_only_expired_challenges() {
        let expired = CodeStore::with_ttl(Duration::zero());
        expired.issue("a@x.com");
        assert_eq!(expired.purge_expired(), 1);

        let live = CodeStore::new();
        let code = live.issue("b@x.com");
        assert_eq!(live.purge_expired(), 0);
        assert!(live.verify("b@x.com", &code).is_ok());
    }
}
