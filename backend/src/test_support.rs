//! Test utilities for the backend crate.
//!
//! Shared helpers for unit tests: a controllable clock and builders for
//! accounts that most service and handler tests need.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Email, FullName, Role, User, UserDraft, UserId};

/// Fixed instant used by tests that need deterministic timestamps.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Clock frozen at [`fixture_timestamp`].
pub fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(MutableClock::new(fixture_timestamp()))
}

/// Build a valid account with the given role.
///
/// Municipality accounts are placed in Kathmandu ward 1.
pub fn user_with_role(role: Role, email: &str) -> User {
    let staff = role == Role::Municipality;
    User::new(UserDraft {
        id: UserId::random(),
        full_name: FullName::new("Test Person").expect("fixture name"),
        email: Email::new(email).expect("fixture email"),
        role,
        verified: role != Role::User,
        municipality: staff.then(|| "Kathmandu".to_owned()),
        ward: staff.then(|| "1".to_owned()),
        phone: None,
        profile_picture: None,
        citizenship_document: None,
        created_at: fixture_timestamp(),
    })
    .expect("fixture user")
}
