//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use turni::db::{LocalRepository, RosterSeed};
use turni::models::{Role, ShiftGroup, Worker};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Store variables read by the repository factory.
pub const STORE_ENV_VARS: [&str; 6] = [
    "REPOSITORY_TYPE",
    "SUPABASE_URL",
    "VITE_SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "VITE_SUPABASE_ANON_KEY",
    "SUPABASE_TIMEOUT_SEC",
];

/// Runs `f` with environment variables temporarily modified.
///
/// Every variable in [`STORE_ENV_VARS`] is cleared first, then `changes` are
/// applied. Access is serialized and the previous values come back on drop,
/// unwinding included.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_store_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut all: Vec<(&str, Option<&str>)> =
        STORE_ENV_VARS.iter().map(|name| (*name, None)).collect();
    all.extend_from_slice(changes);

    let _guard = ScopedEnv::new(&all);
    f()
}

/// Two roles and one worker per group, the smallest roster worth editing.
pub fn sample_seed() -> RosterSeed {
    RosterSeed {
        roles: vec![Role::new(1, "CF"), Role::new(2, "BART")],
        workers: vec![
            Worker::new(10, "Alice", ShiftGroup::A),
            Worker::new(11, "Bob", ShiftGroup::A),
            Worker::new(20, "Carla", ShiftGroup::B),
            Worker::new(30, "Dario", ShiftGroup::C),
        ],
    }
}

pub fn seeded_repository() -> LocalRepository {
    LocalRepository::with_seed(sample_seed())
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
