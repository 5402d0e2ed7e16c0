// View controllers - the fetch/render state machine behind both screens
//
// Each controller is split into synchronous `begin_*` / `commit` steps so the
// async drivers can release the lock while the request is in flight.

pub mod detail;
pub mod listing;

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use detail::{DetailController, DetailView};
pub use listing::{ListingController, ListingView};

/// Handed out when a fetch starts; only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Generation counter guarding a controller against stale responses.
#[derive(Debug, Default)]
pub struct FetchGate {
    generation: u64,
}

impl FetchGate {
    pub fn issue(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// `idle -> loading -> {ready | failed}`, re-entering `loading` on every trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "lowercase")]
pub enum Navigation {
    Detail { id: String },
    Back,
}

pub(crate) fn lock<T>(cell: &Mutex<T>) -> MutexGuard<'_, T> {
    // Controller state stays consistent between begin and commit, so a
    // poisoned lock is still safe to use
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}
