use std::sync::{
    atomic::{AtomicU8, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use bitflags::bitflags;

use crate::io::Streams;

bitflags! {
    pub(crate) struct Lifecycle: u8 {
        const STARTED = 1 << 0;
        const IN_PROGRESS = 1 << 1;
        const REQUEST_ENDED = 1 << 2;
        const ERROR_RECEIVED = 1 << 3;
        const FINAL_BODY_RECEIVED = 1 << 4;
        const CLOSED = 1 << 5;
    }
}

/// State reachable from both the owning thread and an `AbortHandle`.
///
/// Flags are written by the owner, except for `CLOSED`, which an abort may set at any time.
/// The mutex is held only while an abort stops both buffers.
pub(crate) struct Shared {
    flags: AtomicU8,
    streams: Mutex<Streams>,
}

impl Shared {
    pub fn new(streams: Streams) -> Self {
        Shared {
            flags: AtomicU8::new(Lifecycle::empty().bits()),
            streams: Mutex::new(streams),
        }
    }

    pub fn flags(&self) -> Lifecycle {
        Lifecycle::from_bits_truncate(self.flags.load(Ordering::SeqCst))
    }

    pub fn contains(&self, flags: Lifecycle) -> bool {
        self.flags().contains(flags)
    }

    pub fn insert(&self, flags: Lifecycle) {
        self.flags.fetch_or(flags.bits(), Ordering::SeqCst);
    }

    pub fn remove(&self, flags: Lifecycle) {
        self.flags.fetch_and(!flags.bits(), Ordering::SeqCst);
    }

    /// Clears `flags`, returning whether all of them were set before.
    pub fn take(&self, flags: Lifecycle) -> bool {
        let previous = self.flags.fetch_and(!flags.bits(), Ordering::SeqCst);
        Lifecycle::from_bits_truncate(previous).contains(flags)
    }

    pub fn streams(&self) -> MutexGuard<'_, Streams> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
