//! Pending confirmed requests, keyed by invoke id.

use bacprobe_core::types::PropertyValue;
use bacprobe_datalink::DataLinkAddress;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::ClientError;

/// A response routed to the request that solicited it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Reply {
    SimpleAck,
    ComplexAck(PropertyValue),
    Error {
        service_choice: u8,
        error_class: Option<u32>,
        error_code: Option<u32>,
    },
    Reject {
        reason: u8,
    },
    Abort {
        reason: u8,
        server: bool,
    },
}

#[derive(Debug)]
struct PendingRequest {
    destination: DataLinkAddress,
    submitted: Instant,
    deadline: Instant,
    generation: u64,
    slot: oneshot::Sender<Reply>,
}

#[derive(Debug)]
struct Table {
    next_invoke_id: u8,
    generation: u64,
    pending: HashMap<u8, PendingRequest>,
}

impl Table {
    /// Next id after `next_invoke_id` that is not pending. Zero is never used.
    fn allocate(&mut self) -> Option<u8> {
        for _ in 0..u8::MAX {
            let id = self.next_invoke_id;
            self.next_invoke_id = match id.wrapping_add(1) {
                0 => 1,
                n => n,
            };
            if !self.pending.contains_key(&id) {
                return Some(id);
            }
        }
        None
    }
}

/// Matches responses to outstanding requests.
///
/// Each registered request owns its invoke id until it is resolved, its
/// handle is dropped, or a sweep finds it past its deadline, whichever comes
/// first. An id is therefore never resolved twice.
#[derive(Debug)]
pub struct Correlator {
    table: Mutex<Table>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self {
            table: Mutex::new(Table {
                next_invoke_id: 1,
                generation: 0,
                pending: HashMap::new(),
            }),
        }
    }
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserves an invoke id for a request to `destination`.
    ///
    /// Call this before sending so a fast response cannot arrive unmatched.
    pub fn register(
        self: &Arc<Self>,
        destination: DataLinkAddress,
        timeout: Duration,
    ) -> Result<PendingHandle, ClientError> {
        let (slot, rx) = oneshot::channel();
        let submitted = Instant::now();
        let deadline = submitted + timeout;

        let mut table = self.lock();
        let invoke_id = table.allocate().ok_or(ClientError::InvokeIdsExhausted)?;
        table.generation += 1;
        let generation = table.generation;
        table.pending.insert(
            invoke_id,
            PendingRequest {
                destination,
                submitted,
                deadline,
                generation,
                slot,
            },
        );
        drop(table);

        Ok(PendingHandle {
            invoke_id,
            generation,
            deadline,
            rx,
            correlator: Arc::clone(self),
        })
    }

    /// Delivers `reply` to the request registered under `invoke_id`.
    ///
    /// Returns `false`, leaving the table untouched, when no such request is
    /// pending or `source` is not the address the request was sent to.
    pub fn resolve(&self, invoke_id: u8, source: DataLinkAddress, reply: Reply) -> bool {
        let mut table = self.lock();
        match table.pending.get(&invoke_id) {
            None => {
                drop(table);
                log::debug!("dropping response for unknown invoke id {invoke_id} from {source}");
                return false;
            }
            Some(entry) if entry.destination != source => {
                let expected = entry.destination;
                drop(table);
                log::debug!(
                    "dropping response for invoke id {invoke_id} from {source}, expected {expected}"
                );
                return false;
            }
            Some(_) => {}
        }
        let Some(entry) = table.pending.remove(&invoke_id) else {
            return false;
        };
        drop(table);

        log::debug!(
            "invoke id {invoke_id} answered by {source} after {:?}",
            entry.submitted.elapsed()
        );
        // The waiter may have given up already; the entry is gone either way.
        let _ = entry.slot.send(reply);
        true
    }

    /// Drops every entry whose deadline has passed, returning how many.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut table = self.lock();
        let before = table.pending.len();
        table.pending.retain(|_, entry| entry.deadline > now);
        before - table.pending.len()
    }

    /// Fails every outstanding request with "no response".
    pub fn clear(&self) {
        self.lock().pending.clear();
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_pending(&self, invoke_id: u8) -> bool {
        self.lock().pending.contains_key(&invoke_id)
    }

    fn release(&self, invoke_id: u8, generation: u64) {
        let mut table = self.lock();
        if table
            .pending
            .get(&invoke_id)
            .is_some_and(|entry| entry.generation == generation)
        {
            table.pending.remove(&invoke_id);
        }
    }
}

/// Caller side of a registered request. Dropping it releases the invoke id.
#[derive(Debug)]
pub struct PendingHandle {
    invoke_id: u8,
    generation: u64,
    deadline: Instant,
    rx: oneshot::Receiver<Reply>,
    correlator: Arc<Correlator>,
}

impl PendingHandle {
    pub fn invoke_id(&self) -> u8 {
        self.invoke_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Waits for the reply, or `None` once the deadline passes or the entry
    /// is swept.
    pub async fn wait(mut self) -> Option<Reply> {
        match tokio::time::timeout_at(self.deadline, &mut self.rx).await {
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

impl Drop for PendingHandle {
    fn drop(&mut self) {
        self.correlator.release(self.invoke_id, self.generation);
    }
}
