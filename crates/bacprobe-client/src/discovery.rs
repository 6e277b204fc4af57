use bacprobe_core::types::ObjectId;
use bacprobe_datalink::DataLinkAddress;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

use crate::ClientError;

/// A device that answered a Who-Is during a discovery window.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiscoveredDevice {
    /// Identity from the I-Am payload, `None` when it could not be decoded.
    pub device_id: Option<ObjectId>,
    pub address: DataLinkAddress,
    pub first_seen: SystemTime,
}

#[derive(Debug)]
enum State {
    Idle,
    Collecting {
        generation: u64,
        deadline: Instant,
        devices: Vec<DiscoveredDevice>,
        index: HashMap<DataLinkAddress, usize>,
    },
}

/// Collects I-Am announcements for the duration of one discovery window.
///
/// At most one window is open at a time. Nothing is retained between
/// windows.
#[derive(Debug)]
pub struct Aggregator {
    state: Mutex<State>,
    generations: AtomicU64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::Idle),
            generations: AtomicU64::new(0),
        }
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a collection window lasting `window`.
    ///
    /// Fails with [`ClientError::Busy`] while another window is open; the
    /// open window is not affected.
    pub fn begin(self: &Arc<Self>, window: Duration) -> Result<DiscoveryWindow, ClientError> {
        let mut state = self.lock();
        if matches!(*state, State::Collecting { .. }) {
            return Err(ClientError::Busy);
        }
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let deadline = Instant::now() + window;
        *state = State::Collecting {
            generation,
            deadline,
            devices: Vec::new(),
            index: HashMap::new(),
        };
        Ok(DiscoveryWindow {
            aggregator: Arc::clone(self),
            generation,
            deadline,
        })
    }

    /// Records an announcement from `address`.
    ///
    /// Returns `false` when no window is open or its deadline has passed.
    pub fn observe(&self, address: DataLinkAddress, device_id: Option<ObjectId>) -> bool {
        let mut state = self.lock();
        let State::Collecting {
            deadline,
            devices,
            index,
            ..
        } = &mut *state
        else {
            return false;
        };
        if Instant::now() > *deadline {
            return false;
        }
        match index.get(&address) {
            Some(&i) => devices[i].device_id = device_id,
            None => {
                index.insert(address, devices.len());
                devices.push(DiscoveredDevice {
                    device_id,
                    address,
                    first_seen: SystemTime::now(),
                });
            }
        }
        true
    }

    pub fn is_collecting(&self) -> bool {
        matches!(*self.lock(), State::Collecting { .. })
    }

    fn finish(&self, generation: u64) -> Vec<DiscoveredDevice> {
        let mut state = self.lock();
        let current = matches!(
            &*state,
            State::Collecting { generation: g, .. } if *g == generation
        );
        if !current {
            return Vec::new();
        }
        match std::mem::replace(&mut *state, State::Idle) {
            State::Collecting { devices, .. } => devices,
            State::Idle => Vec::new(),
        }
    }
}

/// An open discovery window. Dropping it before [`collect`](Self::collect)
/// completes closes the window and discards what was gathered.
#[derive(Debug)]
pub struct DiscoveryWindow {
    aggregator: Arc<Aggregator>,
    generation: u64,
    deadline: Instant,
}

impl DiscoveryWindow {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Waits out the window and returns the devices seen, in first-seen
    /// order.
    pub async fn collect(self) -> Vec<DiscoveredDevice> {
        tokio::time::sleep_until(self.deadline).await;
        self.aggregator.finish(self.generation)
    }
}

impl Drop for DiscoveryWindow {
    fn drop(&mut self) {
        self.aggregator.finish(self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::Aggregator;
    use crate::ClientError;
    use bacprobe_core::types::{ObjectId, ObjectType};
    use bacprobe_datalink::DataLinkAddress;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    fn addr(s: &str) -> DataLinkAddress {
        DataLinkAddress::Ip(s.parse::<SocketAddr>().unwrap())
    }

    fn device(i: u32) -> Option<ObjectId> {
        Some(ObjectId::new(ObjectType::Device, i).unwrap())
    }

    #[test]
    fn idle_aggregator_ignores_announcements() {
        let aggregator = Aggregator::new();
        assert!(!aggregator.observe(addr("10.0.0.5:47808"), device(5)));
    }

    #[tokio::test]
    async fn last_writer_wins_and_order_is_first_seen() {
        let aggregator = Arc::new(Aggregator::new());
        let window = aggregator.begin(Duration::from_millis(50)).unwrap();
        assert!(aggregator.observe(addr("10.0.0.2:47808"), device(2)));
        assert!(aggregator.observe(addr("10.0.0.1:47808"), device(1)));
        assert!(aggregator.observe(addr("10.0.0.2:47808"), device(22)));

        let devices = window.collect().await;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].address, addr("10.0.0.2:47808"));
        assert_eq!(devices[0].device_id, device(22));
        assert_eq!(devices[1].device_id, device(1));
        assert!(!aggregator.is_collecting());
    }

    #[tokio::test]
    async fn second_begin_is_busy_and_leaves_window_intact() {
        let aggregator = Arc::new(Aggregator::new());
        let window = aggregator.begin(Duration::from_millis(50)).unwrap();
        aggregator.observe(addr("10.0.0.1:47808"), device(1));

        assert!(matches!(
            aggregator.begin(Duration::from_millis(50)),
            Err(ClientError::Busy)
        ));
        aggregator.observe(addr("10.0.0.3:47808"), device(3));

        let devices = window.collect().await;
        assert_eq!(devices.len(), 2);
        assert!(aggregator.begin(Duration::from_millis(10)).is_ok());
    }

    #[tokio::test]
    async fn dropped_window_resets_to_idle() {
        let aggregator = Arc::new(Aggregator::new());
        let window = aggregator.begin(Duration::from_secs(30)).unwrap();
        assert!(aggregator.is_collecting());
        drop(window);
        assert!(!aggregator.is_collecting());

        let next = aggregator.begin(Duration::from_millis(10)).unwrap();
        assert!(next.collect().await.is_empty());
    }

    #[tokio::test]
    async fn announcements_after_deadline_are_ignored() {
        let aggregator = Arc::new(Aggregator::new());
        let window = aggregator.begin(Duration::from_millis(10)).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!aggregator.observe(addr("10.0.0.9:47808"), device(9)));
        assert!(window.collect().await.is_empty());
    }
}
