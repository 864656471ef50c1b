//! Registry notifications
//!
//! Events go out once the change is visible to readers but before the next
//! mutation can start, so a subscriber that reacts to [`PairCreated`] by
//! querying the registry always finds the new pair, and events arrive in
//! commit order.

use crossbeam_channel::{unbounded, Receiver, Sender};
use pair_types::EthAddress;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Emitted once per successful pair creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCreated {
    pub token0: EthAddress,
    pub token1: EthAddress,
    pub pair: EthAddress,
    /// 0-based sequence index of the new pair
    pub index: u64,
    /// Discovery list length after insertion
    pub pair_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    PairCreated(PairCreated),
    FeeToSetterChanged {
        previous: EthAddress,
        current: EthAddress,
    },
}

/// Fan-out to any number of subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<RegistryEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// New unbounded receiver seeing every event published from now on
    pub fn subscribe(&self) -> Receiver<RegistryEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver to all live subscribers, dropping the disconnected ones
    pub fn publish(&self, event: RegistryEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(index: u64) -> RegistryEvent {
        RegistryEvent::PairCreated(PairCreated {
            token0: EthAddress::from_low_u64(1),
            token1: EthAddress::from_low_u64(2),
            pair: EthAddress::from_low_u64(3),
            index,
            pair_count: index + 1,
        })
    }

    #[test]
    fn test_every_subscriber_receives() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(created(0));
        assert_eq!(a.try_recv().unwrap(), created(0));
        assert_eq!(b.try_recv().unwrap(), created(0));
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.publish(created(0));
        let rx = bus.subscribe();
        bus.publish(created(1));
        assert_eq!(rx.try_recv().unwrap(), created(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(created(0));
        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
