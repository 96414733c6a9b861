use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::{CalendarEvent, VenueId};

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for per-venue calendar changes.
pub struct NotifyHub {
    channels: DashMap<VenueId, broadcast::Sender<CalendarEvent>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to changes of a venue's calendar. Creates the channel if needed.
    pub fn subscribe(&self, venue_id: VenueId) -> broadcast::Receiver<CalendarEvent> {
        let sender = self
            .channels
            .entry(venue_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, venue_id: VenueId, event: &CalendarEvent) {
        if let Some(sender) = self.channels.get(&venue_id) {
            let _ = sender.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotKey;

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = NotifyHub::new();
        let mut rx = hub.subscribe(1);

        let event = CalendarEvent::SlotReserved {
            venue_id: 1,
            slot: SlotKey(2_403_011),
            booking_id: 7,
        };
        hub.send(1, &event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn send_without_subscribers_is_noop() {
        let hub = NotifyHub::new();
        hub.send(
            3,
            &CalendarEvent::SlotReleased {
                venue_id: 3,
                slot: SlotKey(2_403_012),
                booking_id: 1,
            },
        );
    }

    #[tokio::test]
    async fn subscribers_of_other_venues_see_nothing() {
        let hub = NotifyHub::new();
        let mut other = hub.subscribe(2);
        let _ = hub.subscribe(1);
        hub.send(
            1,
            &CalendarEvent::SlotReserved {
                venue_id: 1,
                slot: SlotKey(2_403_011),
                booking_id: 1,
            },
        );
        assert!(other.try_recv().is_err());
    }
}
