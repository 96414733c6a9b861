use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use venuecal::config::EngineConfig;
use venuecal::engine::{Engine, EngineError};
use venuecal::model::*;
use venuecal::notify::NotifyHub;

// ── Test infrastructure ──────────────────────────────────────

fn start_engine(horizon_days: u32) -> Arc<Engine> {
    let config = EngineConfig::default()
        .with_horizon_days(horizon_days)
        .with_start_date(NaiveDate::from_ymd_opt(2020, 9, 15).unwrap());
    Arc::new(Engine::new(config, Arc::new(NotifyHub::new())))
}

async fn seed(engine: &Engine) -> Vec<VenueId> {
    let venues = [
        ("yio chu kang stadium", "Stadium", "East", 1235, "fitness corner"),
        ("LT123", "Hall", "North", 123, "boring"),
        ("Room151", "Room", "South", 50, "for lessons"),
    ];
    let mut ids = Vec::new();
    for (name, kind, location, capacity, description) in venues {
        ids.push(
            engine
                .add_venue(NewVenue {
                    name: name.into(),
                    kind: kind.into(),
                    location: location.into(),
                    capacity,
                    description: description.into(),
                })
                .await
                .unwrap(),
        );
    }
    ids
}

async fn recv(rx: &mut tokio::sync::broadcast::Receiver<CalendarEvent>) -> CalendarEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

// ── Tests ────────────────────────────────────────────────────

#[tokio::test]
async fn search_then_book_then_cancel() {
    let engine = start_engine(14);
    let ids = seed(&engine).await;

    assert_eq!(engine.capacity_bounds().await.unwrap(), (50, 1235));
    assert_eq!(engine.kind_list().await, vec!["Hall", "Room", "Stadium"]);

    let search = engine
        .filter_venues(&VenueQuery {
            location: CategoryFilter::parse("All"),
            kind: CategoryFilter::parse("All"),
            cap_min: 100,
            cap_max: 2000,
        })
        .await;
    assert_eq!(search.order, vec![ids[0], ids[1]]);

    let lt = engine.venue_id_by_name("LT123").await.unwrap();
    let view = engine.availability(lt, None).await.unwrap();
    assert_eq!(view.dates.len(), 14);
    assert_eq!(view.dates[0], DateKey(200_915));
    assert_eq!(view.count(SlotStatus::Available), 42);

    let mut rx = engine.notify.subscribe(lt);
    let slot = SlotKey::new(DateKey(200_916), Period::Afternoon);
    let booking_id = engine.reserve(lt, slot, "alice").await.unwrap();
    assert_eq!(
        recv(&mut rx).await,
        CalendarEvent::SlotReserved { venue_id: lt, slot, booking_id }
    );

    let groups = engine.bookings_for_user("alice").await;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].venue.name, "LT123");
    assert_eq!(groups[0].bookings[0].slot, slot);

    let cancelled = engine.cancel_booking(booking_id, "alice").await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(
        recv(&mut rx).await,
        CalendarEvent::SlotReleased { venue_id: lt, slot, booking_id }
    );
    assert!(engine.bookings_for_user("alice").await.is_empty());
    assert_eq!(engine.lookup_booking(booking_id).unwrap().status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn windowed_availability_view_serializes() {
    let engine = start_engine(3);
    let ids = seed(&engine).await;
    let slot = SlotKey::new(DateKey(200_915), Period::Morning);
    engine.reserve(ids[2], slot, "bob").await.unwrap();

    let window = DateWindow::new(DateKey(200_915), DateKey(200_915));
    let view = engine.availability(ids[2], Some(window)).await.unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["dates"], serde_json::json!([200915]));
    assert_eq!(json["slots"]["200915"]["Morning"], "UNAVAILABLE");
    assert_eq!(json["slots"]["200915"]["Evening"], "AVAILABLE");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_users_on_other_venues_do_not_interfere() {
    let engine = start_engine(14);
    let ids = seed(&engine).await;
    let slot = SlotKey::new(DateKey(200_920), Period::Evening);

    let handles: Vec<_> = ids
        .iter()
        .flat_map(|&venue_id| {
            let engine = engine.clone();
            (0..4).map(move |u| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.reserve(venue_id, slot, &format!("u{u}")).await })
            })
        })
        .collect();
    let results = futures::future::join_all(handles).await;

    let winners = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    assert_eq!(winners, ids.len());
    for r in results {
        match r.unwrap() {
            Ok(_) | Err(EngineError::SlotNotAvailable { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    for &venue_id in &ids {
        assert!(engine.booking_at(venue_id, slot).await.unwrap().is_some());
    }
}
