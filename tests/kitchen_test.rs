use kitchen_sim::display::KitchenEvent;
use kitchen_sim::kitchen::{DecayEvaluator, Kitchen, Placement, ShelfConfig};
use kitchen_sim::mock::{FixedExpiration, ManualClock, RecordingDisplay};
use kitchen_sim::model::{Order, Temperature};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn hot(name: impl Into<String>) -> Order {
    Order::new(name, Temperature::Hot, 20, 0.63, 0).unwrap()
}

/// Many tasks racing to place orders never overfill a shelf, and every order
/// lands in at most one place.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_placement_respects_capacity() {
    let display = Arc::new(RecordingDisplay::default());
    let kitchen = Arc::new(
        Kitchen::from_configs(
            vec![
                ShelfConfig::new("hot", [Temperature::Hot], 10, 1),
                ShelfConfig::new("overflow", Temperature::ALL, 5, 2),
            ],
            Arc::new(ManualClock::new(0)),
            Arc::new(FixedExpiration::at(1_000)),
            display.clone(),
        )
        .unwrap(),
    );

    let mut workers = Vec::new();
    for worker in 0..8 {
        let kitchen = kitchen.clone();
        workers.push(tokio::spawn(async move {
            (0..50)
                .map(|i| kitchen.process_order(hot(format!("w{worker}-{i}"))))
                .filter(|placement| matches!(placement, Placement::Placed { .. }))
                .count()
        }));
    }
    let mut placed = 0;
    for worker in workers {
        placed += worker.await.unwrap();
    }

    let snapshot = kitchen.snapshot();
    assert_eq!(placed, 15);
    assert_eq!(snapshot.shelf("hot").unwrap().count, 10);
    assert_eq!(snapshot.shelf("overflow").unwrap().count, 5);

    let events = display.events();
    assert_eq!(events.len(), 400);
    let names: HashSet<_> = events.iter().map(|e| e.order().to_string()).collect();
    assert_eq!(names.len(), 400, "an order was reported twice");
}

/// More couriers than orders: each order is handed out exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_couriers_share_orders() {
    let kitchen = Arc::new(
        Kitchen::from_configs(
            ShelfConfig::default_layout(),
            Arc::new(ManualClock::new(0)),
            Arc::new(FixedExpiration::at(1_000)),
            Arc::new(RecordingDisplay::default()),
        )
        .unwrap(),
    );
    for i in 0..20 {
        kitchen.process_order(hot(format!("order-{i}")));
    }

    let couriers: Vec<_> = (0..30)
        .map(|_| {
            let kitchen = kitchen.clone();
            tokio::spawn(async move { kitchen.pick_up_order(Duration::from_millis(200)).await })
        })
        .collect();

    let mut delivered = HashSet::new();
    let mut empty_handed = 0;
    for courier in couriers {
        match courier.await.unwrap() {
            Some(order) => assert!(delivered.insert(order.name.clone())),
            None => empty_handed += 1,
        }
    }
    assert_eq!(delivered.len(), 20);
    assert_eq!(empty_handed, 10);
    assert_eq!(kitchen.snapshot().total_count(), 0);
}

/// The overflow shelf doubles decay, so a spilled order spoils first.
#[tokio::test]
async fn test_overflow_orders_decay_faster() {
    let clock = Arc::new(ManualClock::new(0));
    let display = Arc::new(RecordingDisplay::default());
    let kitchen = Kitchen::from_configs(
        vec![
            ShelfConfig::new("hot", [Temperature::Hot], 1, 1),
            ShelfConfig::new("overflow", Temperature::ALL, 1, 2).with_decay_modifier(2.0),
        ],
        clock.clone(),
        Arc::new(DecayEvaluator),
        display.clone(),
    )
    .unwrap();

    kitchen.process_order(hot("on shelf"));
    assert_eq!(
        kitchen.process_order(hot("spilled")),
        Placement::Placed { shelf: "overflow".into() }
    );

    // hot lasts 13s, overflow 9s
    clock.set(10);
    let snapshot = kitchen.snapshot();
    assert_eq!(snapshot.shelf("overflow").unwrap().count, 0);
    assert_eq!(snapshot.shelf("hot").unwrap().count, 1);
    assert!(display.events().contains(&KitchenEvent::Spoiled {
        order: "spilled".into(),
        shelf: "overflow".into(),
    }));

    let picked = kitchen.pick_up_order(Duration::from_millis(10)).await.unwrap();
    assert_eq!(picked.name, "on shelf");
    let value = picked.picked_up().unwrap().value;
    assert!((value - 3.7).abs() < 1e-9, "value was {value}");

    assert!(kitchen.pick_up_order(Duration::from_millis(10)).await.is_none());
}
