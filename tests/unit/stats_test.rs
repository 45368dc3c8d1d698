//! Tests for stats sinks

use load_stagger::core::{InMemoryStatsSink, ItemId, StatsAction, StatsSink, WorkItem};

#[test]
fn test_in_memory_sink_records_dispatches() {
    let sink = InMemoryStatsSink::new(10);

    sink.on_will_dispatch(&WorkItem::new(1), false);
    sink.on_will_dispatch(&WorkItem::new(2), true);
    sink.on_item_deferred(&WorkItem::new(3));

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[1].action,
        StatsAction::Dispatched {
            due_to_timeout: true
        }
    );
    assert_eq!(sink.timeout_dispatches(), 1);
    assert_eq!(sink.deferred(), vec![ItemId(3)]);
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let sink = InMemoryStatsSink::new(0);
    sink.on_item_deferred(&WorkItem::new(1));
    assert!(sink.events().is_empty());
}
