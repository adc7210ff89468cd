//! Host -> tree broadcast behavior through the bridge handle.

use futures::{FutureExt, StreamExt};
use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};
use tether::{
    BridgeConfig, BroadcastEvent, EventBridge, Tag, json,
    testing::{MockNode, MockProvider, MockScreen, RecordingSubscriber},
};

mod common;
use common::payload;

fn two_tree_bridge() -> (EventBridge, MockProvider) {
    let provider = MockProvider::new(vec![MockScreen::new(MockNode::container(vec![
        MockNode::root(1),
        MockNode::container(vec![MockNode::root(2)]),
    ]))]);
    let (bridge, _main_loop) = EventBridge::new(provider.clone(), BridgeConfig::default());
    (bridge, provider)
}

#[test]
fn test_n_trees_get_n_distinct_tags() {
    let (bridge, _provider) = two_tree_bridge();
    let (subscription, mut rx) = bridge.broadcast().subscribe_stream();

    let screen = MockScreen::new(MockNode::container(vec![
        MockNode::root(10),
        MockNode::root(11),
        MockNode::root(12),
    ]));
    assert_eq!(bridge.emit_event_for_screen(&*screen, "Ping", payload(json!({}))), 3);

    let mut tags = Vec::new();
    while let Some(Some(event)) = rx.next().now_or_never() {
        assert_eq!(event.event_name, "Ping");
        tags.extend(event.tag);
    }
    assert_eq!(tags, vec![Tag::new(10), Tag::new(11), Tag::new(12)]);
    assert!(bridge.broadcast().unsubscribe(subscription));
}

#[test]
fn test_active_screen_emit_reaches_front_trees_only() {
    let (bridge, provider) = two_tree_bridge();
    provider.push_screen(MockScreen::new(MockNode::container(vec![MockNode::root(7)])));
    let (context, mut tree_loop) = bridge.tree_context();
    let back = RecordingSubscriber::new();
    let front = RecordingSubscriber::new();
    let _back = bridge.add_event_listener(Tag::new(1), &context, back.callback());
    let _front = bridge.add_event_listener(Tag::new(7), &context, front.callback());

    assert_eq!(bridge.emit_event_for_active_screen(&provider, "Resume", payload(json!({}))), 1);
    tree_loop.run_pending();

    assert_eq!(front.names(), vec!["Resume"]);
    assert!(back.names().is_empty());
}

#[test]
fn test_listener_only_sees_its_own_tree() {
    let (bridge, _provider) = two_tree_bridge();
    let (context, mut tree_loop) = bridge.tree_context();
    let first = RecordingSubscriber::new();
    let second = RecordingSubscriber::new();
    let _a = bridge.add_event_listener(Tag::new(1), &context, first.callback());
    let _b = bridge.add_event_listener(Tag::new(2), &context, second.callback());

    bridge.publish("OnlyFirst", payload(json!({"n": 1})), Some(Tag::new(1)));
    bridge.publish("Everyone", payload(json!({})), None);
    tree_loop.run_pending();

    assert_eq!(first.names(), vec!["OnlyFirst", "Everyone"]);
    assert_eq!(second.names(), vec!["Everyone"]);
    assert_eq!(first.received()[0].1, payload(json!({"n": 1})));
}

#[test]
fn test_subset_unsubscribe_stops_exactly_those() {
    let (bridge, _provider) = two_tree_bridge();
    let (context, mut tree_loop) = bridge.tree_context();
    let recorders: Vec<_> = (0..4).map(|_| RecordingSubscriber::new()).collect();
    let mut subscriptions: Vec<_> = recorders
        .iter()
        .map(|r| Some(bridge.add_event_listener(Tag::new(1), &context, r.callback())))
        .collect();

    for index in [1, 3] {
        if let Some(subscription) = subscriptions[index].take() {
            assert!(bridge.broadcast().unsubscribe(subscription));
        }
    }
    bridge.emit_event("Refresh", payload(json!({})));
    tree_loop.run_pending();

    let counts: Vec<_> = recorders.iter().map(|r| r.names().len()).collect();
    assert_eq!(counts, vec![1, 0, 1, 0]);
}

#[test]
fn test_listener_group_unmount_silences_tree() {
    let (bridge, _provider) = two_tree_bridge();
    let (context, mut tree_loop) = bridge.tree_context();
    let recorder = RecordingSubscriber::new();
    let mut group = bridge.listener_group(&context, Tag::new(2));
    group
        .register_event_listener(recorder.callback())
        .register_event_listener(recorder.callback());

    bridge.emit_event("Before", payload(json!({})));
    tree_loop.run_pending();
    assert_eq!(group.unmount(), 2);
    bridge.emit_event("After", payload(json!({})));
    tree_loop.run_pending();

    assert_eq!(recorder.names(), vec!["Before", "Before"]);
    assert!(!bridge.broadcast().table().is_initialized());
}

#[test]
fn test_bridges_sharing_a_table_share_subscribers() {
    let (first, _provider) = two_tree_bridge();
    let (second, _main_loop) = EventBridge::with_table(
        MockProvider::default(),
        BridgeConfig::default(),
        first.broadcast().table().clone(),
    );
    let (context, mut tree_loop) = first.tree_context();
    let recorder = RecordingSubscriber::new();
    let _subscription = first.add_event_listener(Tag::new(1), &context, recorder.callback());

    second.emit_event("FromSecond", payload(json!({})));
    tree_loop.run_pending();
    assert_eq!(recorder.names(), vec!["FromSecond"]);
}

#[test]
fn test_custom_topic_is_isolated() {
    let (bridge, _provider) = two_tree_bridge();
    let (other, _main_loop) = EventBridge::with_table(
        MockProvider::default(),
        BridgeConfig::default().with_topic("OtherTopic"),
        bridge.broadcast().table().clone(),
    );
    let (context, mut tree_loop) = bridge.tree_context();
    let recorder = RecordingSubscriber::new();
    let _subscription = bridge.add_event_listener(Tag::new(1), &context, recorder.callback());

    assert_eq!(other.emit_event("Hidden", payload(json!({}))), 0);
    assert_eq!(tree_loop.run_pending(), 0);
    assert!(recorder.names().is_empty());
}

#[test]
fn test_slow_tree_does_not_stall_background_publisher() {
    let (bridge, _provider) = two_tree_bridge();
    let (context, tree_loop) = bridge.tree_context();
    let (seen_tx, seen_rx) = mpsc::channel();
    let mut group = bridge.listener_group(&context, Tag::new(1));
    group.register_event_listener(move |name: &str, _: &tether::Payload| {
        thread::sleep(Duration::from_millis(300));
        let _ = seen_tx.send((name.to_string(), thread::current().id()));
    });
    drop(context);
    let tree_thread = thread::spawn(move || futures::executor::block_on(tree_loop.run()));

    let publisher = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            let started = Instant::now();
            bridge.emit_event("Refresh", payload(json!({})));
            (thread::current().id(), started.elapsed())
        })
    };
    let (publisher_id, blocked_for) = publisher.join().unwrap();
    assert!(blocked_for < Duration::from_millis(100), "emit_event waited {blocked_for:?}");

    let (name, handler_id) = seen_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name, "Refresh");
    assert_ne!(handler_id, publisher_id);

    group.unmount();
    drop(group);
    tree_thread.join().unwrap();
}

#[tokio::test]
async fn test_tree_loop_on_runtime() {
    let (bridge, _provider) = two_tree_bridge();
    let (context, tree_loop) = bridge.tree_context();
    let (tx, mut rx) = futures::channel::mpsc::unbounded();
    let subscription = bridge.add_event_listener(Tag::new(2), &context, move |name, _| {
        let _ = tx.unbounded_send(name.to_string());
    });
    drop(context);
    let worker = tokio::spawn(tree_loop.run());

    bridge.publish("Tick", payload(json!({"seq": 1})), Some(Tag::new(2)));
    assert_eq!(rx.next().await.as_deref(), Some("Tick"));

    bridge.broadcast().unsubscribe(subscription);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_stream_subscriber_on_runtime() {
    let (bridge, _provider) = two_tree_bridge();
    let (_subscription, mut rx) = bridge.broadcast().subscribe_stream();

    let publisher = bridge.clone();
    tokio::spawn(async move {
        publisher.publish("Tick", payload(json!({"seq": 1})), Some(Tag::new(2)));
    })
    .await
    .unwrap();

    let event: BroadcastEvent = rx.next().await.unwrap();
    assert!(event.is_for(Tag::new(2)));
    assert!(!event.is_for(Tag::new(1)));
}
