//! Cross-thread dispatch and delayed replies.

use std::{sync::mpsc, thread, time::Duration};
use tether::{
    BridgeConfig, EventBridge, ReplyError, Tag, json,
    testing::{MockNode, MockProvider, MockScreen, RecordingReceiver, ReplyMode},
};

mod common;
use common::{Replies, payload};

fn provider_for(receiver: &RecordingReceiver) -> MockProvider {
    MockProvider::new(vec![MockScreen::with_receiver(
        MockNode::container(vec![MockNode::root(7)]),
        receiver.arc(),
    )])
}

#[test]
fn test_dispatch_from_many_threads_reaches_main_loop() {
    let receiver = RecordingReceiver::new(&[]);
    let (bridge, mut main_loop) = EventBridge::new(provider_for(&receiver), BridgeConfig::default());

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let bridge = bridge.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    bridge.dispatch(Tag::new(7), format!("w{n}-{i}"), payload(json!({})));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(receiver.count(), 0);
    assert_eq!(main_loop.run_pending(), 40);
    assert_eq!(receiver.count(), 40);
}

#[test]
fn test_per_thread_order_is_kept() {
    let receiver = RecordingReceiver::new(&[]);
    let (bridge, mut main_loop) = EventBridge::new(provider_for(&receiver), BridgeConfig::default());

    let worker = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            for i in 0..20 {
                bridge.dispatch(Tag::new(7), i.to_string(), payload(json!({})));
            }
        })
    };
    worker.join().unwrap();
    main_loop.run_pending();

    let expected: Vec<_> = (0..20).map(|i| i.to_string()).collect();
    assert_eq!(receiver.names(), expected);
}

#[test]
fn test_load_data_answered_later_from_another_thread() {
    let receiver = RecordingReceiver::new(&["LoadData"]).with_reply(ReplyMode::Hold);
    let (bridge, mut main_loop) = EventBridge::new(provider_for(&receiver), BridgeConfig::default());
    let (tx, rx) = mpsc::channel();

    bridge.dispatch_with_callback(Tag::new(7), "LoadData", payload(json!({"count": 3})), move |reply| {
        let _ = tx.send(reply);
    });
    main_loop.run_pending();
    assert!(rx.try_recv().is_err());

    let host = receiver.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        host.release_held()
    })
    .join()
    .unwrap();

    assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), Ok(json!(null)));
    assert_eq!(bridge.dispatcher().outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_request_round_trip_with_spawned_loop() {
    let receiver = RecordingReceiver::new(&["LoadData"])
        .with_reply(ReplyMode::Succeed(json!({"rows": ["a", "b"]})));
    let (bridge, main_loop) = EventBridge::new(provider_for(&receiver), BridgeConfig::default());
    let pump = tokio::spawn(main_loop.run());

    let reply = bridge.request(Tag::new(7), "LoadData", payload(json!({}))).await;
    assert_eq!(reply, Ok(json!({"rows": ["a", "b"]})));

    let missing = bridge.request(Tag::new(8), "LoadData", payload(json!({}))).await;
    assert_eq!(missing, Err(ReplyError::NoReceiver { tag: Tag::new(8) }));

    drop(bridge);
    pump.await.unwrap();
}

#[test]
fn test_dropping_main_loop_fails_later_requests() {
    let receiver = RecordingReceiver::new(&[]);
    let (bridge, main_loop) = EventBridge::new(provider_for(&receiver), BridgeConfig::default());
    let replies = Replies::new();
    drop(main_loop);

    assert!(!bridge.dispatcher().is_open());
    bridge.dispatch_with_callback(Tag::new(7), "LoadData", payload(json!({})), replies.sink());
    assert_eq!(replies.all(), vec![Err(ReplyError::Closed)]);
}
