//! Stream client integration tests
//!
//! Exercises call correlation, subscription lifecycle and transport
//! termination over an in-process duplex transport.

mod common;

use common::pair;
use serde_json::json;
use tether_client::{Client, StreamClient};
use tether_core::{Envelope, Error, Id, RpcError};

fn connected_client() -> (StreamClient, common::Remote) {
    let (transport, remote) = pair();
    let client = StreamClient::new(transport);
    client.connect().unwrap();
    (client, remote)
}

#[tokio::test]
async fn request_before_connect_fails() {
    let (transport, _remote) = pair();
    let client = StreamClient::new(transport);

    let err = client.request("status", None).await.unwrap_err();
    assert_eq!(err, Error::NotConnected);
}

#[tokio::test]
async fn connect_twice_is_a_no_op() {
    let (client, _remote) = connected_client();
    assert!(client.is_connected());
    client.connect().unwrap();
    assert!(client.is_connected());
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn responses_correlate_out_of_order() {
    let (client, mut remote) = connected_client();

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.request("first", None).await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.request("second", None).await }
    });

    let req_a = remote.recv().await.unwrap();
    let req_b = remote.recv().await.unwrap();

    // Answer in reverse send order; correlation is by id, not ordering.
    remote.deliver(Envelope::success(
        req_b.id.clone().unwrap(),
        json!(req_b.method.unwrap()),
    ));
    remote.deliver(Envelope::success(
        req_a.id.clone().unwrap(),
        json!(req_a.method.unwrap()),
    ));

    let (first, second) = (first.await.unwrap(), second.await.unwrap());
    assert_eq!(first.unwrap(), json!("first"));
    assert_eq!(second.unwrap(), json!("second"));
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn request_error_carries_server_code() {
    let (client, mut remote) = connected_client();

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.request("denied", None).await }
    });

    let req = remote.recv().await.unwrap();
    remote.deliver(Envelope::failure(
        req.id.unwrap(),
        RpcError::new(-32001, None, Some(json!("quota"))),
    ));

    match pending.await.unwrap() {
        Err(Error::Rpc(e)) => {
            assert_eq!(e.code, -32001);
            assert_eq!(e.message, "Server error");
            assert_eq!(e.data, Some(json!("quota")));
        }
        other => panic!("expected rpc error, got {:?}", other),
    }
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn observe_yields_values_then_terminates_on_error() {
    let (client, mut remote) = connected_client();

    let mut sub = client.observe("sub", Some(json!({}))).await.unwrap();
    let req = remote.recv().await.unwrap();
    let id = req.id.unwrap();

    remote.deliver(Envelope::success(id.clone(), json!(1)));
    remote.deliver(Envelope::success(id.clone(), json!(2)));
    remote.deliver(Envelope::failure(id, RpcError::new(5, Some("done".into()), None)));

    assert_eq!(sub.next().await.unwrap().unwrap(), json!(1));
    assert_eq!(sub.next().await.unwrap().unwrap(), json!(2));
    match sub.next().await.unwrap() {
        Err(Error::Rpc(e)) => {
            assert_eq!(e.code, 5);
            assert_eq!(e.message, "done");
        }
        other => panic!("expected rpc error, got {:?}", other),
    }
    assert!(sub.next().await.is_none());
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn observe_cancel_is_idempotent() {
    let (client, mut remote) = connected_client();

    let sub = client.observe("watch", None).await.unwrap();
    let _ = remote.recv().await.unwrap();
    assert_eq!(client.pending_calls(), 1);

    sub.cancel();
    sub.cancel();
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn dropping_a_timed_out_request_leaks_no_pending_call() {
    let (client, mut remote) = connected_client();

    let outcome = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        client.request("slow", None),
    )
    .await;
    assert!(outcome.is_err());

    let _ = remote.recv().await.unwrap();
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn transport_failure_fails_all_pending_calls() {
    let (client, mut remote) = connected_client();

    let a = tokio::spawn({
        let client = client.clone();
        async move { client.request("a", None).await }
    });
    let b = tokio::spawn({
        let client = client.clone();
        async move { client.request("b", None).await }
    });
    remote.recv().await.unwrap();
    remote.recv().await.unwrap();

    remote.fail("wire cut");

    for outcome in [a.await.unwrap(), b.await.unwrap()] {
        match outcome {
            Err(Error::Transport(reason)) => assert_eq!(reason, "wire cut"),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }
    assert_eq!(client.pending_calls(), 0);
    assert_eq!(client.phase(), tether_client::Phase::Failed);
}

#[tokio::test]
async fn graceful_completion_completes_subscriptions() {
    let (client, mut remote) = connected_client();

    let mut sub = client.observe("feed", None).await.unwrap();
    let _ = remote.recv().await.unwrap();
    let mut events = client.subscribe().unwrap();

    remote.complete();

    assert!(sub.next().await.is_none());
    assert!(events.next().await.is_none());
    assert_eq!(client.pending_calls(), 0);
    assert_eq!(client.subscriber_count(), 0);
    assert_eq!(client.phase(), tether_client::Phase::Closed);
}

#[tokio::test]
async fn subscribers_receive_idless_envelopes() {
    let (client, remote) = connected_client();

    let mut events = client.subscribe().unwrap();
    remote.deliver(Envelope::notification("alert", Some(json!({"level": "hi"}))));

    let envelope = events.next().await.unwrap().unwrap();
    assert_eq!(envelope.method.as_deref(), Some("alert"));
    assert!(envelope.is_notification());

    events.unsubscribe();
    events.unsubscribe();
    assert_eq!(client.subscriber_count(), 0);
}

#[tokio::test]
async fn unmatched_response_is_dropped_not_fatal() {
    let (client, mut remote) = connected_client();

    remote.deliver(Envelope::success(Id::String("ghost".into()), json!(0)));

    // The client still works after discarding the stray response.
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.request("alive", None).await }
    });
    let req = remote.recv().await.unwrap();
    remote.deliver(Envelope::success(req.id.unwrap(), json!(true)));
    assert_eq!(pending.await.unwrap().unwrap(), json!(true));
}

#[tokio::test]
async fn notify_sends_without_id() {
    let (client, mut remote) = connected_client();

    client.notify("ping", Some(json!({"seq": 1}))).await.unwrap();

    let sent = remote.recv().await.unwrap();
    assert!(sent.is_notification());
    assert_eq!(sent.method.as_deref(), Some("ping"));
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn subscribe_before_connect_fails() {
    let (transport, _remote) = pair();
    let client = StreamClient::new(transport);

    assert!(matches!(client.subscribe(), Err(Error::NotConnected)));
    assert!(client.can_subscribe());
}

#[tokio::test]
async fn disconnect_round_trips_through_the_transport() {
    let (client, _remote) = connected_client();

    client.disconnect().await;

    // Completion arrives through the receive loop.
    let mut waited = 0;
    while client.phase() != tether_client::Phase::Closed && waited < 100 {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        waited += 1;
    }
    assert_eq!(client.phase(), tether_client::Phase::Closed);
}
