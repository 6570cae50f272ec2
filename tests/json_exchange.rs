//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Integration tests for JSON-mode request/response exchange.
//!
//! These tests run two multiplexers over an in-memory connection pair and
//! verify:
//! - Round trips and failure propagation
//! - Concurrent fan-out with out-of-order replies
//! - Unexpected-reply notifications
//! - Error-mapper hooks

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use wiremux::codec::JsonCodec;
use wiremux::mux::{Dispatch, DispatchError, Multiplexer, MuxError, MuxEvent, MuxOptions, RoutingTable};
use wiremux::transport::memory;
use wiremux::transport::{Connection, Frame};

type JsonMux = Multiplexer<JsonCodec>;

/// Installs an env-filtered subscriber once, so `RUST_LOG=wiremux=debug`
/// shows the engine's tracing during a test run.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds a connected pair of JSON multiplexers; the peer runs `dispatch`.
fn mux_pair(
    dispatch: Dispatch<Value>,
    options: MuxOptions<Value>,
) -> (JsonMux, mpsc::Receiver<MuxEvent<Value>>, JsonMux) {
    init_tracing();
    let ((conn_a, inbound_a), (conn_b, inbound_b)) = memory::pair(64);

    let (peer, _peer_events) = Multiplexer::new(
        Arc::new(conn_b),
        inbound_b,
        JsonCodec::new(),
        dispatch,
        MuxOptions::default(),
    );
    let (mux, events) = Multiplexer::new(
        Arc::new(conn_a),
        inbound_a,
        JsonCodec::new(),
        Dispatch::Ignore,
        options,
    );
    (mux, events, peer)
}

fn echo_dispatch() -> Dispatch<Value> {
    Dispatch::function(|payload: Value| async move { Ok(payload) })
}

#[tokio::test]
async fn test_round_trip_resolves_with_the_echoed_payload() {
    let (mux, _events, _peer) = mux_pair(echo_dispatch(), MuxOptions::default());

    let payload = json!({ "type": "greet", "name": "ada", "tags": [1, 2, 3] });
    let reply = mux.request(payload.clone()).await.unwrap();
    assert_eq!(reply, payload);
}

#[tokio::test]
async fn test_failure_propagates_message_and_fields() {
    let routes = RoutingTable::new().route("fail", |_payload: Value| async move {
        Err(DispatchError::local("oh hey").with_field("code", json!(505)))
    });
    let (mux, _events, _peer) = mux_pair(Dispatch::Routes(routes), MuxOptions::default());

    let error = mux
        .request(json!({ "type": "fail" }))
        .await
        .expect_err("handler failure must fail the sender's future");

    let payload = error.remote_payload().expect("expected a remote failure");
    assert_eq!(payload["message"], "oh hey");
    assert_eq!(payload["code"], 505);
    assert!(payload.get("stack").is_some());
}

#[tokio::test]
async fn test_concurrent_fan_out_matches_each_reply_to_its_request() {
    // Replies complete with different delays, so they arrive out of order.
    let dispatch = Dispatch::function(|payload: Value| async move {
        let n = payload["n"].as_u64().unwrap_or(0);
        sleep(Duration::from_millis((n % 7) * 10)).await;
        Ok(payload)
    });
    let (mux, _events, _peer) = mux_pair(dispatch, MuxOptions::default());
    let mux = Arc::new(mux);

    let mut calls = Vec::new();
    for n in 0..32u64 {
        let mux = mux.clone();
        calls.push(tokio::spawn(async move {
            mux.request(json!({ "type": "echo", "n": n })).await
        }));
    }

    for (n, call) in calls.into_iter().enumerate() {
        let reply = call.await.unwrap().unwrap();
        assert_eq!(reply["n"], n as u64);
    }
    assert_eq!(mux.pending_count().await, 0);
}

#[tokio::test]
async fn test_unexpected_reply_is_a_notification_not_a_failure() {
    let ((conn, inbound), (peer_conn, mut peer_inbound)) = memory::pair(16);
    let (mux, mut events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );
    let mux = Arc::new(mux);

    // Keep a real request outstanding while the orphan reply arrives.
    let outstanding = {
        let mux = mux.clone();
        tokio::spawn(async move { mux.request(json!({ "type": "ping" })).await })
    };

    // The raw peer sees the request come across as [0, null, false, payload].
    let frame = peer_inbound.recv().await.unwrap();
    let Frame::Text(text) = &frame else {
        panic!("JSON codec must produce text frames");
    };
    let sent: Value = serde_json::from_str(text).unwrap();
    assert_eq!(sent[0], 0);
    assert_eq!(sent[1], Value::Null);
    assert_eq!(sent[2], false);

    // A reply to an id that was never issued only produces an event.
    peer_conn
        .send(Frame::Text(r#"[9,77,true,"ghost"]"#.to_string()))
        .await
        .unwrap();
    match events.recv().await.unwrap() {
        MuxEvent::UnexpectedReply { envelope } => {
            assert_eq!(envelope.request_id.map(|id| id.value()), Some(77));
            assert_eq!(envelope.payload, json!("ghost"));
        }
        other => panic!("expected an unexpected-reply event, got {other:?}"),
    }

    // The outstanding exchange is untouched and still settles normally.
    peer_conn
        .send(Frame::Text(r#"[10,0,true,{"pong":true}]"#.to_string()))
        .await
        .unwrap();
    let reply = outstanding.await.unwrap().unwrap();
    assert_eq!(reply, json!({ "pong": true }));
}

#[tokio::test]
async fn test_malformed_frame_is_dropped_with_an_event() {
    let ((conn, inbound), (peer_conn, _peer_inbound)) = memory::pair(16);
    let (_mux, mut events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );

    peer_conn
        .send(Frame::Text("this is not json".to_string()))
        .await
        .unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        MuxEvent::DecodeFailed { .. }
    ));
}

#[tokio::test]
async fn test_remote_error_mapper_runs_before_delivery() {
    let routes = RoutingTable::new().route("fail", |_payload: Value| async move {
        Err(DispatchError::local("raw"))
    });
    let options = MuxOptions {
        remote_error_mapper: Some(Arc::new(|mut payload: Value| {
            payload["mapped"] = json!(true);
            payload
        })),
        ..MuxOptions::default()
    };
    let (mux, _events, _peer) = mux_pair(Dispatch::Routes(routes), options);

    let error = mux.request(json!({ "type": "fail" })).await.unwrap_err();
    let payload = error.remote_payload().unwrap();
    assert_eq!(payload["message"], "raw");
    assert_eq!(payload["mapped"], true);
}

#[tokio::test]
async fn test_requests_to_unrouted_types_are_dropped() {
    let routes: RoutingTable<Value> =
        RoutingTable::new().route("known", |payload: Value| async move { Ok(payload) });
    let (mux, _events, _peer) = mux_pair(Dispatch::Routes(routes), MuxOptions::default());

    // The peer never answers, so the request can only expire.
    let error = mux
        .request_with_max_age(json!({ "type": "unknown" }), Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(error.is_expired());
}

#[tokio::test]
async fn test_shutdown_settles_outstanding_requests() {
    let (mux, _events, _peer) = mux_pair(Dispatch::Ignore, MuxOptions::default());
    let mux = Arc::new(mux);

    let pending = {
        let mux = mux.clone();
        tokio::spawn(async move { mux.request(json!({ "type": "never" })).await })
    };
    // Let the request reach the driver before shutting down.
    while mux.pending_count().await == 0 {
        tokio::task::yield_now().await;
    }

    mux.shutdown().await;

    assert!(matches!(
        pending.await.unwrap(),
        Err(MuxError::ShuttingDown)
    ));
}

#[tokio::test]
async fn test_connection_close_settles_outstanding_requests() {
    let ((conn, inbound), (peer_conn, peer_inbound)) = memory::pair(16);
    let (mux, _events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );
    let mux = Arc::new(mux);

    let pending = {
        let mux = mux.clone();
        tokio::spawn(async move { mux.request(json!({ "type": "never" })).await })
    };
    while mux.pending_count().await == 0 {
        tokio::task::yield_now().await;
    }

    // Dropping the peer ends the inbound stream.
    drop(peer_conn);
    drop(peer_inbound);

    assert!(matches!(
        pending.await.unwrap(),
        Err(MuxError::ConnectionClosed)
    ));
}
