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

//! Expiry sweep tests, run on tokio's paused clock so deadlines are exact.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use wiremux::codec::JsonCodec;
use wiremux::mux::{Dispatch, Multiplexer, MuxError, MuxEvent, MuxOptions};
use wiremux::transport::memory;
use wiremux::transport::{Connection, Frame};

#[tokio::test(start_paused = true)]
async fn test_unanswered_request_expires_on_the_next_sweep() {
    let ((conn, inbound), _peer) = memory::pair(16);
    let (mux, _events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );

    let started = Instant::now();
    let error = mux
        .request_with_max_age(json!({ "type": "ping" }), Duration::from_millis(500))
        .await
        .expect_err("no peer answers, the request must expire");

    assert!(error.is_expired());
    // The 250 ms sweep settles the exchange on its first tick past the
    // 500 ms deadline.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(500), "settled early: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(800), "settled late: {elapsed:?}");

    assert_eq!(mux.pending_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_instance_max_age_applies_to_plain_requests() {
    let ((conn, inbound), _peer) = memory::pair(16);
    let (mux, _events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions {
            max_age: Duration::from_secs(2),
            ..MuxOptions::default()
        },
    );

    let started = Instant::now();
    let error = mux.request(json!({ "type": "ping" })).await.unwrap_err();

    assert!(error.is_expired());
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_reply_arriving_after_expiry_is_an_unexpected_reply() {
    let ((conn, inbound), (peer_conn, mut peer_inbound)) = memory::pair(16);
    let (mux, mut events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );

    let error = mux
        .request_with_max_age(json!({ "type": "slow" }), Duration::from_millis(500))
        .await
        .unwrap_err();
    assert!(error.is_expired());
    assert_eq!(mux.pending_count().await, 0);

    // The sweep already removed the exchange, so the late reply is only a
    // notification.
    let _request = peer_inbound.recv().await.unwrap();
    peer_conn
        .send(Frame::Text(r#"[3,0,true,"too late"]"#.to_string()))
        .await
        .unwrap();

    match events.recv().await.unwrap() {
        MuxEvent::UnexpectedReply { envelope } => {
            assert_eq!(envelope.payload, json!("too late"));
        }
        other => panic!("expected an unexpected-reply event, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_requests_expire_in_deadline_order() {
    let ((conn, inbound), _peer) = memory::pair(16);
    let (mux, _events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );
    let mux = Arc::new(mux);

    // Staggered lifetimes across several one-second buckets.
    let mut calls = Vec::new();
    for n in 0..4u64 {
        let mux = mux.clone();
        calls.push(tokio::spawn(async move {
            let started = Instant::now();
            let outcome = mux
                .request_with_max_age(
                    json!({ "type": "ping", "n": n }),
                    Duration::from_millis(500 + n * 1_000),
                )
                .await;
            (outcome, started.elapsed())
        }));
    }

    for (n, call) in calls.into_iter().enumerate() {
        let (outcome, elapsed) = call.await.unwrap();
        assert!(matches!(outcome, Err(MuxError::Expired)));
        let deadline = Duration::from_millis(500 + n as u64 * 1_000);
        assert!(elapsed >= deadline, "request {n} settled early: {elapsed:?}");
        assert!(
            elapsed <= deadline + Duration::from_millis(300),
            "request {n} settled late: {elapsed:?}"
        );
    }
    assert_eq!(mux.pending_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_settled_requests_are_not_swept() {
    let ((conn, inbound), (peer_conn, mut peer_inbound)) = memory::pair(16);
    let (mux, mut events) = Multiplexer::new(
        Arc::new(conn),
        inbound,
        JsonCodec::new(),
        Dispatch::Ignore,
        MuxOptions::default(),
    );

    // Answer promptly, then let the clock run past the deadline; nothing
    // further may surface for this exchange.
    let (reply, _) = tokio::join!(
        mux.request_with_max_age(json!({ "type": "ping" }), Duration::from_millis(500)),
        async {
            let _frame = peer_inbound.recv().await.unwrap();
            peer_conn
                .send(Frame::Text(r#"[1,0,true,"pong"]"#.to_string()))
                .await
                .unwrap();
        }
    );
    assert_eq!(reply.unwrap(), json!("pong"));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(mux.pending_count().await, 0);
    assert!(events.try_recv().is_err());
}
