//! End-to-end tests for the score/admin service and the client's offline
//! fallback, over real HTTP on ephemeral ports.

use serde_json::Value;
use server::{routes::build_router, store::Store};
use std::time::Duration;
use tokio::net::TcpListener;

/// SERVICE API TESTS
mod service_api_tests {
    use super::*;

    #[tokio::test]
    async fn registration_ids_strictly_increase() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        let mut last_id = 0;
        for _ in 0..3 {
            let body: Value = client
                .post(format!("{base}/players"))
                .json(&serde_json::json!({ "name": "Neo" }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            let id = body["id"].as_i64().unwrap();
            assert!(id > last_id, "expected {id} > {last_id}");
            last_id = id;
        }
    }

    #[tokio::test]
    async fn duplicate_and_empty_names_accepted() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        for name in ["Trinity", "Trinity", ""] {
            let response = client
                .post(format!("{base}/players"))
                .json(&serde_json::json!({ "name": name }))
                .send()
                .await
                .unwrap();
            assert!(response.status().is_success());
        }
    }

    #[tokio::test]
    async fn register_submit_stats_flow() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/players"))
            .json(&serde_json::json!({ "name": "Neo" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["id"], 1);

        let body: Value = client
            .post(format!("{base}/scores"))
            .json(&serde_json::json!({ "student_id": 1, "score": 1500 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["message"], "Score saved");

        let stats: Value = client
            .get(format!("{base}/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["totalData"], 1500);

        // newest log is the breach alert triggered by the large score
        let newest = &stats["recentLogs"][0];
        assert_eq!(newest["type"], "ALERT");
        let message = newest["message"].as_str().unwrap();
        assert!(message.ends_with("Data breach: 1500 TB stolen!"));
        // prefixed with "[HH:MM:SS] "
        assert_eq!(&message[0..1], "[");
        assert_eq!(&message[9..11], "] ");
    }

    #[tokio::test]
    async fn score_for_unknown_student_accepted() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/scores"))
            .json(&serde_json::json!({ "student_id": 424242, "score": -5 }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let stats: Value = client
            .get(format!("{base}/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["totalData"], -5);
    }

    #[tokio::test]
    async fn top_scores_capped_at_ten_and_sorted() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/players"))
            .json(&serde_json::json!({ "name": "Smith" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = body["id"].as_i64().unwrap();

        for n in 0..12 {
            client
                .post(format!("{base}/scores"))
                .json(&serde_json::json!({ "student_id": id, "score": n * 100 }))
                .send()
                .await
                .unwrap();
        }

        let top: Vec<Value> = client
            .get(format!("{base}/scores/top"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(top.len(), 10);
        let scores: Vec<i64> = top.iter().map(|e| e["score"].as_i64().unwrap()).collect();
        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        // same student appears once per score, no aggregation
        assert!(top.iter().all(|e| e["name"] == "Smith"));
    }
}

/// ADMIN COMMAND TESTS
mod admin_command_tests {
    use super::*;

    #[tokio::test]
    async fn purge_unknown_name_fails_softly() {
        let base = spawn_service().await;
        let body = command(&base, "PURGE Oracle").await;
        assert_eq!(body["success"], false);
        assert_eq!(body["msg"], "User [Oracle] not found.");
    }

    #[tokio::test]
    async fn purge_missing_name_rejected() {
        let base = spawn_service().await;
        let body = command(&base, "PURGE").await;
        assert_eq!(body["success"], false);
        assert_eq!(body["msg"], "Name missing");
    }

    #[tokio::test]
    async fn purge_removes_student_and_their_scores() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        for (name, score) in [("Cypher", 9000), ("Tank", 100)] {
            let body: Value = client
                .post(format!("{base}/players"))
                .json(&serde_json::json!({ "name": name }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            client
                .post(format!("{base}/scores"))
                .json(&serde_json::json!({ "student_id": body["id"], "score": score }))
                .send()
                .await
                .unwrap();
        }

        let body = command(&base, "PURGE Cypher").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["msg"], "TARGET [Cypher] DELETED.");

        let top: Vec<Value> = client
            .get(format!("{base}/scores/top"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0]["name"], "Tank");
    }

    #[tokio::test]
    async fn reset_wipes_everything_but_its_own_log() {
        let base = spawn_service().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{base}/players"))
            .json(&serde_json::json!({ "name": "Neo" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        client
            .post(format!("{base}/scores"))
            .json(&serde_json::json!({ "student_id": body["id"], "score": 5000 }))
            .send()
            .await
            .unwrap();

        let body = command(&base, "RESET_SYSTEM_DATA").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["msg"], "SYSTEM DATA WIPED CLEAN.");

        let stats: Value = client
            .get(format!("{base}/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["totalData"], 0);

        let logs = stats["recentLogs"].as_array().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["type"], "ALERT");
        assert!(logs[0]["message"]
            .as_str()
            .unwrap()
            .ends_with("System Factory Reset Executed."));
    }

    #[tokio::test]
    async fn cheat_commands_return_fixed_effects() {
        let base = spawn_service().await;

        let body = command(&base, "SUDO_ROOT").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["effect"], "GOD_MODE");
        assert_eq!(body["msg"], "Access Granted: Root Privileges");

        let body = command(&base, "COLOR_HACK").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["effect"], "RAINBOW");
    }

    #[tokio::test]
    async fn unknown_command_denied_without_effect() {
        let base = spawn_service().await;
        let body = command(&base, "DROP TABLE students").await;
        assert_eq!(body["success"], false);
        assert_eq!(body["msg"], "Access Denied");
        assert!(body.get("effect").is_none());
    }
}

/// CLIENT FALLBACK TESTS
mod client_fallback_tests {
    use super::*;
    use client::net::{ApiReply, ApiRequest, NetHandle};

    #[tokio::test]
    async fn live_service_yields_live_replies() {
        let base = spawn_service().await;
        let handle = NetHandle::spawn(base);

        handle.send(ApiRequest::Register {
            name: "GHOST".to_string(),
        });

        let reply = wait_reply(&handle).await;
        assert!(reply.is_live());
        match reply {
            ApiReply::Register(outcome) => assert_eq!(outcome.into_inner().id, 1),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dead_service_yields_fallback_replies() {
        let handle = NetHandle::spawn("http://127.0.0.1:9".to_string());

        handle.send(ApiRequest::TopScores);
        let reply = wait_reply(&handle).await;
        assert!(!reply.is_live());
        match reply {
            ApiReply::TopScores(outcome) => {
                let top = outcome.into_inner();
                assert_eq!(top[0].name, "Neo");
                assert_eq!(top[0].score, 9999);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    async fn wait_reply(handle: &NetHandle) -> ApiReply {
        for _ in 0..200 {
            if let Some(reply) = handle.try_recv() {
                return reply;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("no reply from network worker within 5s");
    }
}

/// Boots the real router over an in-memory store on an ephemeral port.
async fn spawn_service() -> String {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    let app = build_router(store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn command(base: &str, cmd: &str) -> Value {
    reqwest::Client::new()
        .post(format!("{base}/command"))
        .json(&serde_json::json!({ "cmd": cmd }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}
