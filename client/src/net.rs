//! Network layer: a background worker beside the render loop.
//!
//! The frame loop must never block, so every service call travels over a
//! channel to a worker thread that owns a small tokio runtime and a reqwest
//! client with a hard 1-second timeout. Any failure — connect error,
//! non-2xx status, decode error, timeout — is classified the same way: the
//! reply carries the canned offline substitute instead of a live response,
//! and the session flips its online flag accordingly.

use anyhow::Result;
use log::{info, warn};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    CommandRequest, CommandResponse, LogEntry, RegisterRequest, RegisterResponse, ScoreRequest,
    ScoreResponse, StatsResponse, TopScore, EFFECT_GOD_MODE, EFFECT_RAINBOW,
};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub const CALL_TIMEOUT: Duration = Duration::from_secs(1);

/// A call for the worker to perform.
#[derive(Debug, Clone)]
pub enum ApiRequest {
    Register { name: String },
    SubmitScore { student_id: i64, score: i64 },
    TopScores,
    Stats,
    Command { cmd: String },
}

/// The worker's answer, one variant per call.
#[derive(Debug, Clone)]
pub enum ApiReply {
    Register(Outcome<RegisterResponse>),
    SubmitScore(Outcome<ScoreResponse>),
    TopScores(Outcome<Vec<TopScore>>),
    Stats(Outcome<StatsResponse>),
    Command(Outcome<CommandResponse>),
}

impl ApiReply {
    pub fn is_live(&self) -> bool {
        match self {
            ApiReply::Register(o) => o.is_live(),
            ApiReply::SubmitScore(o) => o.is_live(),
            ApiReply::TopScores(o) => o.is_live(),
            ApiReply::Stats(o) => o.is_live(),
            ApiReply::Command(o) => o.is_live(),
        }
    }
}

/// Either a live service response or the offline substitute for that call.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Service(T),
    Fallback(T),
}

impl<T> Outcome<T> {
    pub fn is_live(&self) -> bool {
        matches!(self, Outcome::Service(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Service(value) | Outcome::Fallback(value) => value,
        }
    }
}

/// Handle the frame loop holds: non-blocking send and poll.
pub struct NetHandle {
    requests: Sender<ApiRequest>,
    replies: Receiver<ApiReply>,
}

impl NetHandle {
    pub fn spawn(base_url: String) -> Self {
        let (request_tx, request_rx) = channel::<ApiRequest>();
        let (reply_tx, reply_rx) = channel::<ApiReply>();

        thread::spawn(move || worker_loop(base_url, request_rx, reply_tx));

        Self {
            requests: request_tx,
            replies: reply_rx,
        }
    }

    pub fn send(&self, request: ApiRequest) {
        // A dead worker means every call already fell back; nothing to do.
        let _ = self.requests.send(request);
    }

    pub fn try_recv(&self) -> Option<ApiReply> {
        self.replies.try_recv().ok()
    }
}

fn worker_loop(base_url: String, requests: Receiver<ApiRequest>, replies: Sender<ApiReply>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("Failed to start network runtime: {e}");
            return;
        }
    };

    let client = match reqwest::Client::builder().timeout(CALL_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build HTTP client: {e}");
            return;
        }
    };

    info!("Network worker up, service at {base_url}");

    while let Ok(request) = requests.recv() {
        let reply = runtime.block_on(perform(&client, &base_url, request));
        if replies.send(reply).is_err() {
            break;
        }
    }
}

async fn perform(client: &reqwest::Client, base: &str, request: ApiRequest) -> ApiReply {
    match request {
        ApiRequest::Register { name } => {
            let body = RegisterRequest { name };
            let result = post_json(client, base, "/players", &body).await;
            ApiReply::Register(classify(result, mock_register))
        }
        ApiRequest::SubmitScore { student_id, score } => {
            let body = ScoreRequest { student_id, score };
            let result = post_json(client, base, "/scores", &body).await;
            ApiReply::SubmitScore(classify(result, mock_submit))
        }
        ApiRequest::TopScores => {
            let result = get_json(client, base, "/scores/top").await;
            ApiReply::TopScores(classify(result, mock_top_scores))
        }
        ApiRequest::Stats => {
            let result = get_json(client, base, "/stats").await;
            ApiReply::Stats(classify(result, mock_stats))
        }
        ApiRequest::Command { cmd } => {
            let body = CommandRequest { cmd: cmd.clone() };
            let result = post_json(client, base, "/command", &body).await;
            ApiReply::Command(classify(result, || mock_command(&cmd)))
        }
    }
}

async fn post_json<B: Serialize, T: DeserializeOwned>(
    client: &reqwest::Client,
    base: &str,
    path: &str,
    body: &B,
) -> Result<T> {
    let response = client.post(format!("{base}{path}")).json(body).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("service returned {}", response.status());
    }
    Ok(response.json().await?)
}

async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    base: &str,
    path: &str,
) -> Result<T> {
    let response = client.get(format!("{base}{path}")).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("service returned {}", response.status());
    }
    Ok(response.json().await?)
}

/// The single place deciding live versus fallback.
fn classify<T>(result: Result<T>, fallback: impl FnOnce() -> T) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Service(value),
        Err(e) => {
            warn!("Service call failed, using local fallback: {e:#}");
            Outcome::Fallback(fallback())
        }
    }
}

// Canned offline responses. The register substitute carries no usable id;
// the session only stores ids from live responses.

fn mock_register() -> RegisterResponse {
    RegisterResponse { id: 0 }
}

fn mock_submit() -> ScoreResponse {
    ScoreResponse {
        message: "Saved (Local Sim)".to_string(),
    }
}

fn mock_top_scores() -> Vec<TopScore> {
    vec![
        TopScore {
            name: "Neo".to_string(),
            score: 9999,
        },
        TopScore {
            name: "Morpheus".to_string(),
            score: 8000,
        },
        TopScore {
            name: "You (Local)".to_string(),
            score: 0,
        },
    ]
}

fn mock_stats() -> StatsResponse {
    StatsResponse {
        total_data: rand::thread_rng().gen_range(100_000..5_100_000),
        recent_logs: vec![LogEntry {
            message: "System initialized (Demo Mode)".to_string(),
            kind: "INFO".to_string(),
        }],
    }
}

fn mock_command(cmd: &str) -> CommandResponse {
    let upper = cmd.trim().to_uppercase();
    if upper == "SUDO_ROOT" {
        CommandResponse {
            success: true,
            msg: "[DEMO] God Mode Enabled".to_string(),
            effect: Some(EFFECT_GOD_MODE.to_string()),
        }
    } else if upper == "COLOR_HACK" {
        CommandResponse {
            success: true,
            msg: "[DEMO] Rainbow Mode On".to_string(),
            effect: Some(EFFECT_RAINBOW.to_string()),
        }
    } else if upper.starts_with("PURGE") || upper == "RESET_SYSTEM_DATA" {
        CommandResponse {
            success: true,
            msg: "[DEMO] Target Deleted (Local Sim)".to_string(),
            effect: None,
        }
    } else {
        CommandResponse {
            success: false,
            msg: "Unknown Command".to_string(),
            effect: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_live_response() {
        let outcome = classify(Ok(7), || 0);
        assert!(outcome.is_live());
        assert_eq!(outcome.into_inner(), 7);
    }

    #[test]
    fn test_classify_failure_uses_fallback() {
        let outcome: Outcome<i32> = classify(Err(anyhow::anyhow!("refused")), || 42);
        assert!(!outcome.is_live());
        assert_eq!(outcome.into_inner(), 42);
    }

    #[test]
    fn test_mock_command_cheats() {
        let god = mock_command("SUDO_ROOT");
        assert!(god.success);
        assert_eq!(god.effect.as_deref(), Some("GOD_MODE"));
        assert_eq!(god.msg, "[DEMO] God Mode Enabled");

        let rainbow = mock_command("color_hack");
        assert!(rainbow.success);
        assert_eq!(rainbow.effect.as_deref(), Some("RAINBOW"));
    }

    #[test]
    fn test_mock_command_admin_simulated() {
        let purge = mock_command("PURGE Neo");
        assert!(purge.success);
        assert_eq!(purge.msg, "[DEMO] Target Deleted (Local Sim)");

        let reset = mock_command("RESET_SYSTEM_DATA");
        assert!(reset.success);
        assert!(reset.effect.is_none());
    }

    #[test]
    fn test_mock_command_unknown_rejected() {
        let resp = mock_command("FORMAT C:");
        assert!(!resp.success);
        assert_eq!(resp.msg, "Unknown Command");
    }

    #[test]
    fn test_mock_stats_shape() {
        let stats = mock_stats();
        assert!((100_000..5_100_000).contains(&stats.total_data));
        assert_eq!(stats.recent_logs.len(), 1);
        assert_eq!(stats.recent_logs[0].kind, "INFO");
    }

    #[test]
    fn test_mock_leaderboard_entries() {
        let top = mock_top_scores();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "Neo");
        assert_eq!(top[0].score, 9999);
    }

    /// Transport failures surface as plain errors for classify to turn
    /// into fallbacks.
    #[test]
    fn test_get_json_unreachable_errors() {
        let client = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .unwrap();
        let result: Result<StatsResponse> =
            tokio_test::block_on(get_json(&client, "http://127.0.0.1:9", "/stats"));
        assert!(result.is_err());
    }

    /// With nothing listening on the target port every call must come back
    /// as a fallback within the timeout.
    #[test]
    fn test_dead_endpoint_falls_back() {
        let handle = NetHandle::spawn("http://127.0.0.1:9".to_string());
        handle.send(ApiRequest::Stats);

        let reply = handle
            .replies
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should always answer");
        assert!(!reply.is_live());
        match reply {
            ApiReply::Stats(outcome) => {
                let stats = outcome.into_inner();
                assert_eq!(stats.recent_logs[0].message, "System initialized (Demo Mode)");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
