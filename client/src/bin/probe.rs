//! Command-line smoke run against a live service: register, submit a
//! score, pull the leaderboard and stats, poke the command endpoint, and
//! print every response.

use clap::Parser;
use shared::{
    CommandRequest, CommandResponse, RegisterRequest, RegisterResponse, ScoreRequest,
    ScoreResponse, StatsResponse, TopScore,
};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the score service
    #[arg(short = 's', long, default_value = "http://127.0.0.1:3000")]
    server: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()?;

    println!("Probing {}", args.server);

    // Register a throwaway player
    let register: RegisterResponse = client
        .post(format!("{}/players", args.server))
        .json(&RegisterRequest {
            name: "PROBE".to_string(),
        })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("Registered as id {}", register.id);

    // Submit a score above the alert threshold
    let score: ScoreResponse = client
        .post(format!("{}/scores", args.server))
        .json(&ScoreRequest {
            student_id: register.id,
            score: 1337,
        })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("Score submission: {}", score.message);

    let top: Vec<TopScore> = client
        .get(format!("{}/scores/top", args.server))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("Top scores ({} entries):", top.len());
    for entry in &top {
        println!("  {} : {}", entry.name, entry.score);
    }

    let stats: StatsResponse = client
        .get(format!("{}/stats", args.server))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("Total data: {}", stats.total_data);
    for log in &stats.recent_logs {
        println!("  [{}] {}", log.kind, log.message);
    }

    for cmd in ["SUDO_ROOT", "COLOR_HACK", "OPEN_SESAME"] {
        let response: CommandResponse = client
            .post(format!("{}/command", args.server))
            .json(&CommandRequest {
                cmd: cmd.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        println!(
            "{} -> success={} msg={:?} effect={:?}",
            cmd, response.success, response.msg, response.effect
        );
    }

    println!("Probe complete");
    Ok(())
}
