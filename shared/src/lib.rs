use serde::{Deserialize, Serialize};

pub const TARGET_SCORE: f32 = 10000.0;
pub const BASE_SPEED: f32 = 4.0;
pub const BOOST_SPEED: f32 = 10.0;
pub const BOOST_DRAIN: f32 = 0.2;
pub const MOVE_DEADZONE: f32 = 5.0;
pub const FOOD_COUNT: usize = 40;
pub const FOOD_POINTS: f32 = 10.0;
pub const FOOD_PICKUP_PAD: f32 = 10.0;
pub const ENEMY_POINTS: f32 = 100.0;
pub const ENEMY_CONTACT_PAD: f32 = 15.0;
pub const ENEMY_SPAWN_MARGIN: f32 = 50.0;
pub const ENEMY_SPAWN_SECS: u64 = 4;
pub const SCORE_ALERT_THRESHOLD: i64 = 1000;
pub const TOP_SCORES_LIMIT: u32 = 10;
pub const RECENT_LOGS_LIMIT: u32 = 5;

pub const EFFECT_GOD_MODE: &str = "GOD_MODE";
pub const EFFECT_RAINBOW: &str = "RAINBOW";

/// Player growth tier, derived purely from the running score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Kb,
    Mb,
    Gb,
    Tb,
}

impl Stage {
    pub fn from_score(score: f32) -> Self {
        if score >= 5000.0 {
            Stage::Tb
        } else if score >= 2000.0 {
            Stage::Gb
        } else if score >= 500.0 {
            Stage::Mb
        } else {
            Stage::Kb
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Stage::Kb => "KB",
            Stage::Mb => "MB",
            Stage::Gb => "GB",
            Stage::Tb => "TB",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Kb => "< VIRUS >",
            Stage::Mb => "< MALWARE >",
            Stage::Gb => "< TROJAN >",
            Stage::Tb => "< SYSTEM_ROOT >",
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Stage::Kb => 20.0,
            Stage::Mb => 25.0,
            Stage::Gb => 30.0,
            Stage::Tb => 40.0,
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Stage::Kb => (0, 255, 0),
            Stage::Mb => (0, 243, 255),
            Stage::Gb => (255, 170, 0),
            Stage::Tb => (255, 0, 0),
        }
    }

    /// TB is the top tier; reaching it bypasses the loss condition.
    pub fn is_max(&self) -> bool {
        matches!(self, Stage::Tb)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScoreRequest {
    pub student_id: i64,
    pub score: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScoreResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TopScore {
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatsResponse {
    #[serde(rename = "totalData")]
    pub total_data: i64,
    #[serde(rename = "recentLogs")]
    pub recent_logs: Vec<LogEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommandRequest {
    pub cmd: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

pub fn in_contact(ax: f32, ay: f32, bx: f32, by: f32, range: f32) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt() < range
}

/// Binary-unit display starting at KB (1536 -> "1.5 MB", 500 -> "500 KB").
pub fn format_bytes(bytes: i64) -> String {
    const SIZES: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 KB".to_string();
    }
    if bytes < 0 {
        return format!("{} KB", bytes);
    }
    let i = (((bytes as f64).ln() / 1024f64.ln()).floor() as usize).min(SIZES.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(i as i32);
    let mut value = format!("{:.2}", scaled);
    while value.ends_with('0') {
        value.pop();
    }
    if value.ends_with('.') {
        value.pop();
    }
    format!("{} {}", value, SIZES[i])
}
