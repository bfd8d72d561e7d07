//! Session orchestration: phases, the boot screen flow, and score relay.
//!
//! The session owns the game state, the input manager and the network
//! handle, and routes worker replies back into its own state. Phases move
//! boot -> playing -> (won | lost | abort prompt) -> boot; the network is
//! polled, never awaited, so a stalled service can never stall a frame.

use crate::game::{GameState, StepOutcome};
use crate::input::InputManager;
use crate::net::{ApiReply, ApiRequest, NetHandle, Outcome};
use log::info;
use macroquad::prelude::*;
// leading :: keeps the rand crate distinct from the prelude's quad_rand alias
use ::rand::seq::SliceRandom;
use shared::{LogEntry, TopScore, EFFECT_GOD_MODE, EFFECT_RAINBOW};

const FALLBACK_HANDLES: [&str; 10] = [
    "GHOST", "UNKNOWN", "GLITCH", "CIPHER", "SHADOW", "PROXY", "DAEMON", "USER_X", "NO_NAME",
    "SPECTRE",
];

const MAX_FIELD_LEN: usize = 24;

pub fn random_handle() -> String {
    FALLBACK_HANDLES
        .choose(&mut ::rand::thread_rng())
        .unwrap_or(&"GHOST")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Boot,
    Playing,
    ConfirmAbort,
    Won,
    Lost,
}

/// What the boot screen's command field amounts to on Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootCommand {
    /// Nothing recognized; plain registration.
    None,
    /// Admin command to send verbatim; the game does not start.
    Admin(String),
    /// PURGE without a target.
    AdminUsageError(&'static str),
    /// Cheat sent after registration succeeds.
    Cheat(String),
}

pub fn classify_boot_command(raw: &str) -> BootCommand {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return BootCommand::None;
    }

    let upper = trimmed.to_uppercase();
    if upper.starts_with("PURGE") {
        // Target keeps its original casing; only the keyword is normalized.
        let rest = trimmed[5..].trim();
        if rest.is_empty() {
            return BootCommand::AdminUsageError("Format: PURGE <name>");
        }
        return BootCommand::Admin(format!("PURGE {rest}"));
    }
    if upper == "RESET_SYSTEM_DATA" {
        return BootCommand::Admin(upper);
    }
    if upper == "SUDO_ROOT" || upper == "COLOR_HACK" {
        return BootCommand::Cheat(upper);
    }
    BootCommand::None
}

/// Saves go out only when the service answered live and a registration id
/// was obtained from it.
pub fn should_submit(online: bool, player_id: Option<i64>) -> bool {
    online && player_id.is_some()
}

/// Everything the boot screen shows and edits.
pub struct BootScreen {
    pub handle: String,
    pub command: String,
    pub editing_command: bool,
    pub status: Option<String>,
    pub leaderboard: Vec<TopScore>,
    pub total_data: i64,
    pub recent_logs: Vec<LogEntry>,
}

impl BootScreen {
    fn new() -> Self {
        Self {
            handle: String::new(),
            command: String::new(),
            editing_command: false,
            status: None,
            leaderboard: Vec::new(),
            total_data: 0,
            recent_logs: Vec::new(),
        }
    }
}

/// Which reply the boot flow is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BootFlow {
    Idle,
    AwaitingAdmin,
    AwaitingRegister { cheat: Option<String> },
    AwaitingCheat,
}

pub struct Session {
    pub phase: Phase,
    pub game: GameState,
    pub boot: BootScreen,
    pub online: bool,
    pub player_id: Option<i64>,
    pub god_mode: bool,
    pub rainbow_mode: bool,
    pub final_score: i64,
    net: NetHandle,
    input: InputManager,
    flow: BootFlow,
    width: f32,
    height: f32,
}

impl Session {
    pub fn new(server: &str, width: f32, height: f32) -> Self {
        let net = NetHandle::spawn(server.to_string());
        net.send(ApiRequest::TopScores);
        net.send(ApiRequest::Stats);

        Self {
            phase: Phase::Boot,
            game: GameState::new(width, height, false, false),
            boot: BootScreen::new(),
            online: false,
            player_id: None,
            god_mode: false,
            rainbow_mode: false,
            final_score: 0,
            net,
            input: InputManager::new(),
            flow: BootFlow::Idle,
            width,
            height,
        }
    }

    /// One frame of session logic; the renderer draws afterwards.
    pub fn frame(&mut self) {
        self.width = screen_width();
        self.height = screen_height();
        self.game.resize(self.width, self.height);

        self.pump_replies();

        match self.phase {
            Phase::Boot => self.boot_frame(),
            Phase::Playing => self.play_frame(),
            Phase::ConfirmAbort => self.confirm_frame(),
            Phase::Won | Phase::Lost => self.end_frame(),
        }
    }

    fn pump_replies(&mut self) {
        while let Some(reply) = self.net.try_recv() {
            // Any live answer flips us online, any fallback offline.
            self.online = reply.is_live();

            match reply {
                ApiReply::TopScores(outcome) => {
                    self.boot.leaderboard = outcome.into_inner();
                }
                ApiReply::Stats(outcome) => {
                    let stats = outcome.into_inner();
                    self.boot.total_data = stats.total_data;
                    self.boot.recent_logs = stats.recent_logs;
                }
                ApiReply::Register(outcome) => self.on_register(outcome),
                ApiReply::Command(outcome) => self.on_command(outcome),
                ApiReply::SubmitScore(_) => {}
            }
        }
    }

    fn on_register(&mut self, outcome: Outcome<shared::RegisterResponse>) {
        // Offline registration yields no usable id.
        if let Outcome::Service(resp) = &outcome {
            self.player_id = Some(resp.id);
            info!("Registered as id {}", resp.id);
        }

        let cheat = match std::mem::replace(&mut self.flow, BootFlow::Idle) {
            BootFlow::AwaitingRegister { cheat } => cheat,
            other => {
                self.flow = other;
                return;
            }
        };

        if let Some(cmd) = cheat {
            self.flow = BootFlow::AwaitingCheat;
            self.net.send(ApiRequest::Command { cmd });
        } else {
            self.start_game();
        }
    }

    fn on_command(&mut self, outcome: Outcome<shared::CommandResponse>) {
        match std::mem::replace(&mut self.flow, BootFlow::Idle) {
            BootFlow::AwaitingAdmin => {
                let resp = outcome.into_inner();
                self.boot.status = Some(format!("ADMIN LOG: {}", resp.msg));
                if resp.success {
                    self.reload_boot_data();
                }
            }
            BootFlow::AwaitingCheat => {
                let resp = outcome.into_inner();
                if resp.success {
                    self.boot.status = Some(format!("SYSTEM MSG: {}", resp.msg));
                    match resp.effect.as_deref() {
                        Some(e) if e == EFFECT_GOD_MODE => self.god_mode = true,
                        Some(e) if e == EFFECT_RAINBOW => self.rainbow_mode = true,
                        _ => {}
                    }
                }
                self.start_game();
            }
            other => {
                self.flow = other;
            }
        }
    }

    fn reload_boot_data(&self) {
        self.net.send(ApiRequest::TopScores);
        self.net.send(ApiRequest::Stats);
    }

    fn boot_frame(&mut self) {
        while let Some(c) = get_char_pressed() {
            if c.is_control() {
                continue;
            }
            let field = if self.boot.editing_command {
                &mut self.boot.command
            } else {
                &mut self.boot.handle
            };
            if field.len() < MAX_FIELD_LEN {
                field.push(c);
            }
        }

        if is_key_pressed(KeyCode::Backspace) {
            let field = if self.boot.editing_command {
                &mut self.boot.command
            } else {
                &mut self.boot.handle
            };
            field.pop();
        }

        if is_key_pressed(KeyCode::Tab) {
            self.boot.editing_command = !self.boot.editing_command;
        }

        if is_key_pressed(KeyCode::Enter) {
            self.submit_boot_form();
        }
    }

    fn submit_boot_form(&mut self) {
        if self.flow != BootFlow::Idle {
            return;
        }

        if self.boot.handle.trim().is_empty() {
            self.boot.handle = random_handle();
        }
        let handle = self.boot.handle.trim().to_string();

        match classify_boot_command(&self.boot.command) {
            BootCommand::AdminUsageError(msg) => {
                self.boot.status = Some(msg.to_string());
            }
            BootCommand::Admin(cmd) => {
                self.flow = BootFlow::AwaitingAdmin;
                self.net.send(ApiRequest::Command { cmd });
            }
            BootCommand::Cheat(cmd) => {
                self.flow = BootFlow::AwaitingRegister { cheat: Some(cmd) };
                self.net.send(ApiRequest::Register { name: handle });
            }
            BootCommand::None => {
                self.flow = BootFlow::AwaitingRegister { cheat: None };
                self.net.send(ApiRequest::Register { name: handle });
            }
        }
    }

    fn start_game(&mut self) {
        self.game = GameState::new(self.width, self.height, self.god_mode, self.rainbow_mode);
        self.phase = Phase::Playing;
        info!(
            "Session started as {} (id {:?}, god={}, rainbow={})",
            self.boot.handle, self.player_id, self.god_mode, self.rainbow_mode
        );
    }

    fn play_frame(&mut self) {
        let input = self.input.sample();
        if input.abort {
            self.phase = Phase::ConfirmAbort;
            return;
        }

        match self.game.step(input.target_x, input.target_y, input.boost) {
            StepOutcome::Won => {
                self.final_score = self.game.display_score();
                info!("System breached with {} TB", self.final_score);
                self.submit_score();
                self.phase = Phase::Won;
            }
            StepOutcome::Crashed => {
                self.final_score = self.game.display_score();
                info!("Session crashed at {}", self.final_score);
                self.submit_score();
                self.phase = Phase::Lost;
            }
            StepOutcome::Continue => {}
        }
    }

    fn confirm_frame(&mut self) {
        if is_key_pressed(KeyCode::Y) || is_key_pressed(KeyCode::Enter) {
            self.final_score = self.game.display_score();
            self.submit_score();
            let note = format!("SESSION ABORTED. DATA SAVED: {}", self.final_score);
            self.return_to_boot(Some(note));
        } else if is_key_pressed(KeyCode::N) || is_key_pressed(KeyCode::Escape) {
            self.phase = Phase::Playing;
        }
    }

    fn end_frame(&mut self) {
        let tapped = is_mouse_button_pressed(MouseButton::Left)
            || touches().iter().any(|t| t.phase == TouchPhase::Started);
        if tapped {
            self.return_to_boot(None);
        }
    }

    /// Best-effort: skipped entirely when offline or unregistered.
    fn submit_score(&mut self) {
        if !should_submit(self.online, self.player_id) {
            return;
        }
        if let Some(id) = self.player_id {
            self.net.send(ApiRequest::SubmitScore {
                student_id: id,
                score: self.final_score,
            });
        }
    }

    fn return_to_boot(&mut self, status: Option<String>) {
        self.phase = Phase::Boot;
        self.flow = BootFlow::Idle;
        self.god_mode = false;
        self.rainbow_mode = false;
        self.boot.command.clear();
        self.boot.status = status;
        self.reload_boot_data();
    }
}
