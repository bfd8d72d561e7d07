//! All drawing: the matrix rain, the world, the HUD and the terminal
//! screens. Reads session state, writes pixels, owns nothing but the rain
//! columns.

use crate::game::{random_glyph, GameState};
use crate::session::{Phase, Session};
use macroquad::color::hsl_to_rgb;
use macroquad::prelude::*;
// leading :: keeps the rand crate distinct from the prelude's quad_rand alias
use ::rand::Rng;
use shared::{format_bytes, TARGET_SCORE};

pub const RAIN_FONT_SIZE: f32 = 14.0;
const RAIN_RESET_CHANCE: f64 = 0.025;

/// Falling-glyph background. One drop position per column, advancing one
/// cell per frame and resetting near the top once past the bottom edge.
pub struct MatrixRain {
    width: f32,
    height: f32,
    drops: Vec<f32>,
}

impl MatrixRain {
    pub fn new(width: f32, height: f32) -> Self {
        let columns = (width / RAIN_FONT_SIZE).ceil().max(1.0) as usize;
        Self {
            width,
            height,
            drops: vec![0.0; columns],
        }
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if (width - self.width).abs() > f32::EPSILON || (height - self.height).abs() > f32::EPSILON
        {
            *self = Self::new(width, height);
        }
    }

    fn step_and_draw(&mut self, compromised: bool) {
        let tint = if compromised {
            Color::from_rgba(90, 20, 20, 255)
        } else {
            Color::from_rgba(20, 70, 20, 255)
        };

        let mut rng = ::rand::thread_rng();
        for (column, drop) in self.drops.iter_mut().enumerate() {
            let x = column as f32 * RAIN_FONT_SIZE;
            let y = *drop * RAIN_FONT_SIZE;
            draw_text(
                &random_glyph().to_string(),
                x,
                y,
                RAIN_FONT_SIZE,
                tint,
            );

            if y > self.height && rng.gen::<f64>() < RAIN_RESET_CHANCE {
                *drop = 0.0;
            } else {
                *drop += 1.0;
            }
        }
    }
}

pub struct Renderer {
    rain: MatrixRain,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            rain: MatrixRain::new(width, height),
        }
    }

    pub fn draw(&mut self, session: &Session) {
        let width = screen_width();
        let height = screen_height();
        self.rain.resize(width, height);

        clear_background(BLACK);
        let compromised = session.game.player.stage.is_max();
        self.rain.step_and_draw(compromised);

        match session.phase {
            Phase::Boot => self.draw_boot_screen(session, width, height),
            Phase::Playing => {
                self.draw_world(&session.game);
                self.draw_hud(session, width, height);
            }
            Phase::ConfirmAbort => {
                self.draw_world(&session.game);
                self.draw_abort_prompt(width, height);
            }
            Phase::Won => self.draw_win_screen(session, width, height),
            Phase::Lost => self.draw_crash_screen(session, width, height),
        }
    }

    fn draw_world(&self, game: &GameState) {
        for particle in &game.particles {
            let (r, g, b) = particle.color;
            let color = Color::new(
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
                particle.alpha(),
            );
            draw_text(&particle.glyph, particle.x, particle.y, particle.size, color);
        }

        for food in &game.foods {
            draw_text(
                &food.glyph.to_string(),
                food.x,
                food.y,
                16.0,
                Color::from_rgba(0, 255, 70, 255),
            );
        }

        let enemy_color = if game.player.stage.is_max() {
            Color::from_rgba(120, 0, 0, 255)
        } else {
            Color::from_rgba(255, 40, 40, 255)
        };
        for enemy in &game.enemies {
            draw_text("[ERR]", enemy.x - 18.0, enemy.y, 18.0, enemy_color);
        }

        self.draw_player(game);
    }

    fn draw_player(&self, game: &GameState) {
        let player = &game.player;
        let color = if game.rainbow_mode {
            // new hue every frame
            hsl_to_rgb(::rand::thread_rng().gen::<f32>(), 1.0, 0.5)
        } else {
            let (r, g, b) = player.stage.rgb();
            Color::from_rgba(r, g, b, 255)
        };

        draw_circle_lines(player.x, player.y, player.radius(), 2.0, color);

        let label = player.stage.label();
        let font_size = player.radius().max(16.0) as u16;
        let dims = measure_text(label, None, font_size, 1.0);
        draw_text_ex(
            label,
            player.x - dims.width / 2.0,
            player.y + dims.height / 2.0,
            TextParams {
                font_size,
                rotation: player.angle,
                color,
                ..Default::default()
            },
        );
    }

    fn draw_hud(&self, session: &Session, width: f32, _height: f32) {
        let game = &session.game;
        let score = game.display_score();
        let hud = format!("{} {}", score, game.player.stage.suffix());
        draw_text(&hud, 20.0, 30.0, 28.0, GREEN);

        // progress toward the target
        let progress = (game.score / TARGET_SCORE).clamp(0.0, 1.0);
        draw_rectangle_lines(20.0, 40.0, 200.0, 10.0, 1.0, GREEN);
        draw_rectangle(20.0, 40.0, 200.0 * progress, 10.0, GREEN);

        let (status, color) = if session.online {
            ("ONLINE", GREEN)
        } else {
            ("OFFLINE", RED)
        };
        draw_text(status, width - 90.0, 30.0, 18.0, color);

        draw_text(
            "HOLD CLICK/SPACE TO BOOST",
            20.0,
            64.0,
            14.0,
            Color::from_rgba(0, 180, 0, 255),
        );
    }

    fn draw_boot_screen(&self, session: &Session, width: f32, height: f32) {
        let left = (width / 2.0 - 260.0).max(20.0);
        let mut y = height * 0.15;

        draw_text("TERMINAL BREACH", left, y, 40.0, GREEN);
        y += 30.0;
        draw_text(
            &format!("GLOBAL DATA: {}", format_bytes(session.boot.total_data)),
            left,
            y,
            18.0,
            Color::from_rgba(0, 200, 80, 255),
        );
        y += 30.0;

        draw_text("-- TOP OPERATORS --", left, y, 18.0, GREEN);
        y += 22.0;
        if session.online {
            for entry in session.boot.leaderboard.iter().take(10) {
                draw_text(
                    &format!("> {} : {}", entry.name, entry.score),
                    left,
                    y,
                    16.0,
                    Color::from_rgba(0, 230, 100, 255),
                );
                y += 18.0;
            }
        } else {
            draw_text("> OFFLINE MODE", left, y, 16.0, RED);
            y += 18.0;
        }
        y += 14.0;

        draw_text("-- SYSTEM LOG --", left, y, 18.0, GREEN);
        y += 22.0;
        for log in session.boot.recent_logs.iter().take(5) {
            let color = match log.kind.as_str() {
                "ALERT" => Color::from_rgba(255, 170, 0, 255),
                "SUCCESS" => Color::from_rgba(0, 243, 255, 255),
                _ => Color::from_rgba(0, 200, 80, 255),
            };
            draw_text(&log.message, left, y, 14.0, color);
            y += 16.0;
        }
        y += 24.0;

        let (handle_cursor, command_cursor) = if session.boot.editing_command {
            ("", "_")
        } else {
            ("_", "")
        };
        draw_text(
            &format!("HANDLE  > {}{}", session.boot.handle, handle_cursor),
            left,
            y,
            20.0,
            WHITE,
        );
        y += 24.0;
        draw_text(
            &format!("COMMAND > {}{}", session.boot.command, command_cursor),
            left,
            y,
            20.0,
            WHITE,
        );
        y += 28.0;
        draw_text(
            "[TAB] switch field   [ENTER] connect",
            left,
            y,
            14.0,
            Color::from_rgba(120, 120, 120, 255),
        );
        y += 24.0;

        if let Some(status) = &session.boot.status {
            draw_text(status, left, y, 16.0, Color::from_rgba(255, 170, 0, 255));
        }
    }

    fn draw_win_screen(&self, session: &Session, width: f32, height: f32) {
        draw_rectangle(0.0, 0.0, width, height, Color::from_rgba(0, 50, 160, 255));
        let left = width * 0.15;
        let mut y = height * 0.25;

        for (line, size) in [
            (":(".to_string(), 80.0),
            ("A problem has been detected.".to_string(), 24.0),
            ("System has been shut down.".to_string(), 24.0),
            ("SYSTEM_HACKED_SUCCESSFULLY".to_string(), 24.0),
            (format!("TOTAL DATA: {} TB", session.final_score), 24.0),
            ("[ TAP SCREEN TO RESTART ]".to_string(), 20.0),
        ] {
            draw_text(&line, left, y, size, WHITE);
            y += size + 16.0;
        }
    }

    fn draw_crash_screen(&self, session: &Session, width: f32, height: f32) {
        let message = format!(
            "SYSTEM CRASHED! FINAL SIZE: {} {}",
            session.final_score,
            session.game.player.stage.suffix()
        );
        let dims = measure_text(&message, None, 30, 1.0);
        draw_text(
            &message,
            (width - dims.width) / 2.0,
            height / 2.0,
            30.0,
            RED,
        );
        draw_text(
            "[ TAP SCREEN TO RESTART ]",
            (width - 230.0) / 2.0,
            height / 2.0 + 40.0,
            18.0,
            WHITE,
        );
    }

    fn draw_abort_prompt(&self, width: f32, height: f32) {
        let box_w = 420.0;
        let box_h = 110.0;
        let x = (width - box_w) / 2.0;
        let y = (height - box_h) / 2.0;

        draw_rectangle(x, y, box_w, box_h, Color::from_rgba(0, 0, 0, 230));
        draw_rectangle_lines(x, y, box_w, box_h, 2.0, GREEN);
        draw_text(
            "DISCONNECTING... SAVE DATA?",
            x + 24.0,
            y + 44.0,
            24.0,
            GREEN,
        );
        draw_text("[Y] save and exit   [N] resume", x + 24.0, y + 80.0, 16.0, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_column_count() {
        let rain = MatrixRain::new(1280.0, 720.0);
        assert_eq!(rain.columns(), (1280.0_f32 / RAIN_FONT_SIZE).ceil() as usize);
    }

    #[test]
    fn test_rain_rebuilds_on_resize() {
        let mut rain = MatrixRain::new(1280.0, 720.0);
        let before = rain.columns();
        rain.resize(640.0, 480.0);
        assert!(rain.columns() < before);
    }

    #[test]
    fn test_rain_resize_same_size_keeps_columns() {
        let mut rain = MatrixRain::new(1280.0, 720.0);
        rain.drops[0] = 17.0;
        rain.resize(1280.0, 720.0);
        assert_eq!(rain.drops[0], 17.0);
    }

    #[test]
    fn test_rain_never_zero_columns() {
        let rain = MatrixRain::new(0.0, 0.0);
        assert_eq!(rain.columns(), 1);
    }
}
