//! Client-side game state and the per-frame step.
//!
//! Pure state: no drawing happens here. The session calls [`GameState::step`]
//! once per frame with the sampled input and reacts to the returned outcome;
//! the renderer reads the public fields afterwards.

use rand::Rng;
use shared::{
    in_contact, Stage, BASE_SPEED, BOOST_DRAIN, BOOST_SPEED, ENEMY_CONTACT_PAD, ENEMY_POINTS,
    ENEMY_SPAWN_MARGIN, ENEMY_SPAWN_SECS, FOOD_COUNT, FOOD_PICKUP_PAD, FOOD_POINTS, MOVE_DEADZONE,
    TARGET_SCORE,
};
use std::time::{Duration, Instant};

pub const TRAIL_PARTICLE_LIFE: f32 = 20.0;
pub const FOOD_PARTICLE_LIFE: f32 = 10.0;
pub const ENEMY_BURST_LIFE: f32 = 30.0;
pub const ENEMY_BURST_COUNT: usize = 5;
pub const PARTICLE_DRIFT: f32 = 5.0;

/// Random katakana glyph, the alphabet of every particle and the rain.
pub fn random_glyph() -> char {
    let offset = rand::thread_rng().gen_range(0..96u32);
    char::from_u32(0x30A0 + offset).unwrap_or('ア')
}

#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub stage: Stage,
}

impl Player {
    pub fn radius(&self) -> f32 {
        self.stage.radius()
    }
}

#[derive(Debug, Clone)]
pub struct Food {
    pub x: f32,
    pub y: f32,
    pub glyph: char,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub glyph: String,
    pub life: f32,
    pub size: f32,
    pub color: (u8, u8, u8),
}

impl Particle {
    /// Fades out over the last 20 frames of life.
    pub fn alpha(&self) -> f32 {
        (self.life / TRAIL_PARTICLE_LIFE).min(1.0)
    }
}

/// What a single frame step amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// Score reached the target.
    Won,
    /// Enemy contact while not empowered.
    Crashed,
}

pub struct GameState {
    pub player: Player,
    pub foods: Vec<Food>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub score: f32,
    pub running: bool,
    pub boosting: bool,
    pub god_mode: bool,
    pub rainbow_mode: bool,
    width: f32,
    height: f32,
    last_enemy_spawn: Instant,
}

impl GameState {
    pub fn new(width: f32, height: f32, god_mode: bool, rainbow_mode: bool) -> Self {
        let foods = (0..FOOD_COUNT).map(|_| spawn_food(width, height)).collect();
        let enemies = vec![spawn_enemy(width, height), spawn_enemy(width, height)];

        Self {
            player: Player {
                x: width / 2.0,
                y: height / 2.0,
                angle: 0.0,
                stage: Stage::Kb,
            },
            foods,
            enemies,
            particles: Vec::new(),
            score: 0.0,
            running: true,
            boosting: false,
            god_mode,
            rainbow_mode,
            width,
            height,
            last_enemy_spawn: Instant::now(),
        }
    }

    /// Score as shown and submitted: floored.
    pub fn display_score(&self) -> i64 {
        self.score.floor() as i64
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Advances the world by one frame: stage, win check, movement and
    /// boost, particles, food and enemy passes, wall-clock enemy spawn.
    pub fn step(&mut self, target_x: f32, target_y: f32, boost: bool) -> StepOutcome {
        if !self.running {
            return StepOutcome::Continue;
        }

        self.player.stage = Stage::from_score(self.score);

        if self.score >= TARGET_SCORE {
            self.running = false;
            return StepOutcome::Won;
        }

        self.move_player(target_x, target_y, boost);
        self.age_particles();
        self.update_foods();

        if self.update_enemies() == StepOutcome::Crashed {
            self.running = false;
            return StepOutcome::Crashed;
        }

        if self.last_enemy_spawn.elapsed() >= Duration::from_secs(ENEMY_SPAWN_SECS) {
            self.enemies.push(spawn_enemy(self.width, self.height));
            self.last_enemy_spawn = Instant::now();
        }

        StepOutcome::Continue
    }

    fn move_player(&mut self, target_x: f32, target_y: f32, boost: bool) {
        let dx = target_x - self.player.x;
        let dy = target_y - self.player.y;
        let distance = dx.hypot(dy);
        self.player.angle = dy.atan2(dx);

        self.boosting = boost && self.score > 0.0;
        let speed = if self.boosting {
            self.score = (self.score - BOOST_DRAIN).max(0.0);
            self.spawn_trail_particle();
            BOOST_SPEED
        } else {
            BASE_SPEED
        };

        if distance > MOVE_DEADZONE {
            self.player.x += self.player.angle.cos() * speed;
            self.player.y += self.player.angle.sin() * speed;
        }
    }

    fn spawn_trail_particle(&mut self) {
        let size = rand::thread_rng().gen_range(10.0..20.0);
        self.particles.push(Particle {
            x: self.player.x,
            y: self.player.y,
            glyph: random_glyph().to_string(),
            life: TRAIL_PARTICLE_LIFE,
            size,
            color: self.player.stage.rgb(),
        });
    }

    /// Particles drift opposite the player's heading and die when their
    /// life runs out.
    fn age_particles(&mut self) {
        let drift_x = self.player.angle.cos() * PARTICLE_DRIFT;
        let drift_y = self.player.angle.sin() * PARTICLE_DRIFT;
        for particle in &mut self.particles {
            particle.x -= drift_x;
            particle.y -= drift_y;
            particle.life -= 1.0;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    fn update_foods(&mut self) {
        let mut rng = rand::thread_rng();
        let pickup = self.player.radius() + FOOD_PICKUP_PAD;
        for i in 0..self.foods.len() {
            self.foods[i].x += rng.gen_range(-0.5..0.5);
            self.foods[i].y += rng.gen_range(-0.5..0.5);

            if in_contact(
                self.player.x,
                self.player.y,
                self.foods[i].x,
                self.foods[i].y,
                pickup,
            ) {
                self.score += FOOD_POINTS;
                let eaten =
                    std::mem::replace(&mut self.foods[i], spawn_food(self.width, self.height));
                if rng.gen_bool(0.5) {
                    self.particles.push(Particle {
                        x: eaten.x,
                        y: eaten.y,
                        glyph: "1".to_string(),
                        life: FOOD_PARTICLE_LIFE,
                        size: 14.0,
                        color: (255, 255, 255),
                    });
                }
            }
        }
    }

    fn update_enemies(&mut self) -> StepOutcome {
        let contact = self.player.radius() + ENEMY_CONTACT_PAD;
        let empowered = self.player.stage.is_max() || self.god_mode;
        let (px, py) = (self.player.x, self.player.y);

        let mut destroyed: Vec<usize> = Vec::new();
        for (i, enemy) in self.enemies.iter_mut().enumerate() {
            let dx = px - enemy.x;
            let dy = py - enemy.y;
            let angle = dy.atan2(dx);
            enemy.x += angle.cos() * enemy.speed;
            enemy.y += angle.sin() * enemy.speed;

            if in_contact(px, py, enemy.x, enemy.y, contact) {
                if empowered {
                    destroyed.push(i);
                } else {
                    return StepOutcome::Crashed;
                }
            }
        }

        for &i in destroyed.iter().rev() {
            let enemy = self.enemies.remove(i);
            self.score += ENEMY_POINTS;
            for _ in 0..ENEMY_BURST_COUNT {
                self.particles.push(Particle {
                    x: enemy.x,
                    y: enemy.y,
                    glyph: "ERR".to_string(),
                    life: ENEMY_BURST_LIFE,
                    size: 16.0,
                    color: (255, 0, 0),
                });
            }
        }

        StepOutcome::Continue
    }
}

fn spawn_food(width: f32, height: f32) -> Food {
    let mut rng = rand::thread_rng();
    Food {
        x: rng.gen_range(0.0..width.max(1.0)),
        y: rng.gen_range(0.0..height.max(1.0)),
        glyph: if rng.gen_bool(0.5) { '1' } else { '0' },
    }
}

/// A random point 50 px outside a random screen edge, marching inwards.
fn spawn_enemy(width: f32, height: f32) -> Enemy {
    let mut rng = rand::thread_rng();
    let (x, y) = match rng.gen_range(0..4) {
        0 => (rng.gen_range(0.0..width.max(1.0)), -ENEMY_SPAWN_MARGIN),
        1 => (
            width + ENEMY_SPAWN_MARGIN,
            rng.gen_range(0.0..height.max(1.0)),
        ),
        2 => (
            rng.gen_range(0.0..width.max(1.0)),
            height + ENEMY_SPAWN_MARGIN,
        ),
        _ => (-ENEMY_SPAWN_MARGIN, rng.gen_range(0.0..height.max(1.0))),
    };
    Enemy {
        x,
        y,
        speed: 1.5 + rng.gen::<f32>() * 2.0,
    }
}
