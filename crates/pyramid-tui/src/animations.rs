use crossterm::style::Color;
use rand::seq::SliceRandom;
use rand::Rng;

/// Confetti characters
const CONFETTI_CHARS: &[char] = &['*', '✦', '✧', '◆', '◇', '○', '●', '■', '□', '▲', '▽'];

/// A single confetti piece
#[derive(Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub char: char,
    pub color: Color,
    pub lifetime: f32,
}

impl Particle {
    pub fn is_visible(&self, width: u16, height: u16) -> bool {
        self.x >= 0.0
            && self.x < width as f32
            && self.y >= 0.0
            && self.y < height as f32
            && self.lifetime > 0.0
    }
}

/// Falling confetti shown while a solve is being celebrated
pub struct Confetti {
    particles: Vec<Particle>,
    hue_offset: f32,
    pub width: u16,
    pub height: u16,
}

impl Default for Confetti {
    fn default() -> Self {
        Self::new()
    }
}

impl Confetti {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            hue_offset: 0.0,
            width: 80,
            height: 24,
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Advance one frame; new pieces only fall while `spawning`
    pub fn update(&mut self, spawning: bool) {
        self.hue_offset = (self.hue_offset + 0.02) % 1.0;

        let floor = self.height as f32 + 2.0;
        self.particles.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.vy = (p.vy + 0.05).min(1.2);
            p.lifetime -= 0.033;
            p.lifetime > 0.0 && p.y < floor
        });

        if spawning {
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            let hue = (self.hue_offset + rng.gen_range(0.0..0.3)) % 1.0;
            self.particles.push(Particle {
                x: rng.gen_range(0.0..self.width.max(1) as f32),
                y: -1.0,
                vx: rng.gen_range(-0.4..0.4),
                vy: rng.gen_range(0.2..0.8),
                char: CONFETTI_CHARS.choose(&mut rng).copied().unwrap_or('*'),
                color: hue_to_rgb(hue),
                lifetime: rng.gen_range(2.0..4.5),
            });
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Convert hue (0.0-1.0) to RGB color
pub fn hue_to_rgb(hue: f32) -> Color {
    let h = hue * 6.0;
    let x = (1.0 - (h % 2.0 - 1.0).abs()) * 255.0;

    let (r, g, b) = match h as i32 % 6 {
        0 => (255, x as u8, 0),
        1 => (x as u8, 255, 0),
        2 => (0, 255, x as u8),
        3 => (0, x as u8, 255),
        4 => (x as u8, 0, 255),
        _ => (255, 0, x as u8),
    };

    Color::Rgb { r, g, b }
}
