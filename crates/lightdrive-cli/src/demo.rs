//! Built-in demo state: a box bouncing around the view

use lightdrive_core::{Color, Result};
use lightdrive_render::Canvas;
use lightdrive_runtime::{KeyCode, Keyboard, StateLayer};

const BACKGROUND: Color = Color::from_hex(0x1d2330);
const BOX_COLOR: Color = Color::from_hex(0xf2b134);
const BOX_SIZE: f32 = 12.0;
/// Pixels per update tick
const SPEED: f32 = 1.5;

pub struct BouncingBox {
    width: f32,
    height: f32,
    pos: (f32, f32),
    vel: (f32, f32),
    paused: bool,
    pub ticks: u64,
    pub frames: u64,
}

impl BouncingBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            pos: (0.0, 0.0),
            vel: (SPEED, SPEED * 0.75),
            paused: false,
            ticks: 0,
            frames: 0,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        self.pos
    }
}

/// Reflect `pos` off `[0, limit]`, flipping `vel` on contact
fn bounce(pos: &mut f32, vel: &mut f32, limit: f32) {
    *pos += *vel;
    if *pos < 0.0 {
        *pos = -*pos;
        *vel = -*vel;
    } else if *pos > limit {
        *pos = (2.0 * limit - *pos).max(0.0);
        *vel = -*vel;
    }
}

impl StateLayer for BouncingBox {
    fn init(&mut self) -> Result<()> {
        self.pos = (
            ((self.width - BOX_SIZE) / 2.0).max(0.0),
            ((self.height - BOX_SIZE) / 2.0).max(0.0),
        );
        log::debug!("Demo state ready in a {}x{} view", self.width, self.height);
        Ok(())
    }

    fn update(&mut self, delta: f64) -> Result<()> {
        self.ticks += 1;
        if self.paused {
            return Ok(());
        }
        let step = delta as f32;
        let (mut vx, mut vy) = (self.vel.0 * step, self.vel.1 * step);
        bounce(&mut self.pos.0, &mut vx, (self.width - BOX_SIZE).max(0.0));
        bounce(&mut self.pos.1, &mut vy, (self.height - BOX_SIZE).max(0.0));
        self.vel = (vx.signum() * self.vel.0.abs(), vy.signum() * self.vel.1.abs());
        Ok(())
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) -> Result<()> {
        self.frames += 1;
        canvas.clear(BACKGROUND);
        canvas.fill_rect_f(self.pos.0, self.pos.1, BOX_SIZE, BOX_SIZE, BOX_COLOR);
        Ok(())
    }

    fn keyboard_input(&mut self, keyboard: &Keyboard) {
        if keyboard.just_pressed(KeyCode::SPACE) {
            self.paused = !self.paused;
        }
    }

    fn shutdown(&mut self) {
        log::debug!("Demo state ran {} ticks, {} frames", self.ticks, self.frames);
    }
}
