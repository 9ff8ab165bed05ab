use hornet2d::{Rect, Vec2};

/// On-screen pixel size of the player sprite.
pub const BUZZY_SIZE: Vec2 = Vec2::new(110.0, 110.0);
/// On-screen pixel size of each enemy sprite.
pub const ENEMY_SIZE: Vec2 = Vec2::new(90.0, 90.0);
/// On-screen pixel size of a laser blast.
pub const LASER_SIZE: Vec2 = Vec2::new(12.0, 48.0);

/// Vertical placement of the player's center as a fraction of window height.
pub const BUZZY_Y_FRACTION: f32 = 0.25;
/// Vertical placement of the swarm's top row as a fraction of window height.
pub const GRID_TOP_FRACTION: f32 = 0.65;

/// The player sprite. Moves horizontally along a fixed line near the top
/// of the screen.
#[derive(Debug, Clone)]
pub struct Buzzy {
    pub position: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl Buzzy {
    /// Place the player centered horizontally at its fixed vertical line.
    pub fn new(window: Vec2, speed: f32) -> Self {
        Self {
            position: Vec2::new(window.x * 0.5, window.y * BUZZY_Y_FRACTION),
            size: BUZZY_SIZE,
            speed,
        }
    }

    /// Integrate horizontal movement for one frame.
    ///
    /// `axis` is the movement input in [-1, 1]. The position is clamped so
    /// the whole sprite stays inside the window.
    pub fn advance(&mut self, dt: f32, axis: f32, window_width: f32) {
        self.position.x += axis * self.speed * dt;

        let half = self.size.x * 0.5;
        self.position.x = self.position.x.clamp(half, window_width - half);
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }
}

/// A single swarm enemy.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub position: Vec2,
    pub size: Vec2,
    /// Grid row this enemy spawned in. Even and odd rows use different
    /// sprite art.
    pub row: usize,
    pub alive: bool,
}

impl Enemy {
    pub fn new(position: Vec2, row: usize) -> Self {
        Self {
            position,
            size: ENEMY_SIZE,
            row,
            alive: true,
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }
}

/// Who fired a laser blast. Player shots only hurt enemies and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOwner {
    Player,
    Enemy,
}

/// A laser blast in flight. Player shots travel down toward the swarm,
/// enemy shots travel up toward the player.
#[derive(Debug, Clone)]
pub struct LaserBlast {
    pub position: Vec2,
    pub velocity: Vec2,
    pub owner: ShotOwner,
}

impl LaserBlast {
    pub fn new(position: Vec2, velocity: Vec2, owner: ShotOwner) -> Self {
        Self {
            position,
            velocity,
            owner,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// True once the blast is completely outside the vertical playfield.
    pub fn is_off_screen(&self, window_height: f32) -> bool {
        let bounds = self.bounds();
        bounds.bottom() < 0.0 || bounds.top() > window_height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, LASER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buzzy_moves_with_axis_input() {
        let mut buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let start_x = buzzy.position.x;

        buzzy.advance(0.1, 1.0, 1920.0);
        assert_eq!(buzzy.position.x, start_x + 45.0);

        buzzy.advance(0.1, -1.0, 1920.0);
        assert_eq!(buzzy.position.x, start_x);

        let y = buzzy.position.y;
        buzzy.advance(0.1, 0.0, 1920.0);
        assert_eq!(buzzy.position.y, y);
    }

    #[test]
    fn buzzy_clamps_at_both_walls() {
        let mut buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);

        for _ in 0..200 {
            buzzy.advance(0.1, -1.0, 1920.0);
        }
        assert_eq!(buzzy.position.x, buzzy.size.x * 0.5);
        assert_eq!(buzzy.bounds().left(), 0.0);

        for _ in 0..200 {
            buzzy.advance(0.1, 1.0, 1920.0);
        }
        assert_eq!(buzzy.position.x, 1920.0 - buzzy.size.x * 0.5);
        assert_eq!(buzzy.bounds().right(), 1920.0);
    }

    #[test]
    fn enemy_kill_clears_alive_flag() {
        let mut enemy = Enemy::new(Vec2::new(500.0, 700.0), 2);
        assert!(enemy.alive);
        enemy.kill();
        assert!(!enemy.alive);
    }

    #[test]
    fn laser_advances_along_velocity() {
        let mut shot = LaserBlast::new(
            Vec2::new(100.0, 500.0),
            Vec2::new(0.0, 400.0),
            ShotOwner::Player,
        );
        shot.advance(0.5);
        assert_eq!(shot.position, Vec2::new(100.0, 700.0));
    }

    #[test]
    fn laser_off_screen_only_when_fully_outside() {
        let half = LASER_SIZE.y * 0.5;

        // Straddling the top edge is still on screen
        let above = LaserBlast::new(Vec2::new(0.0, 0.0), Vec2::ZERO, ShotOwner::Enemy);
        assert!(!above.is_off_screen(1080.0));

        let gone_up = LaserBlast::new(
            Vec2::new(0.0, -half - 1.0),
            Vec2::ZERO,
            ShotOwner::Enemy,
        );
        assert!(gone_up.is_off_screen(1080.0));

        let gone_down = LaserBlast::new(
            Vec2::new(0.0, 1080.0 + half + 1.0),
            Vec2::ZERO,
            ShotOwner::Player,
        );
        assert!(gone_down.is_off_screen(1080.0));
    }
}
