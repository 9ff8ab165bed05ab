use hornet2d::Vec2;

use crate::config::GameConfig;
use crate::entities::{Enemy, GRID_TOP_FRACTION};

/// Marching state shared by the whole enemy grid.
#[derive(Debug, Clone)]
pub struct Swarm {
    pub speed: f32,
    /// Horizontal direction: +1.0 marching right, -1.0 marching left.
    pub direction: f32,
}

impl Swarm {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            direction: 1.0,
        }
    }
}

/// Lay out the enemy grid in the lower half of the window.
///
/// The top row sits at `GRID_TOP_FRACTION` of the window height and rows
/// extend downward, away from the player. The leftmost column starts one
/// spacing in from the left edge.
pub fn spawn_grid(config: &GameConfig, window: Vec2) -> Vec<Enemy> {
    let mut enemies = Vec::with_capacity(config.grid_rows * config.grid_cols);
    let top = window.y * GRID_TOP_FRACTION;

    for row in 0..config.grid_rows {
        let y = top + row as f32 * config.grid_spacing;
        for col in 0..config.grid_cols {
            let x = config.grid_spacing + col as f32 * config.grid_spacing;
            enemies.push(Enemy::new(Vec2::new(x, y), row));
        }
    }

    enemies
}

/// Horizontal extent of the living swarm: (leftmost left edge, rightmost
/// right edge). `None` when no enemy is alive.
fn alive_extent(enemies: &[Enemy]) -> Option<(f32, f32)> {
    let mut extent: Option<(f32, f32)> = None;
    for enemy in enemies.iter().filter(|e| e.alive) {
        let bounds = enemy.bounds();
        extent = Some(match extent {
            None => (bounds.left(), bounds.right()),
            Some((lo, hi)) => (lo.min(bounds.left()), hi.max(bounds.right())),
        });
    }
    extent
}

/// March the swarm for one frame.
///
/// The group moves horizontally as a unit. When the leading edge would
/// cross a wall, the movement is clamped so the extent lands exactly on
/// the wall, the direction flips once, and every living enemy steps
/// `step` pixels up toward the player. Dead enemies neither move nor
/// count toward the extent.
pub fn advance(enemies: &mut [Enemy], swarm: &mut Swarm, dt: f32, window_width: f32, step: f32) {
    let Some((lo, hi)) = alive_extent(enemies) else {
        return;
    };

    let mut dx = swarm.direction * swarm.speed * dt;
    let mut bounced = false;

    // Clamp before moving so the group never slides past an edge, even on
    // a long frame.
    if hi + dx > window_width {
        dx = window_width - hi;
        bounced = true;
    } else if lo + dx < 0.0 {
        dx = -lo;
        bounced = true;
    }

    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        enemy.position.x += dx;
        if bounced {
            enemy.position.y -= step;
        }
    }

    if bounced {
        swarm.direction = -swarm.direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ENEMY_SIZE;

    fn test_config() -> GameConfig {
        GameConfig::default()
    }

    const WINDOW: Vec2 = Vec2::new(1920.0, 1080.0);

    #[test]
    fn grid_spawns_rows_by_cols() {
        let config = test_config();
        let enemies = spawn_grid(&config, WINDOW);
        assert_eq!(enemies.len(), 32);
        assert!(enemies.iter().all(|e| e.alive));

        // Top-left enemy
        assert_eq!(enemies[0].position, Vec2::new(120.0, 1080.0 * 0.65));
        assert_eq!(enemies[0].row, 0);
        // Last enemy of the first row
        assert_eq!(enemies[7].position.x, 120.0 + 7.0 * 120.0);
        // First enemy of the second row
        assert_eq!(enemies[8].position.y, 1080.0 * 0.65 + 120.0);
        assert_eq!(enemies[8].row, 1);
    }

    #[test]
    fn swarm_marches_as_a_unit() {
        let config = test_config();
        let mut enemies = spawn_grid(&config, WINDOW);
        let mut swarm = Swarm::new(300.0);
        let before: Vec<f32> = enemies.iter().map(|e| e.position.x).collect();

        advance(&mut enemies, &mut swarm, 0.1, WINDOW.x, config.swarm_step);

        for (enemy, x) in enemies.iter().zip(before) {
            assert_eq!(enemy.position.x, x + 30.0);
        }
        assert_eq!(swarm.direction, 1.0);
    }

    #[test]
    fn wall_bounce_clamps_flips_and_steps_up() {
        let config = test_config();
        let mut enemies = spawn_grid(&config, WINDOW);
        let mut swarm = Swarm::new(300.0);
        let y_before = enemies[0].position.y;

        // March right until the first bounce
        let mut bounces = 0;
        for _ in 0..200 {
            advance(&mut enemies, &mut swarm, 0.016, WINDOW.x, config.swarm_step);
            if swarm.direction < 0.0 {
                bounces = 1;
                break;
            }
        }
        assert_eq!(bounces, 1);

        // The rightmost edge lands exactly on the wall
        let (_, hi) = super::alive_extent(&enemies).expect("swarm alive");
        assert_eq!(hi, WINDOW.x);
        // One step toward the player (up)
        assert_eq!(enemies[0].position.y, y_before - config.swarm_step);
    }

    #[test]
    fn dead_enemies_do_not_count_toward_extent() {
        let config = test_config();
        let mut enemies = spawn_grid(&config, WINDOW);

        // Kill the whole rightmost column
        for row in 0..config.grid_rows {
            enemies[row * config.grid_cols + config.grid_cols - 1].kill();
        }

        let (_, hi) = alive_extent(&enemies).expect("swarm alive");
        let expected_right = 120.0 + 6.0 * 120.0 + ENEMY_SIZE.x * 0.5;
        assert_eq!(hi, expected_right);
    }

    #[test]
    fn dead_enemies_do_not_move() {
        let config = test_config();
        let mut enemies = spawn_grid(&config, WINDOW);
        let mut swarm = Swarm::new(300.0);

        enemies[0].kill();
        let dead_pos = enemies[0].position;

        advance(&mut enemies, &mut swarm, 0.1, WINDOW.x, config.swarm_step);
        assert_eq!(enemies[0].position, dead_pos);
    }

    #[test]
    fn empty_swarm_is_a_no_op() {
        let config = test_config();
        let mut enemies = spawn_grid(&config, WINDOW);
        let mut swarm = Swarm::new(300.0);

        for enemy in &mut enemies {
            enemy.kill();
        }

        advance(&mut enemies, &mut swarm, 1.0, WINDOW.x, config.swarm_step);
        assert_eq!(swarm.direction, 1.0);
    }
}
