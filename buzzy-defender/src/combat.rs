use hornet2d::Vec2;

use crate::entities::{Buzzy, Enemy, LaserBlast, ShotOwner};

/// Resolve player shots against the swarm.
///
/// Each shot destroys at most the first alive enemy it overlaps and is
/// consumed by the hit. Returns the number of enemies destroyed this
/// frame. Enemy shots pass through the swarm untouched.
pub fn resolve_player_shots(shots: &mut Vec<LaserBlast>, enemies: &mut [Enemy]) -> usize {
    let mut killed = 0;

    shots.retain(|shot| {
        if shot.owner != ShotOwner::Player {
            return true;
        }

        let shot_bounds = shot.bounds();
        for enemy in enemies.iter_mut() {
            if enemy.alive && enemy.bounds().intersects(&shot_bounds) {
                enemy.kill();
                killed += 1;
                return false;
            }
        }
        true
    });

    killed
}

/// Check enemy shots against the player, removing any that connect.
///
/// Returns true if the player was hit this frame.
pub fn enemy_shot_hits_buzzy(shots: &mut Vec<LaserBlast>, buzzy: &Buzzy) -> bool {
    let buzzy_bounds = buzzy.bounds();
    let mut hit = false;

    shots.retain(|shot| {
        if shot.owner == ShotOwner::Enemy && shot.bounds().intersects(&buzzy_bounds) {
            hit = true;
            false
        } else {
            true
        }
    });

    hit
}

/// True if any living enemy overlaps the player sprite.
pub fn buzzy_touched(enemies: &[Enemy], buzzy: &Buzzy) -> bool {
    let buzzy_bounds = buzzy.bounds();
    enemies
        .iter()
        .any(|enemy| enemy.alive && enemy.bounds().intersects(&buzzy_bounds))
}

/// Win predicate: every enemy is dead.
pub fn swarm_cleared(enemies: &[Enemy]) -> bool {
    enemies.iter().all(|enemy| !enemy.alive)
}

/// Drop laser blasts that have left the vertical playfield.
pub fn cull_shots(shots: &mut Vec<LaserBlast>, window_height: f32) {
    shots.retain(|shot| !shot.is_off_screen(window_height));
}

/// Result of one frame's collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    Won,
    Lost,
}

/// Resolve one frame's collisions and decide the round.
///
/// Player shots are resolved first, then the lose checks (enemy shot
/// hit, enemy touch), then the win check. The ordering matters: a frame
/// where the last enemy dies while the player is hit is a loss.
pub fn resolve_round(
    shots: &mut Vec<LaserBlast>,
    enemies: &mut [Enemy],
    buzzy: &Buzzy,
) -> RoundStatus {
    resolve_player_shots(shots, enemies);

    let shot_down = enemy_shot_hits_buzzy(shots, buzzy);
    if shot_down || buzzy_touched(enemies, buzzy) {
        return RoundStatus::Lost;
    }

    if swarm_cleared(enemies) {
        return RoundStatus::Won;
    }

    RoundStatus::InProgress
}

/// Drives the enemy fire cadence.
///
/// Accumulates frame time; each time the interval elapses, a uniformly
/// random living enemy fires a blast upward from its top edge. With no
/// living enemies the interval elapses silently.
#[derive(Debug, Clone)]
pub struct FireScheduler {
    interval: f32,
    accumulator: f32,
}

impl FireScheduler {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
        }
    }

    /// Advance the schedule by `dt` seconds and fire if due.
    pub fn tick(&mut self, dt: f32, enemies: &[Enemy], shot_speed: f32) -> Option<LaserBlast> {
        self.accumulator += dt;
        if self.accumulator < self.interval {
            return None;
        }
        self.accumulator -= self.interval;

        let alive: Vec<&Enemy> = enemies.iter().filter(|e| e.alive).collect();
        if alive.is_empty() {
            return None;
        }

        let shooter = alive[fastrand::usize(..alive.len())];
        let muzzle = Vec2::new(shooter.position.x, shooter.bounds().top());
        Some(LaserBlast::new(
            muzzle,
            Vec2::new(0.0, -shot_speed),
            ShotOwner::Enemy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ENEMY_SIZE;

    fn enemy_at(x: f32, y: f32) -> Enemy {
        Enemy::new(Vec2::new(x, y), 0)
    }

    fn player_shot_at(x: f32, y: f32) -> LaserBlast {
        LaserBlast::new(Vec2::new(x, y), Vec2::new(0.0, 400.0), ShotOwner::Player)
    }

    #[test]
    fn player_shot_kills_overlapping_enemy_and_is_consumed() {
        let mut enemies = vec![enemy_at(500.0, 700.0), enemy_at(800.0, 700.0)];
        let mut shots = vec![player_shot_at(500.0, 700.0)];

        let killed = resolve_player_shots(&mut shots, &mut enemies);

        assert_eq!(killed, 1);
        assert!(!enemies[0].alive);
        assert!(enemies[1].alive);
        assert!(shots.is_empty());
    }

    #[test]
    fn player_shot_misses_dead_enemy() {
        let mut enemies = vec![enemy_at(500.0, 700.0)];
        enemies[0].kill();
        let mut shots = vec![player_shot_at(500.0, 700.0)];

        let killed = resolve_player_shots(&mut shots, &mut enemies);

        assert_eq!(killed, 0);
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn player_shot_kills_only_one_enemy() {
        // Two enemies stacked on the same spot; one shot, one kill
        let mut enemies = vec![enemy_at(500.0, 700.0), enemy_at(500.0, 700.0)];
        let mut shots = vec![player_shot_at(500.0, 700.0)];

        let killed = resolve_player_shots(&mut shots, &mut enemies);

        assert_eq!(killed, 1);
        assert!(enemies.iter().any(|e| e.alive));
    }

    #[test]
    fn enemy_shot_hit_is_detected_and_removed() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut shots = vec![
            LaserBlast::new(buzzy.position, Vec2::new(0.0, -300.0), ShotOwner::Enemy),
            LaserBlast::new(Vec2::new(0.0, 900.0), Vec2::new(0.0, -300.0), ShotOwner::Enemy),
        ];

        assert!(enemy_shot_hits_buzzy(&mut shots, &buzzy));
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn player_own_shot_does_not_hit_player() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut shots = vec![LaserBlast::new(
            buzzy.position,
            Vec2::new(0.0, 400.0),
            ShotOwner::Player,
        )];

        assert!(!enemy_shot_hits_buzzy(&mut shots, &buzzy));
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn touch_requires_living_enemy() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut enemies = vec![enemy_at(buzzy.position.x, buzzy.position.y)];
        assert!(buzzy_touched(&enemies, &buzzy));

        enemies[0].kill();
        assert!(!buzzy_touched(&enemies, &buzzy));
    }

    #[test]
    fn swarm_cleared_only_when_all_dead() {
        let mut enemies = vec![enemy_at(100.0, 700.0), enemy_at(300.0, 700.0)];
        assert!(!swarm_cleared(&enemies));

        enemies[0].kill();
        assert!(!swarm_cleared(&enemies));

        enemies[1].kill();
        assert!(swarm_cleared(&enemies));
        assert!(swarm_cleared(&[]));
    }

    #[test]
    fn cull_drops_only_off_screen_shots() {
        let mut shots = vec![
            player_shot_at(100.0, 500.0),
            player_shot_at(100.0, 2000.0),
            LaserBlast::new(Vec2::new(100.0, -100.0), Vec2::new(0.0, -300.0), ShotOwner::Enemy),
        ];

        cull_shots(&mut shots, 1080.0);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].position.y, 500.0);
    }

    #[test]
    fn scheduler_fires_after_interval() {
        let enemies = vec![enemy_at(640.0, 700.0)];
        let mut scheduler = FireScheduler::new(0.5);

        assert!(scheduler.tick(0.3, &enemies, 300.0).is_none());
        let shot = scheduler.tick(0.3, &enemies, 300.0).expect("fire due");

        assert_eq!(shot.owner, ShotOwner::Enemy);
        assert_eq!(shot.velocity, Vec2::new(0.0, -300.0));
        // Fired from the shooter's top edge, aimed at the player
        assert_eq!(shot.position, Vec2::new(640.0, 700.0 - ENEMY_SIZE.y * 0.5));
    }

    #[test]
    fn scheduler_skips_fire_with_no_living_enemies() {
        let mut enemies = vec![enemy_at(640.0, 700.0)];
        enemies[0].kill();
        let mut scheduler = FireScheduler::new(0.5);

        assert!(scheduler.tick(1.0, &enemies, 300.0).is_none());
    }

    #[test]
    fn round_continues_while_both_sides_stand() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut enemies = vec![enemy_at(500.0, 700.0)];
        let mut shots = vec![];

        assert_eq!(
            resolve_round(&mut shots, &mut enemies, &buzzy),
            RoundStatus::InProgress
        );
    }

    #[test]
    fn round_won_when_last_enemy_falls() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut enemies = vec![enemy_at(500.0, 700.0)];
        let mut shots = vec![player_shot_at(500.0, 700.0)];

        assert_eq!(
            resolve_round(&mut shots, &mut enemies, &buzzy),
            RoundStatus::Won
        );
    }

    #[test]
    fn round_lost_when_player_shot_down() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut enemies = vec![enemy_at(500.0, 700.0)];
        let mut shots = vec![LaserBlast::new(
            buzzy.position,
            Vec2::new(0.0, -300.0),
            ShotOwner::Enemy,
        )];

        assert_eq!(
            resolve_round(&mut shots, &mut enemies, &buzzy),
            RoundStatus::Lost
        );
        assert!(enemies[0].alive);
    }

    #[test]
    fn simultaneous_last_kill_and_player_hit_is_a_loss() {
        let buzzy = Buzzy::new(Vec2::new(1920.0, 1080.0), 450.0);
        let mut enemies = vec![enemy_at(500.0, 700.0)];
        let mut shots = vec![
            // Player shot overlapping the last enemy
            player_shot_at(500.0, 700.0),
            // Enemy shot overlapping the player, same frame
            LaserBlast::new(buzzy.position, Vec2::new(0.0, -300.0), ShotOwner::Enemy),
        ];

        assert_eq!(
            resolve_round(&mut shots, &mut enemies, &buzzy),
            RoundStatus::Lost
        );
        // The kill still happened; the loss simply outranks it
        assert!(!enemies[0].alive);
    }

    #[test]
    fn scheduler_picks_a_living_shooter() {
        let mut enemies = vec![
            enemy_at(100.0, 700.0),
            enemy_at(300.0, 700.0),
            enemy_at(500.0, 700.0),
        ];
        enemies[0].kill();
        enemies[2].kill();
        let mut scheduler = FireScheduler::new(0.5);

        let shot = scheduler.tick(0.5, &enemies, 300.0).expect("fire due");
        assert_eq!(shot.position.x, 300.0);
    }
}
