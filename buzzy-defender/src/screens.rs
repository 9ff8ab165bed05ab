use anyhow::{anyhow, Result};
use hornet2d::{
    ActionId, AxisBinding, Camera2D, EngineContext, Frame, InputMap, KeyCode, Renderer, Sprite,
    State, StateMachineLike, TextureHandle, Vec2,
};

use crate::combat::{self, FireScheduler, RoundStatus};
use crate::config::GameConfig;
use crate::entities::{Buzzy, Enemy, LaserBlast, ShotOwner, LASER_SIZE};
use crate::swarm::{self, Swarm};
use crate::textures::GameTextures;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Enemy blasts share the laser texture and are tinted warm to read
/// differently from the player's shots.
const ENEMY_SHOT_TINT: [f32; 4] = [1.0, 0.45, 0.35, 1.0];

/// Draw a texture centered at `position` with an exact on-screen size.
fn draw_texture(
    renderer: &mut Renderer,
    frame: &mut Frame,
    camera: &Camera2D,
    texture: TextureHandle,
    position: Vec2,
    size: Vec2,
    tint: [f32; 4],
) -> Result<()> {
    let (tw, th) = renderer
        .texture_size(texture)
        .ok_or_else(|| anyhow!("texture not loaded"))?;

    let mut sprite = Sprite::new(texture);
    sprite.transform.position = position;
    sprite.set_size_px(size, Vec2::new(tw as f32, th as f32));
    sprite.tint = tint;
    renderer.draw_sprite(frame, &sprite, camera)
}

/// Draw a texture stretched over the whole window.
fn draw_backdrop(
    renderer: &mut Renderer,
    frame: &mut Frame,
    camera: &Camera2D,
    texture: TextureHandle,
) -> Result<()> {
    let (w, h) = renderer.surface_size();
    let window = Vec2::new(w as f32, h as f32);
    draw_texture(renderer, frame, camera, texture, window * 0.5, window, WHITE)
}

/// Title screen. Enter begins a round.
pub struct StartScreen {
    config: GameConfig,
    textures: Option<GameTextures>,
}

impl StartScreen {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            textures: None,
        }
    }
}

impl State for StartScreen {
    fn on_enter(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.textures = Some(GameTextures::load(ctx, &self.config.assets_dir)?);
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &mut EngineContext,
        state_machine: &mut dyn StateMachineLike,
    ) -> Result<()> {
        if ctx.input().is_key_pressed(KeyCode::Enter) {
            state_machine.replace(Box::new(PlayScreen::new(self.config.clone())));
        }
        Ok(())
    }

    fn draw(&mut self, renderer: &mut Renderer, frame: &mut Frame) -> Result<()> {
        let Some(textures) = &self.textures else {
            return Ok(());
        };
        let camera = Camera2D::default();
        draw_backdrop(renderer, frame, &camera, textures.start_backdrop)
    }
}

/// The live round: player movement, shots, the marching swarm, and the
/// win/lose checks.
pub struct PlayScreen {
    config: GameConfig,
    textures: Option<GameTextures>,
    camera: Camera2D,
    move_axis: ActionId,
    fire_action: ActionId,
    input_map: InputMap,
    buzzy: Buzzy,
    enemies: Vec<Enemy>,
    shots: Vec<LaserBlast>,
    swarm: Swarm,
    scheduler: FireScheduler,
}

impl PlayScreen {
    pub fn new(config: GameConfig) -> Self {
        let window = Vec2::new(config.window_width as f32, config.window_height as f32);

        let move_axis = ActionId::new("move");
        let fire_action = ActionId::new("fire");
        let mut input_map = InputMap::new();
        input_map.set_axis(
            move_axis.clone(),
            AxisBinding::new(
                vec![KeyCode::ArrowLeft, KeyCode::KeyA],
                vec![KeyCode::ArrowRight, KeyCode::KeyD],
            ),
        );
        input_map.bind_key(fire_action.clone(), KeyCode::Space);

        let buzzy = Buzzy::new(window, config.player_speed);
        let enemies = swarm::spawn_grid(&config, window);
        let swarm = Swarm::new(config.swarm_speed);
        let scheduler = FireScheduler::new(config.fire_interval);

        Self {
            config,
            textures: None,
            camera: Camera2D::default(),
            move_axis,
            fire_action,
            input_map,
            buzzy,
            enemies,
            shots: Vec::new(),
            swarm,
            scheduler,
        }
    }

    fn spawn_player_shot(&mut self) {
        let muzzle = Vec2::new(
            self.buzzy.position.x,
            self.buzzy.bounds().bottom() + LASER_SIZE.y * 0.5,
        );
        self.shots.push(LaserBlast::new(
            muzzle,
            Vec2::new(0.0, self.config.player_shot_speed),
            ShotOwner::Player,
        ));
    }
}

impl State for PlayScreen {
    fn on_enter(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.textures = Some(GameTextures::load(ctx, &self.config.assets_dir)?);
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &mut EngineContext,
        state_machine: &mut dyn StateMachineLike,
    ) -> Result<()> {
        let dt = ctx.delta_time().as_secs_f32();
        let window = Vec2::new(
            self.config.window_width as f32,
            self.config.window_height as f32,
        );

        let axis = self.input_map.axis(ctx.input(), &self.move_axis);
        self.buzzy.advance(dt, axis, window.x);

        if self.input_map.action_pressed(ctx.input(), &self.fire_action) {
            self.spawn_player_shot();
        }

        if let Some(shot) = self
            .scheduler
            .tick(dt, &self.enemies, self.config.enemy_shot_speed)
        {
            self.shots.push(shot);
        }

        for shot in &mut self.shots {
            shot.advance(dt);
        }
        combat::cull_shots(&mut self.shots, window.y);

        swarm::advance(
            &mut self.enemies,
            &mut self.swarm,
            dt,
            window.x,
            self.config.swarm_step,
        );

        match combat::resolve_round(&mut self.shots, &mut self.enemies, &self.buzzy) {
            RoundStatus::Lost => state_machine.replace(Box::new(OutcomeScreen::new(
                self.config.clone(),
                Outcome::Lost,
            ))),
            RoundStatus::Won => state_machine.replace(Box::new(OutcomeScreen::new(
                self.config.clone(),
                Outcome::Won,
            ))),
            RoundStatus::InProgress => {}
        }

        Ok(())
    }

    fn draw(&mut self, renderer: &mut Renderer, frame: &mut Frame) -> Result<()> {
        let Some(textures) = &self.textures else {
            return Ok(());
        };

        draw_backdrop(renderer, frame, &self.camera, textures.background)?;

        draw_texture(
            renderer,
            frame,
            &self.camera,
            textures.buzzy,
            self.buzzy.position,
            self.buzzy.size,
            WHITE,
        )?;

        for enemy in self.enemies.iter().filter(|e| e.alive) {
            draw_texture(
                renderer,
                frame,
                &self.camera,
                textures.enemy_for_row(enemy.row),
                enemy.position,
                enemy.size,
                WHITE,
            )?;
        }

        for shot in &self.shots {
            let tint = match shot.owner {
                ShotOwner::Player => WHITE,
                ShotOwner::Enemy => ENEMY_SHOT_TINT,
            };
            draw_texture(
                renderer,
                frame,
                &self.camera,
                textures.laser,
                shot.position,
                LASER_SIZE,
                tint,
            )?;
        }

        Ok(())
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Post-round screen. Enter returns to the start screen for a fresh round.
pub struct OutcomeScreen {
    config: GameConfig,
    outcome: Outcome,
    textures: Option<GameTextures>,
}

impl OutcomeScreen {
    pub fn new(config: GameConfig, outcome: Outcome) -> Self {
        Self {
            config,
            outcome,
            textures: None,
        }
    }
}

impl State for OutcomeScreen {
    fn on_enter(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.textures = Some(GameTextures::load(ctx, &self.config.assets_dir)?);
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &mut EngineContext,
        state_machine: &mut dyn StateMachineLike,
    ) -> Result<()> {
        if ctx.input().is_key_pressed(KeyCode::Enter) {
            state_machine.replace(Box::new(StartScreen::new(self.config.clone())));
        }
        Ok(())
    }

    fn draw(&mut self, renderer: &mut Renderer, frame: &mut Frame) -> Result<()> {
        let Some(textures) = &self.textures else {
            return Ok(());
        };
        let camera = Camera2D::default();
        let backdrop = match self.outcome {
            Outcome::Won => textures.win_backdrop,
            Outcome::Lost => textures.lose_backdrop,
        };
        draw_backdrop(renderer, frame, &camera, backdrop)
    }
}
