//! Game module - same-screen maze race
//!
//! The simulation runs inside `ActiveMatch`; Bevy only feeds it key events,
//! advances it once per frame and mirrors runner positions onto sprites.
//! Player 1 steers with the arrow keys, player 2 with W/A/S/D.

use std::sync::Arc;

use bevy::input::keyboard::{KeyboardFocusLost, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use maze_runners::game::{
    clock::SystemTimeSource,
    entity::{Entity as _, Runner},
    maze::{Maze, Tile, TileMaze},
    session::MatchSession,
};
use maze_runners::{Direction, KeyMap, PlayerSlot, SimConfig};

use crate::AppState;

pub mod components;

pub use components::*;

// ============================================================================
// GAME PLUGIN
// ============================================================================

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<KeyBindings>()

            .add_systems(Startup, load_settings)

            // Match setup/cleanup
            .add_systems(OnEnter(AppState::Playing), setup_match)
            .add_systems(OnExit(AppState::GameOver), cleanup_match)

            // Per frame: input, simulation, sprites, outcome
            .add_systems(Update, (
                capture_input,
                advance_match,
                sync_runner_sprites,
                detect_game_over,
            ).chain()
                .run_if(in_state(AppState::Playing))
                .run_if(resource_exists::<ActiveMatch>));
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Simulation tunables and the maze every match is played on.
#[derive(Resource, Clone)]
pub struct MatchSettings {
    pub config: SimConfig,
    pub maze: Arc<TileMaze>,
}

/// The running match.
#[derive(Resource)]
pub struct ActiveMatch {
    pub session: MatchSession<SystemTimeSource, Runner<TileMaze>>,
}

/// Keyboard to player/direction mapping.
#[derive(Resource)]
pub struct KeyBindings(pub KeyMap<KeyCode>);

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = KeyMap::new();
        map.bind_player(
            PlayerSlot::One,
            [KeyCode::ArrowUp, KeyCode::ArrowDown, KeyCode::ArrowLeft, KeyCode::ArrowRight],
        )
        .bind_player(
            PlayerSlot::Two,
            [KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD],
        );
        Self(map)
    }
}

// ============================================================================
// SETUP
// ============================================================================

/// Read an optional config path from the command line. Bad files are
/// reported and replaced by defaults.
fn load_settings(mut commands: Commands) {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path).unwrap_or_else(|e| {
            error!("Ignoring config {}: {}", path, e);
            SimConfig::default()
        }),
        None => SimConfig::default(),
    };

    let maze = match &config.maze_path {
        Some(path) => TileMaze::load(path).unwrap_or_else(|e| {
            error!("Ignoring maze {}: {}", path.display(), e);
            TileMaze::classic()
        }),
        None => TileMaze::classic(),
    };

    let (columns, rows) = maze.dimensions();
    info!("Maze {}x{}, step {} ms", columns, rows, config.fixed_step_ms);

    commands.insert_resource(BoardLayout { columns, rows });
    commands.insert_resource(MatchSettings { config, maze: Arc::new(maze) });
}

fn setup_match(mut commands: Commands, settings: Res<MatchSettings>, layout: Res<BoardLayout>) {
    let session = MatchSession::for_maze(
        Arc::clone(&settings.maze),
        SystemTimeSource::new(),
        &settings.config,
    );

    spawn_board(&mut commands, &settings.maze, &layout);

    for player in PlayerSlot::ALL {
        let runner = session.runner(player);
        let side = runner.half_size() * 2.0 * TILE_PX;
        commands.spawn((
            RunnerSprite { player },
            BoardEntity,
            Name::new(player.to_string()),
            Sprite {
                color: player_color(player),
                custom_size: Some(Vec2::splat(side)),
                ..default()
            },
            Transform::from_translation(layout.to_world(runner.position()).extend(10.0)),
        ));
    }

    commands.insert_resource(ActiveMatch { session });
    info!("Match started");
}

/// One sprite per tile; goals take their player's tint.
fn spawn_board(commands: &mut Commands, maze: &TileMaze, layout: &BoardLayout) {
    for (ty, row) in maze.rows().enumerate() {
        for (tx, tile) in row.iter().enumerate() {
            let color = match tile {
                Tile::Wall => WALL_COLOR,
                Tile::Floor => FLOOR_COLOR,
                Tile::Goal(player) => player_color(*player).with_alpha(0.35),
            };
            commands.spawn((
                BoardEntity,
                Sprite {
                    color,
                    custom_size: Some(Vec2::splat(TILE_PX)),
                    ..default()
                },
                Transform::from_translation(layout.tile_to_world(tx, ty).extend(0.0)),
            ));
        }
    }
}

fn cleanup_match(mut commands: Commands, entities: Query<Entity, With<BoardEntity>>) {
    for entity in entities.iter() {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<ActiveMatch>();
}

// ============================================================================
// FRAME SYSTEMS
// ============================================================================

/// Forward mapped key presses and releases to the match. Losing focus
/// releases everything, since the matching key-up events never arrive.
fn capture_input(
    mut keys: EventReader<KeyboardInput>,
    mut focus_lost: EventReader<KeyboardFocusLost>,
    bindings: Res<KeyBindings>,
    mut active: ResMut<ActiveMatch>,
) {
    if !focus_lost.is_empty() {
        focus_lost.clear();
        active.session.release_all_input();
    }

    for key in keys.read() {
        let pressed = key.state == ButtonState::Pressed;
        if let Some(event) = bindings.0.translate(&key.key_code, pressed) {
            active.session.apply_input(event);
        }
    }
}

fn advance_match(mut active: ResMut<ActiveMatch>) {
    let report = active.session.advance_frame();
    if report.budget.was_capped() {
        debug!("Frame {} dropped {} ms of catch-up", report.frame, report.budget.dropped_ms);
    }
}

/// Mirror positions and facing; runners with a held control pulse.
fn sync_runner_sprites(
    active: Res<ActiveMatch>,
    layout: Res<BoardLayout>,
    time: Res<Time>,
    mut sprites: Query<(&RunnerSprite, &mut Transform, &mut Sprite)>,
) {
    let view = active.session.view();
    for (runner, mut transform, mut sprite) in sprites.iter_mut() {
        let world = layout.to_world(view.positions[runner.player.index()]);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
        let moving = view.state.is_in_progress() && active.session.input().any_pressed(runner.player);
        transform.scale = Vec3::splat(stride_scale(moving, time.elapsed_secs()));
        sprite.flip_x = active.session.runner(runner.player).facing() == Direction::Left;
    }
}

fn detect_game_over(active: Res<ActiveMatch>, mut next_state: ResMut<NextState<AppState>>) {
    let state = active.session.state();
    if state.is_terminal() {
        info!("{} after {} ticks", state, active.session.ticks());
        next_state.set(AppState::GameOver);
    }
}
