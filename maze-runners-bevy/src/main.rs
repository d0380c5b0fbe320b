//! Maze Runners - same-screen two-player maze race
//!
//! Both players share one keyboard: arrows for player 1, WASD for player 2.
//! First runner onto their own goal tile wins.

mod game;
mod ui;

use bevy::prelude::*;
use bevy::window::WindowMode;

use game::GamePlugin;
use ui::UiPlugin;

/// Game states
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    MainMenu,
    Playing,
    GameOver,
}

fn main() {
    App::new()
        // Bevy defaults with custom window
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Maze Runners!".into(),
                resolution: (856., 720.).into(),
                resizable: false,
                mode: WindowMode::Windowed,
                ..default()
            }),
            ..default()
        }))
        // Game state
        .init_state::<AppState>()
        // Our plugins
        .add_plugins((
            GamePlugin,
            UiPlugin,
        ))
        // Startup
        .add_systems(Startup, setup_2d_camera)
        .run();
}

fn setup_2d_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.02, 0.02, 0.05)),
            ..default()
        },
    ));

    info!("Maze Runners v{} initialized", maze_runners::VERSION);
}
