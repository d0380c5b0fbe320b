//! UI module - menu, HUD and the split-screen result

use bevy::prelude::*;
use maze_runners::{MatchState, PlayerSlot};

use crate::AppState;
use crate::game::{player_color, ActiveMatch};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_systems(OnEnter(AppState::MainMenu), setup_main_menu)
            .add_systems(OnExit(AppState::MainMenu), cleanup::<MainMenuUI>)
            .add_systems(OnEnter(AppState::Playing), setup_hud)
            .add_systems(OnExit(AppState::Playing), cleanup::<HudUI>)
            .add_systems(OnEnter(AppState::GameOver), setup_game_over)
            .add_systems(OnExit(AppState::GameOver), cleanup::<GameOverUI>)
            .add_systems(Update, (
                handle_menu_buttons.run_if(in_state(AppState::MainMenu)),
                update_hud
                    .run_if(in_state(AppState::Playing))
                    .run_if(resource_exists::<ActiveMatch>),
                handle_game_over_input.run_if(in_state(AppState::GameOver)),
            ));
    }
}

/// Win half background
const WIN_COLOR: Color = Color::srgb(0.1, 0.55, 0.2);

/// Lose half background
const LOSE_COLOR: Color = Color::srgb(0.6, 0.1, 0.1);

/// Marker for main menu UI
#[derive(Component)]
struct MainMenuUI;

/// Marker for HUD UI
#[derive(Component)]
struct HudUI;

/// Marker for the result overlay
#[derive(Component)]
struct GameOverUI;

/// Marker for the elapsed time text
#[derive(Component)]
struct ClockText;

/// Button actions
#[derive(Component)]
enum MenuButton {
    Race,
    Quit,
}

// ============================================================================
// MAIN MENU
// ============================================================================

fn setup_main_menu(mut commands: Commands) {
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::srgba(0.02, 0.02, 0.05, 0.98)),
        MainMenuUI,
    )).with_children(|parent| {
        parent.spawn((
            Text::new("MAZE RUNNERS"),
            TextFont {
                font_size: 72.0,
                ..default()
            },
            TextColor(Color::srgb(0.4, 0.8, 1.0)),
            Node {
                margin: UiRect::bottom(Val::Px(40.0)),
                ..default()
            },
        ));

        spawn_menu_button(parent, "RACE", MenuButton::Race);
        spawn_menu_button(parent, "QUIT", MenuButton::Quit);

        parent.spawn((
            Text::new(controls_hint()),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(Color::srgb(0.5, 0.5, 0.6)),
            Node {
                margin: UiRect::top(Val::Px(40.0)),
                ..default()
            },
        ));
    });
}

fn spawn_menu_button(parent: &mut ChildBuilder, text: &str, action: MenuButton) {
    parent.spawn((
        Button,
        Node {
            width: Val::Px(280.0),
            height: Val::Px(60.0),
            margin: UiRect::all(Val::Px(10.0)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BorderColor(Color::srgb(0.3, 0.5, 0.8)),
        BackgroundColor(Color::srgb(0.15, 0.2, 0.35)),
        action,
    )).with_children(|parent| {
        parent.spawn((
            Text::new(text),
            TextFont {
                font_size: 26.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));
    });
}

fn handle_menu_buttons(
    mut interaction_query: Query<
        (&Interaction, &MenuButton, &mut BackgroundColor, &mut BorderColor),
        Changed<Interaction>,
    >,
    mut app_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    for (interaction, button, mut bg_color, mut border_color) in interaction_query.iter_mut() {
        match *interaction {
            Interaction::Pressed => {
                match button {
                    MenuButton::Race => app_state.set(AppState::Playing),
                    MenuButton::Quit => {
                        exit.send(AppExit::Success);
                    }
                }
                *bg_color = BackgroundColor(Color::srgb(0.3, 0.5, 0.8));
            }
            Interaction::Hovered => {
                *bg_color = BackgroundColor(Color::srgb(0.2, 0.35, 0.6));
                *border_color = BorderColor(Color::srgb(0.5, 0.7, 1.0));
            }
            Interaction::None => {
                *bg_color = BackgroundColor(Color::srgb(0.15, 0.2, 0.35));
                *border_color = BorderColor(Color::srgb(0.3, 0.5, 0.8));
            }
        }
    }
}

fn controls_hint() -> String {
    format!("{}: arrow keys | {}: W A S D", PlayerSlot::One, PlayerSlot::Two)
}

// ============================================================================
// HUD
// ============================================================================

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Px(36.0),
            position_type: PositionType::Absolute,
            top: Val::Px(0.0),
            left: Val::Px(0.0),
            padding: UiRect::horizontal(Val::Px(10.0)),
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        HudUI,
    )).with_children(|parent| {
        // Player 2 plays the left half, player 1 the right.
        parent.spawn((
            Text::new(format!("{} (WASD)", PlayerSlot::Two)),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(player_color(PlayerSlot::Two)),
        ));

        parent.spawn((
            Text::new("0.0s"),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(Color::WHITE),
            ClockText,
        ));

        parent.spawn((
            Text::new(format!("{} (arrows)", PlayerSlot::One)),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(player_color(PlayerSlot::One)),
        ));
    });
}

/// Show simulated time, which stalls with the catch-up cap.
fn update_hud(active: Res<ActiveMatch>, mut clock_text: Query<&mut Text, With<ClockText>>) {
    if let Ok(mut text) = clock_text.get_single_mut() {
        let view = active.session.view();
        let simulated_ms = active.session.simulated_ms();
        **text = format!("{:.1}s  frame {}", simulated_ms as f32 / 1000.0, view.frame);
    }
}

// ============================================================================
// GAME OVER
// ============================================================================

/// Winner's half green, loser's half red. Player 2 owns the left half,
/// player 1 the right.
fn setup_game_over(mut commands: Commands, active: Option<Res<ActiveMatch>>) {
    let state = active.map_or(MatchState::InProgress, |a| a.session.state());
    info!("Game over: {}", state);

    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            flex_direction: FlexDirection::Row,
            ..default()
        },
        GameOverUI,
    )).with_children(|parent| {
        for player in [PlayerSlot::Two, PlayerSlot::One] {
            let won = state.winner() == Some(player);
            parent.spawn((
                Node {
                    width: Val::Percent(50.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                BackgroundColor(if won { WIN_COLOR } else { LOSE_COLOR }),
            )).with_children(|half| {
                half.spawn((
                    Text::new(player.to_string().to_uppercase()),
                    TextFont {
                        font_size: 32.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    Node {
                        margin: UiRect::bottom(Val::Px(20.0)),
                        ..default()
                    },
                ));
                half.spawn((
                    Text::new(if won { "WIN" } else { "LOSE" }),
                    TextFont {
                        font_size: 96.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });
        }
    });

    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            bottom: Val::Px(30.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        GameOverUI,
    )).with_children(|parent| {
        parent.spawn((
            Text::new("Press SPACE to race again or ESC for menu"),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(Color::srgb(0.9, 0.9, 0.9)),
        ));
    });
}

fn handle_game_over_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        next_state.set(AppState::Playing);
    } else if keyboard.just_pressed(KeyCode::Escape) {
        next_state.set(AppState::MainMenu);
    }
}

fn cleanup<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
