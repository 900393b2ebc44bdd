//! Input configuration
//!
//! Supports multiple profiles with different bindings. Every section has a
//! default, so a profile file only needs the keys it overrides.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::{Button, Direction, MoveSource, MoveSources, Role, Trigger};

/// Buttons assigned to each menu role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleBindings {
    pub confirm: Vec<Button>,
    pub cancel: Vec<Button>,
    pub alt: Vec<Button>,
    pub menu: Vec<Button>,
}

impl RoleBindings {
    /// Buttons bound to `role`, in priority order
    pub fn buttons(&self, role: Role) -> &[Button] {
        match role {
            Role::Confirm => &self.confirm,
            Role::Cancel => &self.cancel,
            Role::Alt => &self.alt,
            Role::Menu => &self.menu,
        }
    }
}

impl Default for RoleBindings {
    fn default() -> Self {
        Self {
            confirm: vec![Button::ControllerA, Button::Enter],
            cancel: vec![Button::ControllerB, Button::Escape],
            alt: vec![Button::ControllerX, Button::Space, Button::MouseRight],
            menu: vec![Button::ControllerY, Button::Escape],
        }
    }
}

/// Button used by each move source for one direction
///
/// A direction table in a profile replaces the whole default for that direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionBinding {
    pub wasd: Option<Button>,
    pub arrows: Option<Button>,
    pub dpad: Option<Button>,
    pub left_thumbstick: Option<Button>,
}

impl DirectionBinding {
    /// Bound buttons in move precedence order (D-Pad, thumbstick, WASD, arrows)
    pub fn by_precedence(&self) -> impl Iterator<Item = (MoveSource, Button)> {
        [
            (MoveSource::ControllerDPad, self.dpad),
            (MoveSource::ControllerLeftThumbstick, self.left_thumbstick),
            (MoveSource::KeyboardWasd, self.wasd),
            (MoveSource::KeyboardArrows, self.arrows),
        ]
        .into_iter()
        .filter_map(|(source, button)| button.map(|button| (source, button)))
    }
}

/// Per-direction move bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveBindings {
    pub right: DirectionBinding,
    pub down: DirectionBinding,
    pub left: DirectionBinding,
    pub up: DirectionBinding,
}

impl MoveBindings {
    pub fn direction(&self, direction: Direction) -> &DirectionBinding {
        match direction {
            Direction::Right => &self.right,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Up => &self.up,
        }
    }
}

impl Default for MoveBindings {
    fn default() -> Self {
        let binding = |wasd, arrows, dpad, stick| DirectionBinding {
            wasd: Some(wasd),
            arrows: Some(arrows),
            dpad: Some(dpad),
            left_thumbstick: Some(stick),
        };
        Self {
            right: binding(Button::D, Button::Right, Button::DPadRight, Button::LeftThumbstickRight),
            down: binding(Button::S, Button::Down, Button::DPadDown, Button::LeftThumbstickDown),
            left: binding(Button::A, Button::Left, Button::DPadLeft, Button::LeftThumbstickLeft),
            up: binding(Button::W, Button::Up, Button::DPadUp, Button::LeftThumbstickUp),
        }
    }
}

/// Physical button assignments for roles and moves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    pub roles: RoleBindings,
    pub moves: MoveBindings,
}

/// Move sources feeding the dispatcher's move and axis events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSourceConfig {
    pub wasd: bool,
    pub arrows: bool,
    pub dpad: bool,
    pub left_thumbstick: bool,
}

impl MoveSourceConfig {
    pub fn flags(&self) -> MoveSources {
        let mut flags = MoveSources::empty();
        flags.set(MoveSources::WASD, self.wasd);
        flags.set(MoveSources::ARROWS, self.arrows);
        flags.set(MoveSources::DPAD, self.dpad);
        flags.set(MoveSources::LEFT_THUMBSTICK, self.left_thumbstick);
        flags
    }
}

impl Default for MoveSourceConfig {
    fn default() -> Self {
        Self {
            wasd: true,
            arrows: true,
            dpad: true,
            left_thumbstick: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive, overridden by RUST_LOG
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// The active profile (default, menu-heavy, etc.)
    pub profile: String,
    /// Role and move button assignments
    pub bindings: BindingConfig,
    /// Enabled move sources
    pub move_sources: MoveSourceConfig,
    /// Actions registered at engine construction
    pub actions: IndexMap<String, Vec<Trigger>>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            bindings: BindingConfig::default(),
            move_sources: MoveSourceConfig::default(),
            actions: IndexMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl InputConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. config/{profile}.toml
    /// 2. Environment variables with prefix INPUT_ (e.g. INPUT_LOGGING__FILTER=debug)
    ///
    /// Config files are searched for next to the executable, then in ./config.
    pub fn load(profile: &str) -> Result<Self> {
        match Self::find_config_dir() {
            Some(dir) => Self::load_from(&dir, profile),
            None => Self::build(
                Config::builder()
                    .add_source(File::with_name(&format!("config/{}", profile)).required(false)),
                profile,
            ),
        }
    }

    /// Loads `{dir}/{profile}` plus environment overrides
    pub fn load_from(dir: &Path, profile: &str) -> Result<Self> {
        let profile_path = dir.join(profile);
        Self::build(
            Config::builder().add_source(File::from(profile_path.as_path()).required(false)),
            profile,
        )
    }

    /// Parses a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Loads configuration using the INPUT_PROFILE environment variable,
    /// defaulting to "default"
    pub fn load_from_env() -> Result<Self> {
        let profile = std::env::var("INPUT_PROFILE").unwrap_or_else(|_| "default".to_string());
        Self::load(&profile)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        profile: &str,
    ) -> Result<Self> {
        // Use __ as separator for nested fields (e.g. INPUT_MOVE_SOURCES__WASD)
        let config = builder
            .add_source(
                Environment::with_prefix("INPUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("profile", profile)?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Chord;

    #[test]
    fn test_defaults_cover_every_role_and_direction() {
        let config = InputConfig::default();
        for role in Role::ALL {
            assert!(
                !config.bindings.roles.buttons(role).is_empty(),
                "{role:?} should have default buttons"
            );
        }
        for direction in Direction::ALL {
            assert_eq!(config.bindings.moves.direction(direction).by_precedence().count(), 4);
        }
        assert_eq!(config.move_sources.flags(), MoveSources::all());
    }

    #[test]
    fn test_precedence_order() {
        let sources: Vec<MoveSource> = MoveBindings::default()
            .up
            .by_precedence()
            .map(|(source, _)| source)
            .collect();
        assert_eq!(
            sources,
            vec![
                MoveSource::ControllerDPad,
                MoveSource::ControllerLeftThumbstick,
                MoveSource::KeyboardWasd,
                MoveSource::KeyboardArrows,
            ]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = InputConfig::from_toml_str(
            r#"
            [bindings.roles]
            confirm = ["Space"]

            [move_sources]
            arrows = false

            [actions]
            jump = ["Space", { held = "LeftShift", pressed = "W" }]
            "#,
        )
        .expect("parse");

        assert_eq!(config.bindings.roles.confirm, vec![Button::Space]);
        assert_eq!(config.bindings.roles.cancel, RoleBindings::default().cancel);
        assert!(!config.move_sources.flags().contains(MoveSources::ARROWS));
        assert!(config.move_sources.flags().contains(MoveSources::WASD));
        assert_eq!(
            config.actions.get("jump"),
            Some(&vec![
                Trigger::Button(Button::Space),
                Trigger::Chord(Chord::new(Button::LeftShift, Button::W)),
            ])
        );
    }

    #[test]
    fn test_invalid_button_is_an_error() {
        let result = InputConfig::from_toml_str("[bindings.roles]\nconfirm = [\"Trampoline\"]\n");
        assert!(result.is_err(), "unknown button names must not load");
    }

    #[test]
    fn test_load_from_directory_sets_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("menus.toml"),
            "[bindings.roles]\ncancel = [\"Backspace\"]\n",
        )
        .expect("write profile");

        let config = InputConfig::load_from(dir.path(), "menus").expect("load");
        assert_eq!(config.profile, "menus");
        assert_eq!(config.bindings.roles.cancel, vec![Button::Backspace]);
    }

    #[test]
    fn test_missing_profile_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InputConfig::load_from(dir.path(), "absent").expect("load");
        assert_eq!(config.profile, "absent");
        assert_eq!(config.bindings, BindingConfig::default());
    }
}
