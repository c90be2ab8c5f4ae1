//! Mini-game catalogue and the interface every playable game implements

pub mod balloons;
pub mod dynamo;
pub mod train;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nav::Route;
use crate::renderer::Frame;
use crate::sim::{Session, Simulation};
use crate::tuning::Tuning;

/// Stable game identifier (also the progress key and the URL segment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameId {
    CargaElectrica,
    GaussMagnetico,
    CiclaDinamo,
    Faraday,
    AmpereMaxwell,
    RedWifi,
}

impl GameId {
    pub const ALL: [GameId; 6] = [
        GameId::CargaElectrica,
        GameId::GaussMagnetico,
        GameId::CiclaDinamo,
        GameId::Faraday,
        GameId::AmpereMaxwell,
        GameId::RedWifi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::CargaElectrica => "carga-electrica",
            GameId::GaussMagnetico => "gauss-magnetico",
            GameId::CiclaDinamo => "cicla-dinamo",
            GameId::Faraday => "faraday",
            GameId::AmpereMaxwell => "ampere-maxwell",
            GameId::RedWifi => "red-wifi",
        }
    }

    /// Placeholders have a menu card and a route but no game yet
    pub fn is_playable(&self) -> bool {
        matches!(
            self,
            GameId::CargaElectrica | GameId::GaussMagnetico | GameId::CiclaDinamo
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameId::CargaElectrica => "Ley de Gauss – Campo Eléctrico",
            GameId::GaussMagnetico => "Ley de Gauss – Campo Magnético",
            GameId::CiclaDinamo => "Generación de energía",
            GameId::Faraday => "Ley de Faraday – Inducción",
            GameId::AmpereMaxwell => "Ley de Ampère–Maxwell",
            GameId::RedWifi => "Red WiFi en Acción",
        }
    }
}

/// Unrecognised identifier in a URL or a DOM attribute
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNameError {
    #[error("unknown game id '{0}'")]
    Game(String),

    #[error("unknown toolbar action '{0}'")]
    Action(String),
}

impl FromStr for GameId {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseNameError::Game(s.to_string()))
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blocking message box (intro, manual, win)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub body: String,
}

impl Modal {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

/// Non-blocking message that disappears on its own
#[derive(Debug, Clone, Default)]
pub struct Toast {
    current: Option<(String, f64)>,
}

impl Toast {
    /// Show `text` until `now + ms`, replacing any current message
    pub fn show(&mut self, text: &str, now: f64, ms: f64) {
        self.current = Some((text.to_string(), now + ms));
    }

    pub fn expire(&mut self, now: f64) {
        if self.current.as_ref().is_some_and(|(_, until)| now >= *until) {
            self.current = None;
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|(t, _)| t.as_str())
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Toolbar actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Reset,
    Help,
    /// Continue to the explanation video (handled by navigation)
    Explain,
    TogglePedal,
    Info,
}

impl UiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiAction::Reset => "reset",
            UiAction::Help => "help",
            UiAction::Explain => "explain",
            UiAction::TogglePedal => "pedal",
            UiAction::Info => "info",
        }
    }

}

impl FromStr for UiAction {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset" => Ok(UiAction::Reset),
            "help" => Ok(UiAction::Help),
            "explain" => Ok(UiAction::Explain),
            "pedal" => Ok(UiAction::TogglePedal),
            "info" => Ok(UiAction::Info),
            _ => Err(ParseNameError::Action(s.to_string())),
        }
    }
}

/// A toolbar button as the game wants it shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub action: UiAction,
    pub label: &'static str,
    pub enabled: bool,
}

impl Button {
    pub fn new(action: UiAction, label: &'static str) -> Self {
        Self {
            action,
            label,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A playable mini-game
pub trait MiniGame: Simulation {
    fn id(&self) -> GameId;
    fn session(&self) -> &Session;
    /// Back to the initial layout; cancels every pending timer
    fn reset(&mut self);
    /// Describe the current state for the painter. `now_ms` is wall-clock
    /// time, used only by cosmetic effects.
    fn frame(&self, now_ms: f64) -> Frame;

    fn modal(&self) -> Option<&Modal>;
    /// Close the modal; closing the win modal unlocks the explanation
    fn dismiss_modal(&mut self);
    fn toast(&self) -> Option<&str>;

    fn act(&mut self, action: UiAction);
    fn buttons(&self) -> Vec<Button>;

    /// Whether the animation loop must keep running without new input
    fn is_animating(&self) -> bool {
        true
    }

    /// Where the continue button leads once the win has been acknowledged
    fn explanation_route(&self) -> Option<Route> {
        if self.session().can_continue() {
            Some(Route::explanation_for(self.id()))
        } else {
            None
        }
    }
}

/// Instantiate a playable game (placeholders yield `None`)
pub fn create(id: GameId, tuning: &Tuning, seed: u64) -> Option<Box<dyn MiniGame>> {
    let game: Box<dyn MiniGame> = match id {
        GameId::CargaElectrica => Box::new(balloons::BalloonGame::new(tuning.balloons.clone(), seed)),
        GameId::GaussMagnetico => Box::new(train::TrainGame::new(
            tuning.train.clone(),
            tuning.ripple.clone(),
        )),
        GameId::CiclaDinamo => Box::new(dynamo::DynamoGame::new(tuning.dynamo.clone())),
        GameId::Faraday | GameId::AmpereMaxwell | GameId::RedWifi => return None,
    };
    log::info!("Created game '{id}' (seed {seed})");
    Some(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_roundtrip() {
        for id in GameId::ALL {
            assert_eq!(id.as_str().parse::<GameId>(), Ok(id));
        }
        assert_eq!(
            "nope".parse::<GameId>(),
            Err(ParseNameError::Game("nope".to_string()))
        );
        assert_eq!(
            "nope".parse::<GameId>().unwrap_err().to_string(),
            "unknown game id 'nope'"
        );
    }

    #[test]
    fn test_create_only_playable() {
        let tuning = Tuning::default();
        for id in GameId::ALL {
            let game = create(id, &tuning, 1);
            assert_eq!(game.is_some(), id.is_playable());
            if let Some(game) = game {
                assert_eq!(game.id(), id);
                assert!(!game.session().is_won());
                assert_eq!(game.explanation_route(), None);
            }
        }
    }

    #[test]
    fn test_toast_expiry() {
        let mut t = Toast::default();
        t.show("hola", 100.0, 50.0);
        t.expire(149.0);
        assert_eq!(t.text(), Some("hola"));
        t.expire(150.0);
        assert!(!t.is_visible());
    }

    #[test]
    fn test_ui_action_names() {
        for a in [
            UiAction::Reset,
            UiAction::Help,
            UiAction::Explain,
            UiAction::TogglePedal,
            UiAction::Info,
        ] {
            assert_eq!(a.as_str().parse::<UiAction>(), Ok(a));
        }
    }
}
