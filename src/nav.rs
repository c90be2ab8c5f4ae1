//! Routes, menu cards and the explanation video view

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::games::GameId;
use crate::progress::ProgressStore;
use crate::storage::KvStore;

/// Video shown when the explanation route carries no source
pub const DEFAULT_VIDEO: &str = "/videos/explicacion-carga-electrica.mp4";

/// Explanation video for a game
pub fn video_for(id: GameId) -> &'static str {
    match id {
        GameId::CargaElectrica => DEFAULT_VIDEO,
        GameId::GaussMagnetico => "/videos/explicacion-gauss-magnetico.mp4",
        GameId::CiclaDinamo => "/videos/explicacion-cicla-dinamo.mp4",
        GameId::Faraday | GameId::AmpereMaxwell | GameId::RedWifi => DEFAULT_VIDEO,
    }
}

/// A navigable screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Menu,
    Game(GameId),
    Explanation {
        video: String,
        game: Option<GameId>,
    },
}

impl Route {
    pub fn explanation_for(id: GameId) -> Route {
        Route::Explanation {
            video: video_for(id).to_string(),
            game: Some(id),
        }
    }

    /// Parse a location (path plus optional query); anything unknown is the menu
    pub fn parse(location: &str) -> Route {
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        let path = path.trim_end_matches('/');

        if let Some(id) = path.strip_prefix("/juegos/") {
            return id.parse::<GameId>().map_or(Route::Menu, Route::Game);
        }
        if path == "/explicacion" {
            let mut video = None;
            let mut game = None;
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                match key {
                    "src" => video = Some(decode_component(value)).filter(|v| !v.is_empty()),
                    "game" => game = decode_component(value).parse::<GameId>().ok(),
                    _ => {}
                }
            }
            return Route::Explanation {
                video: video.unwrap_or_else(|| DEFAULT_VIDEO.to_string()),
                game,
            };
        }
        Route::Menu
    }

    pub fn path(&self) -> String {
        match self {
            Route::Menu => "/".to_string(),
            Route::Game(id) => format!("/juegos/{id}"),
            Route::Explanation { video, game } => {
                let mut path = format!("/explicacion?src={}", encode_component(video));
                if let Some(id) = game {
                    path.push_str("&game=");
                    path.push_str(id.as_str());
                }
                path
            }
        }
    }
}

/// Characters left as-is in a query value (unreserved plus the path separator)
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn decode_component(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

/// One entry of the game menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCard {
    pub number: usize,
    pub id: GameId,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub formula: &'static str,
    /// Completed games cannot be replayed
    pub locked: bool,
}

impl MenuCard {
    pub fn route(&self) -> Route {
        Route::Game(self.id)
    }

    /// Whether the card can be opened
    pub fn is_available(&self) -> bool {
        !self.locked && self.id.is_playable()
    }

    pub fn badge(&self) -> Option<&'static str> {
        if self.locked {
            Some("✅ Pasado")
        } else if !self.id.is_playable() {
            Some("🚫 No disponible")
        } else {
            None
        }
    }
}

const CARDS: [(GameId, &str, &str, &str); 6] = [
    (
        GameId::CargaElectrica,
        "Frota globos para cargarlos y acércalos a papelitos.",
        "🎈",
        "∮E⋅dA = Q/ε₀",
    ),
    (
        GameId::GaussMagnetico,
        "Las líneas de B siempre se cierran: no hay monopolos.",
        "🧲",
        "∮B⋅dA = 0",
    ),
    (
        GameId::CiclaDinamo,
        "Arma la bicicleta, conecta la dínamo y enciende el bombillo pedaleando.",
        "🚲",
        "ε = −dΦB/dt",
    ),
    (
        GameId::Faraday,
        "Explora cómo un campo magnético variable induce corriente.",
        "⚡",
        "ε = −dΦB/dt",
    ),
    (
        GameId::AmpereMaxwell,
        "Descubre cómo las corrientes y campos variables generan B.",
        "🔄",
        "∮B⋅dl = μ₀(I + ε₀ dΦE/dt)",
    ),
    (
        GameId::RedWifi,
        "Simula cómo viajan las ondas EM en una red WiFi.",
        "📶",
        "v = λ·f",
    ),
];

/// Menu cards in display order, locked where already completed
pub fn menu_cards<S: KvStore>(progress: &ProgressStore<S>) -> Vec<MenuCard> {
    let record = progress.record();
    CARDS
        .iter()
        .enumerate()
        .map(|(i, (id, description, icon, formula))| MenuCard {
            number: i + 1,
            id: *id,
            title: id.title(),
            description,
            icon,
            formula,
            locked: record.is_completed(*id),
        })
        .collect()
}

/// Full-screen explanation video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationView {
    pub video: String,
    pub game: Option<GameId>,
}

impl ExplanationView {
    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::Explanation { video, game } => Some(Self {
                video: video.clone(),
                game: *game,
            }),
            _ => None,
        }
    }

    /// Video finished: mark the game completed and go back to the menu
    pub fn on_ended<S: KvStore>(&self, progress: &mut ProgressStore<S>) -> Route {
        self.finish(progress)
    }

    /// "Volver al menú" behaves like watching to the end
    pub fn dismiss<S: KvStore>(&self, progress: &mut ProgressStore<S>) -> Route {
        self.finish(progress)
    }

    fn finish<S: KvStore>(&self, progress: &mut ProgressStore<S>) -> Route {
        if let Some(id) = self.game {
            progress.mark_completed(id);
        }
        Route::Menu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Menu);
        assert_eq!(Route::parse(""), Route::Menu);
        assert_eq!(
            Route::parse("/juegos/gauss-magnetico"),
            Route::Game(GameId::GaussMagnetico)
        );
        assert_eq!(
            Route::parse("/juegos/cicla-dinamo/"),
            Route::Game(GameId::CiclaDinamo)
        );
        assert_eq!(Route::parse("/juegos/no-existe"), Route::Menu);
        assert_eq!(Route::parse("/otra/cosa"), Route::Menu);
    }

    #[test]
    fn test_explanation_defaults() {
        assert_eq!(
            Route::parse("/explicacion"),
            Route::Explanation {
                video: DEFAULT_VIDEO.to_string(),
                game: None
            }
        );
        assert_eq!(
            Route::parse("/explicacion?src=/v/a%20b.mp4&game=zzz"),
            Route::Explanation {
                video: "/v/a b.mp4".to_string(),
                game: None
            }
        );
    }

    #[test]
    fn test_path_parse_roundtrip() {
        let routes = [
            Route::Menu,
            Route::Game(GameId::CargaElectrica),
            Route::explanation_for(GameId::GaussMagnetico),
            Route::Explanation {
                video: "/videos/con espacio & ?.mp4".to_string(),
                game: None,
            },
        ];
        for r in routes {
            assert_eq!(Route::parse(&r.path()), r);
        }
    }

    #[test]
    fn test_decode_tolerates_bad_escapes() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
        assert_eq!(decode_component("%C3%A9"), "é");
        assert_eq!(decode_component("a+b%2Bc"), "a b+c");
        assert_eq!(encode_component("/v/a b+é.mp4"), "/v/a%20b%2B%C3%A9.mp4");
    }

    #[test]
    fn test_menu_cards_lock_completed() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        let cards = menu_cards(&progress);
        assert_eq!(cards.len(), 6);
        assert!(cards.iter().all(|c| !c.locked));
        assert_eq!(cards[0].number, 1);
        assert_eq!(cards.iter().filter(|c| c.is_available()).count(), 3);
        assert_eq!(cards[5].badge(), Some("🚫 No disponible"));
        assert_eq!(cards[0].badge(), None);

        progress.mark_completed(GameId::GaussMagnetico);
        let cards = menu_cards(&progress);
        let gauss = cards.iter().find(|c| c.id == GameId::GaussMagnetico).unwrap();
        assert!(gauss.locked);
        assert!(!gauss.is_available());
        assert_eq!(gauss.badge(), Some("✅ Pasado"));
        assert_eq!(cards.iter().filter(|c| c.locked).count(), 1);
    }

    #[test]
    fn test_explanation_marks_progress() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        let view = ExplanationView::from_route(&Route::explanation_for(GameId::CargaElectrica)).unwrap();
        assert_eq!(view.on_ended(&mut progress), Route::Menu);
        assert!(progress.is_completed(GameId::CargaElectrica));

        let anonymous = ExplanationView::from_route(&Route::parse("/explicacion")).unwrap();
        assert_eq!(anonymous.dismiss(&mut progress), Route::Menu);
        assert_eq!(progress.record().count(), 1);
        assert!(ExplanationView::from_route(&Route::Menu).is_none());
    }
}
