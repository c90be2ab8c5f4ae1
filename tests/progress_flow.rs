//! Completion flow: explanation video end -> progress -> locked menu card

use maxwell_games::games::GameId;
use maxwell_games::nav::{ExplanationView, Route, menu_cards};
use maxwell_games::storage::{KvStore, MemoryStore};
use maxwell_games::ProgressStore;

#[test]
fn test_video_end_locks_menu_card() {
    let mut progress = ProgressStore::new(MemoryStore::new());

    let route = Route::parse(&Route::explanation_for(GameId::CiclaDinamo).path());
    let view = ExplanationView::from_route(&route).expect("explanation route");
    assert_eq!(view.game, Some(GameId::CiclaDinamo));

    assert_eq!(view.on_ended(&mut progress), Route::Menu);
    assert!(progress.is_completed(GameId::CiclaDinamo));

    let card = menu_cards(&progress)
        .into_iter()
        .find(|c| c.id == GameId::CiclaDinamo)
        .expect("card");
    assert!(card.locked);
    assert!(!card.is_available());
}

#[test]
fn test_progress_survives_a_new_store_handle() {
    let mut progress = ProgressStore::new(MemoryStore::new());
    progress.mark_completed(GameId::CargaElectrica);
    let backend = progress.backend().clone();

    let reopened = ProgressStore::new(backend);
    assert!(reopened.is_completed(GameId::CargaElectrica));
    assert!(!reopened.is_completed(GameId::GaussMagnetico));
}

#[test]
fn test_boxed_backend_and_reset() {
    let backend: Box<dyn KvStore> = Box::new(MemoryStore::new());
    let mut progress = ProgressStore::new(backend);
    progress.mark_completed(GameId::GaussMagnetico);
    assert_eq!(menu_cards(&progress).iter().filter(|c| c.locked).count(), 1);

    progress.reset_all();
    assert!(menu_cards(&progress).iter().all(|c| !c.locked));
}
