//! Canvas reducer driven through the runtime store.

#![allow(clippy::unwrap_used)]

use carto_canvas::geometry::Bounds;
use carto_canvas::{CanvasAction, CanvasEnvironment, CanvasReducer, Shape, ShapeArena, ShapeId};
use carto_runtime::Store;
use std::time::Duration;

type CanvasStore = Store<ShapeArena, CanvasAction, CanvasEnvironment, CanvasReducer<ShapeArena>>;

fn id(s: &str) -> ShapeId {
    ShapeId::from(s)
}

fn store() -> CanvasStore {
    let mut arena = ShapeArena::new();
    arena.insert(Shape::group("g", "Ideas", Bounds::new(0.0, 400.0, 210.0, 150.0)));
    arena.insert(Shape::card("c", "https://example.com", Bounds::new(0.0, 0.0, 210.0, 195.0)));
    arena.connect("a", &id("g"), &id("c"));
    Store::new(arena, CanvasReducer::new(), CanvasEnvironment::default())
}

#[tokio::test]
async fn toggle_is_broadcast_to_subscribers() {
    let store = store();
    let mut updates = store.subscribe_actions();

    store
        .send(CanvasAction::Toggle { shape_id: id("g") })
        .await
        .unwrap()
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(
        updates.recv().await.unwrap(),
        CanvasAction::Collapsed { shape_id: id("g") }
    );
    assert!(store.state(|arena| arena.is_collapsed(&id("g"))).await);
}

#[tokio::test]
async fn readers_never_see_a_half_collapsed_group() {
    let store = store();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                store
                    .send(CanvasAction::Toggle { shape_id: id("g") })
                    .await
                    .unwrap()
                    .wait()
                    .await
                    .unwrap();
            }
        })
    };

    for _ in 0..50 {
        let (collapsed, card_compact) = store
            .state(|arena| {
                let card = arena.get(&id("c")).unwrap();
                (arena.is_collapsed(&id("g")), card.is_compact())
            })
            .await;
        assert_eq!(collapsed, card_compact);
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    assert!(!store.state(|arena| arena.is_collapsed(&id("g"))).await);
}

#[tokio::test]
async fn ignored_command_spawns_nothing() {
    let store = store();
    let before = store.state(|arena| arena.clone()).await;

    let handle = store
        .send(CanvasAction::Expand { shape_id: id("g") })
        .await
        .unwrap();

    assert_eq!(handle.pending(), 0);
    assert_eq!(store.state(|arena| arena.clone()).await, before);
}
