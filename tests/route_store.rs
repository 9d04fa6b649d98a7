use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dialog_collage::route::Location;
use dialog_collage::{ConfigCodec, ConfigUpdate, Defaults, MemoryLocation, RouteStore, ViewTransform};

fn store_at(fragment: &str) -> (RouteStore, Arc<MemoryLocation>) {
    let location = Arc::new(MemoryLocation::with_fragment(fragment));
    let codec = ConfigCodec::new(Arc::new(Defaults::default()));
    let store = RouteStore::new(codec, location.clone(), Duration::from_millis(500)).unwrap();
    (store, location)
}

fn view_x(x: f64) -> ConfigUpdate {
    ConfigUpdate::view(ViewTransform::new(x, -150.0, 1.0))
}

#[tokio::test(start_paused = true)]
async fn debounced_updates_coalesce_into_one_write() {
    let (store, location) = store_at("");
    store.load_from_location();

    store.commit_debounced(view_x(1.0));
    tokio::time::sleep(Duration::from_millis(100)).await;
    store.commit_debounced(view_x(2.0));
    tokio::time::sleep(Duration::from_millis(100)).await;
    store.commit_debounced(view_x(3.0));

    // merged at once, written later
    assert_eq!(store.current().view.x, 3.0);
    assert_eq!(location.self_writes(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(location.self_writes(), 1);
    assert_eq!(location.fragment(), "x=3");
}

#[tokio::test(start_paused = true)]
async fn immediate_commit_cancels_pending_write() {
    let (store, location) = store_at("");
    store.load_from_location();

    store.commit_debounced(view_x(5.0));
    store.commit(ConfigUpdate::font_size(30));
    assert_eq!(location.fragment(), "fontSize=30&x=5");

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(location.self_writes(), 1);
}

#[tokio::test]
async fn own_writes_do_not_reload() {
    let (store, location) = store_at("");
    let renders = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&renders);
    store.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    store.load_from_location();
    let listener = store.listen();

    store.commit(ConfigUpdate::text("Hello"));
    store.commit(ConfigUpdate::font_size(12));
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(location.self_writes(), 2);
    assert_eq!(store.load_count(), 1);
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    listener.abort();
}

#[tokio::test]
async fn back_and_forward_render_history_entries() {
    let (store, location) = store_at("");
    let rendered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&rendered);
    store.subscribe(move |config| sink.lock().unwrap().push(config.font_size));
    store.load_from_location();
    let listener = store.listen();

    store.commit(ConfigUpdate::font_size(30));
    store.commit(ConfigUpdate::font_size(40));

    assert!(location.back());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.current().font_size, 30);

    assert!(location.back());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.current().font_size, 22);

    assert!(location.forward());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.current().font_size, 30);

    assert_eq!(*rendered.lock().unwrap(), vec![22, 30, 22, 30]);
    listener.abort();
}

#[tokio::test(start_paused = true)]
async fn navigation_drops_pending_local_write() {
    let (store, location) = store_at("");
    store.load_from_location();
    let listener = store.listen();

    store.commit_debounced(view_x(9.0));
    location.navigate("text=Linked");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(location.fragment(), "text=Linked");
    assert_eq!(location.self_writes(), 0);
    assert_eq!(store.current().text, "Linked");
    assert_eq!(store.current().view.x, -1100.0);
    listener.abort();
}

#[tokio::test]
async fn unchanged_route_is_not_rewritten() {
    let (store, location) = store_at("fontSize=30");
    store.load_from_location();
    store.commit(ConfigUpdate::font_size(30));
    assert_eq!(location.self_writes(), 0);
    assert!(!store.flush());
}
