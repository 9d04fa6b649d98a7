mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dialog_collage::route::Location;
use dialog_collage::view::InteractionMode;
use dialog_collage::{App, CollageConfig, Error, Gesture, Kerning, MemoryLocation};

use common::{svg_decoder, FailingDecoder};

fn app_at(href: &str) -> (App, Arc<MemoryLocation>) {
    let location = Arc::new(MemoryLocation::new(href).unwrap());
    let app = App::new(CollageConfig::default(), location.clone(), Arc::new(svg_decoder())).unwrap();
    (app, location)
}

#[tokio::test]
async fn start_renders_the_linked_collage_once() {
    let (app, _) = app_at("https://collage.example/#text=Hi&fontSize=30&altBg");
    let config = app.start().unwrap();

    assert_eq!(config.text, "Hi");
    assert_eq!(config.font_size, 30);
    assert!(config.alt_background);
    {
        let view = app.view();
        assert_eq!(view.scene().text(), "Hi");
        assert_eq!(view.scene().overlay(), Some(0.5));
        assert_eq!(view.form().font_size_label, "30");
        assert!(view.form().advanced_visible);
        assert_eq!(view.form().expander_label(), "Less");
    }

    assert!(matches!(app.start(), Err(Error::AlreadyStarted)));
    assert_eq!(app.store().load_count(), 1);
}

#[tokio::test]
async fn defaults_keep_advanced_controls_closed() {
    let (app, location) = app_at("https://collage.example/");
    app.start().unwrap();
    assert!(!app.view().form().advanced_visible);
    assert_eq!(location.fragment(), "");
}

#[tokio::test(start_paused = true)]
async fn pan_is_written_after_the_gesture_settles() {
    let (app, location) = app_at("https://collage.example/");
    app.start().unwrap();

    for _ in 0..3 {
        app.view().apply_gesture(Gesture::Pan { dx: 10.0, dy: 0.0 });
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(location.self_writes(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(location.self_writes(), 1);
    assert_eq!(location.fragment(), "x=-1070");
    assert_eq!(app.store().load_count(), 1);
    assert_eq!(app.view().scene().transform().x, -1070.0);
}

#[tokio::test]
async fn text_editing_suspends_gestures() {
    let (app, location) = app_at("https://collage.example/");
    app.start().unwrap();

    {
        let mut view = app.view();
        view.begin_text_edit();
        assert_eq!(view.mode(), InteractionMode::TextEdit);
        assert!(view.apply_gesture(Gesture::Pan { dx: 40.0, dy: 40.0 }).is_none());
        view.edit_text("Yo").unwrap();
        view.end_text_edit();
        assert_eq!(view.mode(), InteractionMode::Gesture);
        assert!(view.apply_gesture(Gesture::Pan { dx: 0.0, dy: 0.0 }).is_some());
    }
    assert_eq!(location.fragment(), "text=Yo");
}

#[tokio::test]
async fn sliders_commit_immediately_and_clamp() {
    let (app, location) = app_at("https://collage.example/");
    app.start().unwrap();

    {
        let mut view = app.view();
        view.set_font_size(99).unwrap();
        view.set_kerning(Kerning::new("0.125")).unwrap();
        assert_eq!(view.form().kerning_label, Kerning::new("0.125").label());
    }
    assert_eq!(location.fragment(), "fontSize=48&kerning=0.125");
}

#[tokio::test]
async fn external_navigation_rerenders() {
    let (app, location) = app_at("https://collage.example/");
    app.start().unwrap();

    location.navigate("fontSize=40&text=Linked");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let view = app.view();
    assert_eq!(view.form().font_size, 40);
    assert_eq!(view.scene().text(), "Linked");
    assert_eq!(view.scene().dialog().unwrap().font_size, 40);
}

#[tokio::test]
async fn export_binds_the_download_link() {
    let (app, _) = app_at("https://collage.example/#text=Hi");
    app.start().unwrap();

    let artifact = app.export().await.unwrap();
    let (href, filename) = app.export_surface().download_link().unwrap();
    assert_eq!(filename, "hi.png");
    assert_eq!(href, artifact.href);
}

#[tokio::test]
async fn export_failures_reach_the_error_handler() {
    let location = Arc::new(MemoryLocation::new("https://collage.example/").unwrap());
    let reported = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reported);
    let app = App::new(CollageConfig::default(), location, Arc::new(FailingDecoder))
        .unwrap()
        .on_error(move |e| {
            assert!(matches!(e, Error::ExportDecode(_)));
            counter.fetch_add(1, Ordering::SeqCst);
        });
    app.start().unwrap();

    assert!(app.export().await.is_err());
    assert_eq!(reported.load(Ordering::SeqCst), 1);
    assert!(!app.export_surface().is_visible());
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let location = Arc::new(MemoryLocation::with_fragment(""));
    let mut config = CollageConfig::default();
    config.slug_max_len = 0;
    assert!(matches!(
        App::new(config, location, Arc::new(FailingDecoder)),
        Err(Error::Config(_))
    ));
}
