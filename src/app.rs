//! Application context wiring the route store, view and export together
//!
//! Built once, then started once: `start` subscribes the view to the route
//! store, performs the initial load and begins following navigation.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::error;
use tokio::task::JoinHandle;

use crate::codec::ConfigCodec;
use crate::export::{DecoderOptions, ExportArtifact, ExportPipeline, ExportSurface, SceneDecoder, SvgDecoder};
use crate::model::{Configuration, Defaults};
use crate::rendering::{Scene, SceneLayout};
use crate::route::{Location, RouteStore};
use crate::view::ViewController;
use crate::{CollageConfig, Error, Result};

/// Top-level handler for failures nobody else reports
pub type ErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

pub struct App {
    defaults: Arc<Defaults>,
    store: RouteStore,
    view: Arc<Mutex<ViewController>>,
    export: ExportPipeline,
    on_error: ErrorHandler,
    started: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl App {
    /// Build the context; must be called inside a tokio runtime
    pub fn new(config: CollageConfig, location: Arc<dyn Location>, decoder: Arc<dyn SceneDecoder>) -> Result<Self> {
        config.validate()?;
        let defaults = Arc::new(config.defaults.clone());
        let store = RouteStore::new(
            ConfigCodec::new(Arc::clone(&defaults)),
            location,
            Duration::from_millis(config.commit_interval_ms),
        )?;
        let scene = Scene::new(SceneLayout::default(), config.font_family.clone());
        let view = ViewController::new(
            Arc::clone(&defaults),
            scene,
            Arc::new(store.clone()),
            config.transform_epsilon,
        );
        let export = ExportPipeline::new(decoder, config.export, config.slug_max_len);

        Ok(Self {
            defaults,
            store,
            view: Arc::new(Mutex::new(view)),
            export,
            on_error: Arc::new(|e: &Error| error!("{}", e)),
            started: AtomicBool::new(false),
            listener: Mutex::new(None),
        })
    }

    /// Build the context with the worker-thread SVG decoder
    pub fn with_svg_decoder(config: CollageConfig, location: Arc<dyn Location>) -> Result<Self> {
        let decoder = SvgDecoder::spawn(DecoderOptions {
            font_family: config.font_family.clone(),
            load_system_fonts: config.load_system_fonts,
        })?;
        Self::new(config, location, Arc::new(decoder))
    }

    /// Replace the top-level error handler
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    /// Initialization phase; runs exactly once
    pub fn start(&self) -> Result<Arc<Configuration>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyStarted);
        }

        let view = Arc::clone(&self.view);
        let on_error = Arc::clone(&self.on_error);
        self.store.subscribe(move |config| {
            let mut view = view.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = view.render(config) {
                on_error(&e);
            }
        });

        let config = self.store.load_from_location();
        self.view().init_advanced_controls(&config);
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(self.store.listen());
        Ok(config)
    }

    pub fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    pub fn view(&self) -> MutexGuard<'_, ViewController> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn export_surface(&self) -> &Arc<ExportSurface> {
        self.export.surface()
    }

    /// Export the current scene; failures also go to the error handler
    pub fn export(&self) -> impl Future<Output = Result<Arc<ExportArtifact>>> + Send + 'static {
        let pending = self.export.export_image(self.view().scene());
        let on_error = Arc::clone(&self.on_error);
        async move {
            pending.await.map_err(|e| {
                on_error(&e);
                e
            })
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take() {
            listener.abort();
        }
    }
}
