//! Decode step of the export: scene markup to an SVG tree
//!
//! Decoding is the one point the export waits on. [`SvgDecoder`] runs it on
//! a dedicated worker thread that owns the parser options (and the font
//! database, which is costly to build), answering each request through a
//! oneshot channel so callers get an awaitable result.

use std::sync::mpsc::{self, Sender};
use std::thread;

use futures::future::BoxFuture;
use log::debug;
use resvg::usvg;
use tokio::sync::oneshot;

use crate::{Error, Result};

pub type DecodeFuture = BoxFuture<'static, Result<usvg::Tree>>;

/// Turns serialized scene markup into a drawable tree
pub trait SceneDecoder: Send + Sync {
    fn decode(&self, markup: String) -> DecodeFuture;
}

/// Parser settings for the decoder worker
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// Family used when the markup names one that is not installed
    pub font_family: String,
    pub load_system_fonts: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            load_system_fonts: true,
        }
    }
}

enum Command {
    Decode(String, oneshot::Sender<Result<usvg::Tree>>),
}

/// Decoder backed by a worker thread; clones share the worker
#[derive(Clone)]
pub struct SvgDecoder {
    cmd_tx: Sender<Command>,
}

impl SvgDecoder {
    /// Start the worker thread
    ///
    /// The worker exits once every clone of the returned decoder is dropped.
    pub fn spawn(options: DecoderOptions) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::Builder::new()
            .name("svg-decoder".to_string())
            .spawn(move || {
                let mut opt = usvg::Options::default();
                opt.font_family = options.font_family;
                if options.load_system_fonts {
                    opt.fontdb_mut().load_system_fonts();
                }
                debug!("svg decoder ready");

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Decode(markup, resp) => {
                            let res = usvg::Tree::from_str(&markup, &opt).map_err(Error::from);
                            // the requester may have gone away; nothing to do then
                            let _ = resp.send(res);
                        }
                    }
                }
                debug!("svg decoder stopped");
            })
            .map_err(|e| Error::Runtime(format!("failed to start decoder thread: {}", e)))?;

        Ok(Self { cmd_tx })
    }
}

impl SceneDecoder for SvgDecoder {
    fn decode(&self, markup: String) -> DecodeFuture {
        let (resp_tx, resp_rx) = oneshot::channel();
        let sent = self.cmd_tx.send(Command::Decode(markup, resp_tx)).is_ok();
        Box::pin(async move {
            if !sent {
                return Err(Error::ExportDecode("decoder worker is not running".into()));
            }
            resp_rx
                .await
                .map_err(|_| Error::ExportDecode("decoder worker dropped the request".into()))?
        })
    }
}
