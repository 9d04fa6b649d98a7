#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dialog_collage::export::decoder::{DecodeFuture, DecoderOptions};
use dialog_collage::{Error, SceneDecoder, SvgDecoder};
use tokio::sync::oneshot;

pub fn svg_decoder() -> SvgDecoder {
    SvgDecoder::spawn(DecoderOptions {
        load_system_fonts: false,
        ..Default::default()
    })
    .expect("decoder thread starts")
}

/// Decoder whose requests only finish once their gate is opened
pub struct GatedDecoder {
    inner: SvgDecoder,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl GatedDecoder {
    /// A decoder plus one gate per expected request, in request order
    pub fn new(requests: usize) -> (Arc<Self>, Vec<oneshot::Sender<()>>) {
        let mut senders = Vec::new();
        let mut gates = VecDeque::new();
        for _ in 0..requests {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            gates.push_back(rx);
        }
        let decoder = Arc::new(Self {
            inner: svg_decoder(),
            gates: Mutex::new(gates),
        });
        (decoder, senders)
    }
}

impl SceneDecoder for GatedDecoder {
    fn decode(&self, markup: String) -> DecodeFuture {
        let gate = self.gates.lock().unwrap().pop_front().expect("a gate per request");
        let decode = self.inner.decode(markup);
        Box::pin(async move {
            gate.await
                .map_err(|_| Error::ExportDecode("gate dropped".into()))?;
            decode.await
        })
    }
}

/// Decoder that rejects everything
pub struct FailingDecoder;

impl SceneDecoder for FailingDecoder {
    fn decode(&self, _markup: String) -> DecodeFuture {
        Box::pin(async { Err(Error::ExportDecode("unsupported markup".into())) })
    }
}
