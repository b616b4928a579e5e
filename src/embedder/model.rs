//! Sentence-embeddings model behind a dedicated thread.
//!
//! Model inference is blocking, so the model lives on its own OS thread and
//! requests are bridged over a sync channel with a oneshot reply per batch.

use std::sync::mpsc;
use std::thread;

use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModelType,
};
use tokio::sync::oneshot;
use tokio::task;

use crate::errors::ApiError;

type Reply = Result<Vec<Vec<f32>>, String>;
type Job = (Vec<String>, oneshot::Sender<Reply>);

/// Handle to the model thread. Cloneable; all clones feed the same model.
#[derive(Clone)]
pub struct SentenceEmbedder {
    sender: mpsc::SyncSender<Job>,
}

impl SentenceEmbedder {
    /// Spawn the model thread and block until the model has loaded.
    ///
    /// Uses all-MiniLM-L12-v2: maps sentences to a 384-dimensional dense
    /// vector space.
    pub fn spawn() -> anyhow::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel::<Job>(100);
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::spawn(move || runner(receiver, ready_tx));

        ready_rx
            .recv()
            .map_err(|_| anyhow::anyhow!("model thread exited before signalling readiness"))??;

        Ok(Self { sender })
    }

    pub async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, ApiError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        let sender = self.sender.clone();
        task::block_in_place(|| sender.send((inputs, reply_tx)))
            .map_err(|_| ApiError::Internal("embedding model thread is gone".to_string()))?;

        match reply_rx.await {
            Ok(Ok(embeddings)) => Ok(embeddings),
            Ok(Err(err)) => Err(ApiError::Internal(format!("embedding failed: {err}"))),
            Err(_) => Err(ApiError::Internal(
                "embedding model dropped the request".to_string(),
            )),
        }
    }
}

fn runner(receiver: mpsc::Receiver<Job>, ready: mpsc::Sender<anyhow::Result<()>>) {
    let model = match SentenceEmbeddingsBuilder::remote(SentenceEmbeddingsModelType::AllMiniLmL12V2)
        .create_model()
    {
        Ok(model) => {
            let _ = ready.send(Ok(()));
            model
        }
        Err(err) => {
            let _ = ready.send(Err(anyhow::anyhow!("could not load model: {err}")));
            return;
        }
    };
    tracing::info!("embeddings model loaded");

    while let Ok((sentences, reply)) = receiver.recv() {
        let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let result = model.encode(&refs).map_err(|err| err.to_string());
        let _ = reply.send(result);
    }
}
