//! Startup state machine.
//!
//! `Uninitialized -> Loading -> Ready` on success, `Uninitialized -> Loading ->
//! Failed` otherwise. Artifacts are read exactly once; a `Failed` startup never
//! yields a [`ModelContext`], so no predict traffic can be served from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use triage_core::{ArtifactError, ArtifactSet};

use crate::context::ModelContext;

#[derive(Debug)]
pub enum ServiceState {
    Uninitialized,
    Loading,
    Ready(Arc<ModelContext>),
    Failed(ArtifactError),
}

impl ServiceState {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceState::Uninitialized => "uninitialized",
            ServiceState::Loading => "loading",
            ServiceState::Ready(_) => "ready",
            ServiceState::Failed(_) => "failed",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServiceState::Ready(_))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("model artifacts in {} failed to load: {source}", dir.display())]
    Artifacts {
        dir: PathBuf,
        #[source]
        source: ArtifactError,
    },

    #[error("service is {0}, not ready")]
    NotReady(&'static str),
}

/// Drives the one-time artifact load for a model directory.
#[derive(Debug)]
pub struct Startup {
    model_dir: PathBuf,
    state: ServiceState,
}

impl Startup {
    pub fn new(model_dir: impl AsRef<Path>) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
            state: ServiceState::Uninitialized,
        }
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    /// Load and validate the artifact set. Only the first call does any work.
    pub fn run(&mut self) -> &ServiceState {
        if !matches!(self.state, ServiceState::Uninitialized) {
            return &self.state;
        }

        self.enter(ServiceState::Loading);
        let next = match ArtifactSet::load(&self.model_dir) {
            Ok(artifacts) => ServiceState::Ready(Arc::new(ModelContext::new(artifacts))),
            Err(e) => {
                tracing::error!(dir = %self.model_dir.display(), error = %e, "artifact load failed");
                ServiceState::Failed(e)
            }
        };
        self.enter(next);
        &self.state
    }

    /// Hand out the loaded context, or the reason there is none.
    pub fn into_ready(self) -> Result<Arc<ModelContext>, StartupError> {
        match self.state {
            ServiceState::Ready(ctx) => Ok(ctx),
            ServiceState::Failed(source) => Err(StartupError::Artifacts {
                dir: self.model_dir,
                source,
            }),
            other => Err(StartupError::NotReady(other.label())),
        }
    }

    fn enter(&mut self, next: ServiceState) {
        tracing::info!(from = self.state.label(), to = next.label(), "startup state change");
        if let ServiceState::Ready(ctx) = &next {
            tracing::info!(
                model_version = %ctx.version(),
                n_features = ctx.schema().len(),
                model = %ctx.pipeline().estimator.kind,
                "model ready"
            );
        }
        self.state = next;
    }
}
