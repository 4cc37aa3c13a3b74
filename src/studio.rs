//! Design studio controller.
//!
//! Owns the design parameters being edited, the generation status and the
//! latest generated artifact, and wires the favorites and order workflows
//! to them.
//!
//! Every generation request is tagged with a token. Only the result carrying
//! the most recent token may touch the view state; results of superseded
//! requests are dropped when they arrive.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info};

use crate::db::KeyValueStore;
use crate::error::{ExportError, GenerationError, OrderError, StorageError};
use crate::export::download_image;
use crate::favorites::{is_favorited, FavoritesWorkflow, SaveOutcome};
use crate::generation::DesignRequestService;
use crate::models::{
    clamp_weight, Category, DesignParameters, FavoriteRecord, GeneratedArtifact, Metal,
    OrderRecord,
};
use crate::orders::{OrderSource, OrderWorkflow};
use crate::store::{favorites_store, ledger_store};

/// One edit from the studio form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterChange {
    Metal(Metal),
    Category(Category),
    WeightGrams(u32),
    Style(String),
    Details(String),
}

/// Handle for an in-flight generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub token: u64,
    pub params: DesignParameters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CurrentArtifact {
    artifact: GeneratedArtifact,
    params: DesignParameters,
}

pub struct DesignStudio {
    service: DesignRequestService,
    favorites: FavoritesWorkflow,
    orders: OrderWorkflow,
    api_url: String,
    params: DesignParameters,
    is_generating: bool,
    current: Option<CurrentArtifact>,
    last_error: Option<GenerationError>,
    latest_token: u64,
}

impl DesignStudio {
    pub fn new(
        service: DesignRequestService,
        backend: Arc<dyn KeyValueStore>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            service,
            favorites: FavoritesWorkflow::new(favorites_store(backend.clone())),
            orders: OrderWorkflow::new(ledger_store(backend)),
            api_url: api_url.into(),
            params: DesignParameters::default(),
            is_generating: false,
            current: None,
            last_error: None,
            latest_token: 0,
        }
    }

    // ============ Parameters ============

    pub fn params(&self) -> &DesignParameters {
        &self.params
    }

    pub fn set_parameter(&mut self, change: ParameterChange) {
        match change {
            ParameterChange::Metal(metal) => self.params.metal = metal,
            ParameterChange::Category(category) => self.params.category = category,
            ParameterChange::WeightGrams(weight) => self.params.weight_grams = clamp_weight(weight),
            ParameterChange::Style(style) => self.params.style = style,
            ParameterChange::Details(details) => self.params.details = details,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        self.api_url = api_url.into();
    }

    // ============ Generation ============

    pub fn service(&self) -> &DesignRequestService {
        &self.service
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        self.current.as_ref().map(|c| &c.artifact)
    }

    /// Error of the most recent failed generation, cleared by the next request
    pub fn last_error(&self) -> Option<&GenerationError> {
        self.last_error.as_ref()
    }

    /// Starts a request: marks the studio busy and clears the shown artifact.
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.latest_token += 1;
        self.is_generating = true;
        self.current = None;
        self.last_error = None;
        GenerationTicket {
            token: self.latest_token,
            params: self.params.clone(),
        }
    }

    /// Applies a finished request. Returns false if a newer request superseded it.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<GeneratedArtifact, GenerationError>,
    ) -> bool {
        if ticket.token != self.latest_token {
            debug!(
                "[complete_generation] Dropping stale result {} (latest {})",
                ticket.token, self.latest_token
            );
            return false;
        }

        match result {
            Ok(artifact) => {
                info!("[complete_generation] Artifact ready for request {}", ticket.token);
                self.current = Some(CurrentArtifact {
                    artifact,
                    params: ticket.params,
                });
            }
            Err(e) => {
                error!("[complete_generation] Image generation error: {}", e);
                self.current = None;
                self.last_error = Some(e);
            }
        }
        self.is_generating = false;
        true
    }

    /// Generates an image for the current parameters.
    pub async fn generate(&mut self) -> Option<&GeneratedArtifact> {
        let ticket = self.begin_generation();
        let result = self.service.generate(&self.api_url, &ticket.params).await;
        self.complete_generation(ticket, result);
        self.artifact()
    }

    // ============ Favorites ============

    pub fn favorites(&self) -> &FavoritesWorkflow {
        &self.favorites
    }

    /// Whether the shown artifact is in the favorites gallery
    pub fn is_favorited(&self) -> bool {
        match self.artifact() {
            Some(artifact) => is_favorited(artifact, &self.favorites.list()),
            None => false,
        }
    }

    /// Saves the shown artifact. `None` when nothing has been generated.
    pub fn save_favorite(&self) -> Result<Option<SaveOutcome>, StorageError> {
        match &self.current {
            Some(current) => self
                .favorites
                .save(&current.artifact, &current.params)
                .map(Some),
            None => Ok(None),
        }
    }

    // ============ Downloads ============

    /// Writes the shown artifact into `dest_dir`. `None` when nothing has been generated.
    pub async fn download(&self, dest_dir: &Path) -> Result<Option<PathBuf>, ExportError> {
        match &self.current {
            Some(current) => download_image(
                &current.artifact.image_data,
                current.params.category,
                dest_dir,
            )
            .await
            .map(Some),
            None => Ok(None),
        }
    }

    // ============ Orders ============

    pub fn orders(&self) -> &OrderWorkflow {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut OrderWorkflow {
        &mut self.orders
    }

    /// Opens the booking form for the shown artifact
    pub fn book_design(&mut self) -> bool {
        let source = self.current.as_ref().map(|current| OrderSource::Generated {
            artifact: current.artifact.clone(),
            params: current.params.clone(),
        });
        self.orders.open(source)
    }

    /// Opens the booking form for a saved favorite
    pub fn book_favorite(&mut self, record: FavoriteRecord) -> bool {
        self.orders.open(Some(OrderSource::Favorite(record)))
    }

    pub fn submit_order(&mut self) -> Result<OrderRecord, OrderError> {
        self.orders.submit()
    }

    pub fn cancel_order(&mut self) {
        self.orders.cancel();
    }
}
