//! Order booking workflow.
//!
//! The booking form is a small state machine: `Closed -> Open`, then either
//! a successful submit or a cancel returns to `Closed`. A submit that fails
//! validation leaves the form open with its fields intact.

use chrono::Utc;
use log::{info, warn};

use crate::error::{OrderError, ValidationError};
use crate::ids::new_record_id;
use crate::models::{DesignFields, DesignParameters, FavoriteRecord, GeneratedArtifact, OrderRecord};
use crate::store::CollectionStore;

/// Item an order is booked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSource {
    /// The artifact currently shown in the studio.
    Generated {
        artifact: GeneratedArtifact,
        params: DesignParameters,
    },
    /// A design from the favorites gallery.
    Favorite(FavoriteRecord),
}

impl OrderSource {
    pub fn design_fields(&self) -> DesignFields {
        match self {
            OrderSource::Generated { artifact, params } => {
                DesignFields::from_artifact(artifact, params)
            }
            OrderSource::Favorite(record) => record.design.clone(),
        }
    }
}

/// Customer fields of the booking form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub advance_payment: String,
    pub order_notes: String,
}

impl OrderForm {
    /// Checks the required fields are non-blank
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("customerName", &self.customer_name),
            ("customerPhone", &self.customer_phone),
            ("customerAddress", &self.customer_address),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ValidationError::MissingRequiredField { field: *field }),
            None => Ok(()),
        }
    }
}

fn optional_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderState {
    Closed,
    Open { source: OrderSource },
}

/// Booking form over the ledger collection.
pub struct OrderWorkflow {
    ledger: CollectionStore<OrderRecord>,
    state: OrderState,
    form: OrderForm,
}

impl OrderWorkflow {
    pub fn new(ledger: CollectionStore<OrderRecord>) -> Self {
        Self {
            ledger,
            state: OrderState::Closed,
            form: OrderForm::default(),
        }
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, OrderState::Open { .. })
    }

    pub fn source(&self) -> Option<&OrderSource> {
        match &self.state {
            OrderState::Open { source } => Some(source),
            OrderState::Closed => None,
        }
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut OrderForm {
        &mut self.form
    }

    /// Ledger entries, newest first
    pub fn ledger(&self) -> Vec<OrderRecord> {
        self.ledger.read()
    }

    /// Opens the form for `source`. Without a source the form stays closed.
    pub fn open(&mut self, source: Option<OrderSource>) -> bool {
        match source {
            Some(source) => {
                self.state = OrderState::Open { source };
                true
            }
            None => {
                warn!("[open_order] Nothing to book");
                false
            }
        }
    }

    /// Validates the form and appends a ledger entry.
    ///
    /// On success the form closes and its fields are cleared. On any error
    /// the form stays open and keeps its fields.
    pub fn submit(&mut self) -> Result<OrderRecord, OrderError> {
        let source = self.source().ok_or(OrderError::NotOpen)?;
        self.form.validate()?;

        let record = OrderRecord {
            id: new_record_id(),
            design: source.design_fields(),
            customer_name: self.form.customer_name.trim().to_string(),
            customer_phone: self.form.customer_phone.trim().to_string(),
            customer_address: self.form.customer_address.trim().to_string(),
            advance_payment: optional_field(&self.form.advance_payment),
            order_notes: optional_field(&self.form.order_notes),
            created_at: Utc::now(),
        };

        self.ledger.append(record.clone())?;
        info!("[submit_order] Booked order {} for {}", record.id, record.customer_name);

        self.close();
        Ok(record)
    }

    /// Discards the form without writing anything.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.state = OrderState::Closed;
        self.form = OrderForm::default();
    }
}
