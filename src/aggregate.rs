use std::future::Future;
use std::marker::PhantomData;

use thiserror::Error;
use tracing::debug;

use crate::reconciler::ReconcileOptions;
use crate::shipment::{PatchReport, RemovedChildren, ShipmentEntity, ShipmentError};

/// Shipment Repository trait
///
/// Generic parameters:
///
/// - `Error` - Repository error
#[cfg(not(feature = "not-send-futures"))]
pub trait ShipmentRepository<Error> {
    /// Fetches the persisted shipment with its child collections loaded.
    /// Desugared `async fn fetch_shipment(&self, id: &str) -> Result<Option<ShipmentEntity>, Error>;` to a normal `fn` that returns `impl Future` and adds bound `Send`
    fn fetch_shipment(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ShipmentEntity>, Error>> + Send;
    /// Saves the shipment and deletes the released children. Returns the saved shipment, with keys assigned.
    /// Desugared `async fn save_shipment(&self, shipment: &ShipmentEntity, removed: &RemovedChildren) -> Result<ShipmentEntity, Error>;` to a normal `fn` that returns `impl Future` and adds bound `Send`
    fn save_shipment(
        &self,
        shipment: &ShipmentEntity,
        removed: &RemovedChildren,
    ) -> impl Future<Output = Result<ShipmentEntity, Error>> + Send;
}

/// Shipment Repository trait
///
/// Generic parameters:
///
/// - `Error` - Repository error
#[cfg(feature = "not-send-futures")]
pub trait ShipmentRepository<Error> {
    /// Fetches the persisted shipment with its child collections loaded.
    /// Desugared `async fn fetch_shipment(&self, id: &str) -> Result<Option<ShipmentEntity>, Error>;` to a normal `fn` that returns `impl Future`
    fn fetch_shipment(&self, id: &str)
        -> impl Future<Output = Result<Option<ShipmentEntity>, Error>>;
    /// Saves the shipment and deletes the released children. Returns the saved shipment, with keys assigned.
    /// Desugared `async fn save_shipment(&self, shipment: &ShipmentEntity, removed: &RemovedChildren) -> Result<ShipmentEntity, Error>;` to a normal `fn` that returns `impl Future`
    fn save_shipment(
        &self,
        shipment: &ShipmentEntity,
        removed: &RemovedChildren,
    ) -> impl Future<Output = Result<ShipmentEntity, Error>>;
}

/// Errors raised by [ShipmentPatcher].
#[derive(Debug, Error)]
pub enum AggregateError<E> {
    /// The source shipment is invalid or could not be reconciled.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),
    /// The repository failed.
    #[error("repository error: {0}")]
    Repository(E),
}

/// The result of [ShipmentPatcher::handle].
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// The shipment as saved by the repository.
    pub shipment: ShipmentEntity,
    /// Per-collection reconciliation results. Empty when the shipment was new.
    pub report: PatchReport,
    /// `true` when no persisted shipment existed and the source was saved as a new one.
    pub created: bool,
}

/// Shipment Patcher.
///
/// It is using [ShipmentEntity::patch] to bring the persisted shipment in line with a source shipment.
/// It is using a [ShipmentRepository] to fetch the persisted shipment and to save the patched one.
///
/// Generic parameters:
///
/// - `Repository` - Shipment repository
/// - `Error` - Repository error
pub struct ShipmentPatcher<Repository, Error>
where
    Repository: ShipmentRepository<Error>,
{
    repository: Repository,
    options: ReconcileOptions,
    _marker: PhantomData<Error>,
}

impl<Repository, Error> ShipmentPatcher<Repository, Error>
where
    Repository: ShipmentRepository<Error>,
{
    /// Creates a new instance of [ShipmentPatcher] with the default reconciliation options.
    pub fn new(repository: Repository) -> Self {
        ShipmentPatcher {
            repository,
            options: ReconcileOptions::default(),
            _marker: PhantomData,
        }
    }

    /// Replaces the reconciliation options.
    pub fn with_options(self, options: ReconcileOptions) -> Self {
        ShipmentPatcher { options, ..self }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Handles the source shipment by validating it, fetching the persisted shipment, patching it, and saving it
    /// together with the released children.
    ///
    /// A source without a key, or whose key is unknown to the repository, is saved as a new shipment.
    pub async fn handle(
        &self,
        source: &ShipmentEntity,
    ) -> Result<PatchOutcome, AggregateError<Error>> {
        source.validate_aggregate()?;

        let current = match &source.id {
            Some(id) => self
                .repository
                .fetch_shipment(id)
                .await
                .map_err(AggregateError::Repository)?,
            None => None,
        };

        match current {
            Some(mut target) => {
                let report = source.patch_with(&mut target, &self.options)?;
                let removed = report.clone().into_removed();
                debug!(
                    created = report.created(),
                    updated = report.updated(),
                    removed = removed.len(),
                    "patched shipment {:?}",
                    target.id
                );
                let shipment = self
                    .repository
                    .save_shipment(&target, &removed)
                    .await
                    .map_err(AggregateError::Repository)?;
                Ok(PatchOutcome {
                    shipment,
                    report,
                    created: false,
                })
            }
            None => {
                debug!("saving new shipment {:?}", source.id);
                let shipment = self
                    .repository
                    .save_shipment(source, &RemovedChildren::default())
                    .await
                    .map_err(AggregateError::Repository)?;
                Ok(PatchOutcome {
                    shipment,
                    report: PatchReport::default(),
                    created: true,
                })
            }
        }
    }
}
