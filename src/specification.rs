//! ## A test specification DSL for reconcilers that supports the given-when-then format.

use pretty_assertions::assert_eq;

use crate::error::ReconcileError;
use crate::reconciler::{CollectionReconciliation, Reconciler, Reconciliation};

// ########################################################
// ############ Reconciler Specification DSL ##############
// ########################################################

/// A test specification DSL for reconcilers that supports the `given-when-then` format.
/// The DSL is used to specify the targets that are already persisted (GIVEN), the sources that are being reconciled (WHEN), and the expected targets (THEN).
pub struct ReconcilerTestSpecification<'a, Source, Target, Error>
where
    Target: PartialEq + std::fmt::Debug,
    Error: PartialEq + std::fmt::Debug,
{
    targets: Vec<Target>,
    sources: Option<Vec<Source>>,
    reconciler: Option<Reconciler<'a, Source, Target, Error>>,
}

impl<Source, Target, Error> Default for ReconcilerTestSpecification<'_, Source, Target, Error>
where
    Target: PartialEq + std::fmt::Debug,
    Error: PartialEq + std::fmt::Debug,
{
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            sources: None,
            reconciler: None,
        }
    }
}

impl<'a, Source, Target, Error> ReconcilerTestSpecification<'a, Source, Target, Error>
where
    Source: std::fmt::Debug,
    Target: PartialEq + std::fmt::Debug,
    Error: PartialEq + std::fmt::Debug,
{
    #[allow(dead_code)]
    /// Specify the reconciler you want to test
    pub fn for_reconciler(mut self, reconciler: Reconciler<'a, Source, Target, Error>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    #[allow(dead_code)]
    /// Given preconditions / persisted targets
    pub fn given(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    #[allow(dead_code)]
    /// When reconciling these sources
    pub fn when(mut self, sources: Vec<Source>) -> Self {
        self.sources = Some(sources);
        self
    }

    fn run(self) -> (Vec<Source>, Vec<Target>, Result<Reconciliation<Target>, ReconcileError<Error>>) {
        let reconciler = self
            .reconciler
            .expect("Reconciler must be initialized. Did you forget to call `for_reconciler`?");
        let sources = self
            .sources
            .expect("Sources must be initialized. Did you forget to call `when`?");
        let mut targets = self.targets;
        let result = reconciler.reconcile(&sources, &mut targets);
        (sources, targets, result)
    }

    #[allow(dead_code)]
    #[track_caller]
    /// Then expect the reconciled targets
    pub fn then(self, expected_targets: Vec<Target>) {
        let (sources, targets, result) = self.run();
        if let Err(error) = result {
            panic!("Targets were expected but the reconciler returned an error instead: {error:?}")
        }
        assert_eq!(
            targets, expected_targets,
            "Actual and Expected targets do not match!\nSources: {sources:?}\n",
        );
    }

    #[allow(dead_code)]
    #[track_caller]
    /// Then expect the reconciled targets and the reconciliation outcome
    pub fn then_outcome(self, expected_targets: Vec<Target>, expected: Reconciliation<Target>) {
        let (sources, targets, result) = self.run();
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => panic!(
                "An outcome was expected but the reconciler returned an error instead: {error:?}"
            ),
        };
        assert_eq!(
            targets, expected_targets,
            "Actual and Expected targets do not match!\nSources: {sources:?}\n",
        );
        assert_eq!(
            outcome, expected,
            "Actual and Expected outcomes do not match!\nSources: {sources:?}\n",
        );
    }

    #[allow(dead_code)]
    #[track_caller]
    /// Then expect error result and the targets as the failure left them
    pub fn then_error(self, expected_error: ReconcileError<Error>, expected_targets: Vec<Target>) {
        let (sources, targets, result) = self.run();
        let error = match result {
            Ok(outcome) => panic!(
                "An error was expected but the reconciler succeeded instead: {outcome:?}"
            ),
            Err(error) => error,
        };
        assert_eq!(
            error, expected_error,
            "Actual and Expected errors do not match.\nSources: {sources:?}\n"
        );
        assert_eq!(
            targets, expected_targets,
            "Actual and Expected targets do not match!\nSources: {sources:?}\n",
        );
    }
}
