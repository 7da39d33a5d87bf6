// ABOUTME: Deploy engine: per-release type state, retries, rollback and the run report.
// ABOUTME: Exports deploy_all and the types callers inspect afterwards.

mod deployment;
mod error;
mod executor;
mod options;
mod report;
mod rollback;
mod state;
mod transitions;

pub use deployment::ReleaseDeployment;
pub use error::{DeployError, DeployErrorKind};
pub use executor::{Deployer, deploy_all};
pub use options::DeployOptions;
pub use report::{DeployReport, OutcomeStatus, ReleaseOutcome, RollbackOutcome};
pub use rollback::rollback;
pub use state::{Installed, Linted, Pending, Ready};
pub use transitions::{ReleaseFailure, TransitionError, TransitionResult};
