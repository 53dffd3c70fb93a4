//! Stack compositions for blogstack.
//!
//! A stack composes provisioners into one resource graph for a (stage,
//! selection) pair and surfaces outputs. Stages are fully independent
//! resource sets; the only cross-stack coupling is stage-scoped exports.

pub mod app;
pub mod cdn;
pub mod synthesis;

pub use app::BackendAppStack;
pub use cdn::CdnStack;
pub use synthesis::{Plan, PlanOperation, Synthesis};

use blogstack_config::{DeployContext, StackSelection};
use blogstack_params::ParameterResolver;
use blogstack_provision::ProvisionResult;
use tracing::warn;

/// Compose the stack the context selects.
///
/// An unrecognized selection composes zero resources and emits a diagnostic
/// rather than failing the run.
pub async fn synthesize(
    ctx: &DeployContext,
    resolver: &ParameterResolver,
) -> ProvisionResult<Synthesis> {
    match &ctx.stack {
        StackSelection::App => BackendAppStack::synthesize(ctx, resolver).await,
        StackSelection::Cdn => CdnStack::synthesize(ctx, resolver).await,
        StackSelection::Unrecognized(raw) => {
            warn!(stack = %raw, "unrecognized stack selection, composing nothing");
            Ok(Synthesis::empty(
                format!("{}-{}", ctx.service, ctx.stage),
                ctx.stage,
            ))
        }
    }
}
