//! The CDN stack.
//!
//! Fronts either the contents bucket or the compute unit's public URL,
//! per the manifest's `cdn { origin ... }` setting.

use blogstack_config::{CdnOrigin, DeployContext};
use blogstack_core::{DeletionPolicy, ParameterNamespace, Stage, StackOutput};
use blogstack_params::ParameterResolver;
use blogstack_provision::{
    storage::CONTENTS_BUCKET_NAME_KEY, BucketCdn, ComputeProvisioner, ComputeSpec, FunctionCdn,
    ProvisionResult, StorageProvisioner, TargetArch,
};
use tracing::info;

use crate::app::CONTENTS_BUCKET_KEY;
use crate::synthesis::Synthesis;

pub struct CdnStack;

impl CdnStack {
    pub fn stack_name(service: &str, stage: Stage) -> String {
        format!("{service}-cdn-{stage}")
    }

    pub async fn synthesize(
        ctx: &DeployContext,
        resolver: &ParameterResolver,
    ) -> ProvisionResult<Synthesis> {
        let stack_name = Self::stack_name(&ctx.service, ctx.stage);
        let mut synthesis = Synthesis::new(stack_name, ctx.stage);
        let graph = &mut synthesis.graph;

        let deletion_policy = if ctx.cdn.retain_on_delete {
            DeletionPolicy::Retain
        } else {
            DeletionPolicy::Delete
        };

        let cdn = match ctx.cdn.origin {
            CdnOrigin::Bucket => {
                let bucket_name = resolver
                    .resolve(
                        ParameterNamespace::Infrastructure,
                        ctx.stage,
                        CONTENTS_BUCKET_NAME_KEY,
                    )
                    .await?;
                let bucket = StorageProvisioner::provision(graph, bucket_name, deletion_policy)?;
                BucketCdn::provision(graph, &bucket, deletion_policy)?
            }
            CdnOrigin::FunctionUrl => {
                let bucket_name = resolver
                    .resolve(ParameterNamespace::Application, ctx.stage, CONTENTS_BUCKET_KEY)
                    .await?;
                let bucket = StorageProvisioner::from_existing(bucket_name);

                let architecture = TargetArch::detect(ctx.compute.unknown_architecture)?;
                let compute = ComputeProvisioner::provision(
                    graph,
                    resolver,
                    ComputeSpec {
                        stage: ctx.stage,
                        contents_bucket_arn: bucket.arn(),
                        registry: None,
                        image_tag: ctx.image_tag().to_string(),
                        architecture,
                        timeout_seconds: ctx.compute.timeout_seconds,
                        public_url: true,
                    },
                )
                .await?;

                if let Some(url) = compute.invoke_url() {
                    synthesis
                        .outputs
                        .push(StackOutput::new("FunctionUrl", url));
                }

                FunctionCdn::provision(graph, &compute)?
            }
        };

        synthesis
            .outputs
            .push(StackOutput::new("DistributionDomainName", cdn.domain_name()));

        info!(
            stack = %synthesis.stack_name,
            stage = %ctx.stage,
            origin = ?ctx.cdn.origin,
            resources = synthesis.graph.len(),
            "composed cdn stack"
        );

        Ok(synthesis)
    }
}
