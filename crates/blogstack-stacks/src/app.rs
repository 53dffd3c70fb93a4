//! The backend application stack.
//!
//! Registry -> compute -> certificate -> gateway -> dns, with stage-scoped
//! outputs for downstream consumers.

use blogstack_config::DeployContext;
use blogstack_core::{ParameterNamespace, Stage, StackOutput};
use blogstack_params::ParameterResolver;
use blogstack_provision::{
    dns::{HOSTED_ZONE_ID_KEY, HOSTED_ZONE_NAME_KEY},
    CertificateProvisioner, ComputeProvisioner, ComputeSpec, ContainerRegistry, CustomDomain,
    DnsProvisioner, GatewayProvisioner, ProvisionResult, RecordName, StorageProvisioner,
    TargetArch,
};
use tracing::info;

use crate::synthesis::Synthesis;

pub const CONTENTS_BUCKET_KEY: &str = "BLOG_AWS_S3_BUCKET";
pub const DOMAIN_NAME_KEY: &str = "DOMAIN_NAME";

pub struct BackendAppStack;

impl BackendAppStack {
    pub fn stack_name(service: &str, stage: Stage) -> String {
        format!("{service}-backend-{stage}")
    }

    pub async fn synthesize(
        ctx: &DeployContext,
        resolver: &ParameterResolver,
    ) -> ProvisionResult<Synthesis> {
        let stack_name = Self::stack_name(&ctx.service, ctx.stage);
        let mut synthesis = Synthesis::new(stack_name.clone(), ctx.stage);
        let graph = &mut synthesis.graph;

        // Contents bucket exists outside this stack; only its name is ours.
        let bucket_name = resolver
            .resolve(ParameterNamespace::Application, ctx.stage, CONTENTS_BUCKET_KEY)
            .await?;
        let bucket = StorageProvisioner::from_existing(bucket_name);

        let registry = ContainerRegistry::provision(graph, &stack_name)?;

        let architecture = TargetArch::detect(ctx.compute.unknown_architecture)?;
        let compute = ComputeProvisioner::provision(
            graph,
            resolver,
            ComputeSpec {
                stage: ctx.stage,
                contents_bucket_arn: bucket.arn(),
                registry: Some(&registry),
                image_tag: ctx.image_tag().to_string(),
                architecture,
                timeout_seconds: ctx.compute.timeout_seconds,
                public_url: false,
            },
        )
        .await?;

        let certificate = CertificateProvisioner::resolve(resolver, ctx.stage).await?;
        let domain_name = resolver
            .resolve(ParameterNamespace::Infrastructure, ctx.stage, DOMAIN_NAME_KEY)
            .await?;

        let gateway = GatewayProvisioner::provision(
            graph,
            &stack_name,
            &compute,
            Some(CustomDomain {
                domain_name: domain_name.clone(),
                certificate_arn: certificate.arn,
            }),
        )?;

        let hosted_zone_id = resolver
            .resolve(ParameterNamespace::Infrastructure, ctx.stage, HOSTED_ZONE_ID_KEY)
            .await?;
        let hosted_zone_name = resolver
            .resolve(
                ParameterNamespace::Infrastructure,
                ctx.stage,
                HOSTED_ZONE_NAME_KEY,
            )
            .await?;

        let dns = DnsProvisioner::new(hosted_zone_id, hosted_zone_name);
        dns.create_alias_record(graph, RecordName::new(&domain_name), gateway.alias_target()?)?;

        synthesis.outputs = vec![
            StackOutput::new("ECRRepositoryName", registry.name.clone()),
            StackOutput::new("APIGatewayUrl", gateway.api_url()),
            StackOutput::new("APIUrl", format!("https://{domain_name}"))
                .exported_as(format!("{stack_name}-api-url")),
            StackOutput::new("LambdaLogGroupName", compute.log_group_name()),
        ];

        info!(
            stack = %synthesis.stack_name,
            stage = %ctx.stage,
            resources = synthesis.graph.len(),
            "composed backend app stack"
        );

        Ok(synthesis)
    }
}
