//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use blogstack_config::{CdnOrigin, DeployContext, Manifest, StackSelection};
use blogstack_core::ParameterNamespace;
use blogstack_params::{FileParameterStore, ParameterResolver};
use blogstack_stacks::synthesize;

/// Load the manifest and validate every out-of-band input, once, before
/// anything is composed.
pub fn build_context(
    manifest_path: &Path,
    stage: Option<&str>,
    stack: Option<&str>,
    commit: Option<String>,
) -> anyhow::Result<DeployContext> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("loading manifest {}", manifest_path.display()))?;
    let ctx = DeployContext::build(manifest, stage, stack, commit)?;
    Ok(ctx)
}

/// Build a resolver over the JSON-file parameter store.
pub fn resolver(
    ctx: &DeployContext,
    params_file: Option<&Path>,
) -> anyhow::Result<ParameterResolver> {
    let path = params_file.context("no parameter store configured; pass --params <file.json>")?;
    let store = FileParameterStore::load(path)
        .with_context(|| format!("loading parameter file {}", path.display()))?;
    Ok(ParameterResolver::new(Arc::new(store), ctx.service.clone()))
}

/// Render the stack template as JSON on stdout.
pub async fn synth(ctx: &DeployContext, resolver: &ParameterResolver) -> anyhow::Result<()> {
    let synthesis = synthesize(ctx, resolver).await?;
    let template = synthesis.template()?;
    println!("{}", serde_json::to_string_pretty(&template)?);
    Ok(())
}

/// Print the dependency-ordered apply plan.
pub async fn plan(ctx: &DeployContext, resolver: &ParameterResolver) -> anyhow::Result<()> {
    let synthesis = synthesize(ctx, resolver).await?;
    let plan = synthesis.plan()?;

    println!(
        "Stack {} (stage {}, run {})",
        plan.stack_name, plan.stage, plan.run_id
    );
    if plan.operations.is_empty() {
        println!("  no resources composed");
        return Ok(());
    }
    for (i, op) in plan.operations.iter().enumerate() {
        let retain = match op.deletion_policy {
            blogstack_core::DeletionPolicy::Retain => " [retain]",
            blogstack_core::DeletionPolicy::Delete => "",
        };
        println!("  {:>2}. {} ({}){}", i + 1, op.id, op.resource_type, retain);
    }
    for output in &synthesis.outputs {
        match &output.export_name {
            Some(export) => println!("  output {} (exported as {export})", output.name),
            None => println!("  output {}", output.name),
        }
    }
    Ok(())
}

/// List every parameter path the selected stack reads for this stage.
pub fn params(ctx: &DeployContext) {
    use blogstack_provision::compute::ENV_KEYS;

    let app = |key: &str| ParameterNamespace::Application.path(&ctx.service, ctx.stage, key);
    let infra = |key: &str| ParameterNamespace::Infrastructure.path(&ctx.service, ctx.stage, key);

    let mut paths: Vec<String> = Vec::new();
    match &ctx.stack {
        StackSelection::App => {
            paths.push(app(blogstack_stacks::app::CONTENTS_BUCKET_KEY));
            paths.extend(ENV_KEYS.iter().map(|k| app(k)));
            paths.push(infra(blogstack_provision::certificate::CERTIFICATE_ARN_KEY));
            paths.push(infra(blogstack_stacks::app::DOMAIN_NAME_KEY));
            paths.push(infra(blogstack_provision::dns::HOSTED_ZONE_ID_KEY));
            paths.push(infra(blogstack_provision::dns::HOSTED_ZONE_NAME_KEY));
        }
        StackSelection::Cdn => match ctx.cdn.origin {
            CdnOrigin::Bucket => {
                paths.push(infra(blogstack_provision::storage::CONTENTS_BUCKET_NAME_KEY));
            }
            CdnOrigin::FunctionUrl => {
                paths.push(app(blogstack_stacks::app::CONTENTS_BUCKET_KEY));
                paths.extend(ENV_KEYS.iter().map(|k| app(k)));
            }
        },
        StackSelection::Unrecognized(raw) => {
            println!("unrecognized stack selection '{raw}'; no parameters required");
            return;
        }
    }

    paths.sort();
    paths.dedup();
    for path in paths {
        println!("{path}");
    }
}

/// Parse the manifest and report what it configures.
pub fn validate(manifest_path: &Path) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("loading manifest {}", manifest_path.display()))?;

    println!("manifest ok: service '{}'", manifest.service);
    println!(
        "  compute: timeout {}s, unknown-architecture {:?}",
        manifest.compute.timeout_seconds, manifest.compute.unknown_architecture
    );
    println!(
        "  cdn: origin {:?}, retain-on-delete {}",
        manifest.cdn.origin, manifest.cdn.retain_on_delete
    );
    Ok(())
}
