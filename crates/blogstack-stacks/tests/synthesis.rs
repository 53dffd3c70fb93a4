//! End-to-end synthesis against an in-memory parameter store.

use std::sync::Arc;

use blogstack_config::{manifest::parse_manifest, DeployContext};
use blogstack_core::{LogicalId, ResourceType};
use blogstack_params::{MemoryParameterStore, ParameterResolver};
use blogstack_provision::compute::ENV_KEYS;
use blogstack_stacks::{synthesize, Synthesis};

fn seeded_store(stage: &str) -> MemoryParameterStore {
    let store = MemoryParameterStore::new();
    for key in ENV_KEYS {
        store.insert(format!("/blog-api/{stage}/{key}"), format!("value-{key}"));
    }
    store.insert(
        format!("/blog-api/{stage}/BLOG_AWS_S3_BUCKET"),
        "blog-contents",
    );
    store.insert(
        format!("/blog-api-infra/{stage}/ACM_CERTIFICATE_ARN"),
        "arn:aws:acm:ap-northeast-1:123456789012:certificate/abc",
    );
    store.insert(
        format!("/blog-api-infra/{stage}/DOMAIN_NAME"),
        "api.example.com",
    );
    store.insert(format!("/blog-api-infra/{stage}/ROUTE53_HOSTED_ZONE_ID"), "Z123");
    store.insert(
        format!("/blog-api-infra/{stage}/ROUTE53_HOSTED_ZONE_NAME"),
        "example.com",
    );
    store.insert(
        format!("/blog-api-infra/{stage}/CONTENTS_BUCKET_NAME"),
        "blog-cdn-contents",
    );
    store
}

fn resolver(stage: &str) -> ParameterResolver {
    ParameterResolver::new(Arc::new(seeded_store(stage)), "blog")
}

fn context(stage: &str, stack: &str, manifest_kdl: &str) -> DeployContext {
    let manifest = parse_manifest(manifest_kdl).unwrap();
    DeployContext::build(manifest, Some(stage), Some(stack), None).unwrap()
}

fn position(synthesis: &Synthesis, id: &str) -> usize {
    synthesis
        .graph
        .apply_order()
        .unwrap()
        .iter()
        .position(|x| x.as_str() == id)
        .unwrap_or_else(|| panic!("{id} not in apply order"))
}

#[tokio::test]
async fn app_stack_composes_in_dependency_order() {
    let ctx = context("dev", "app", r#"service "blog""#);
    let synthesis = synthesize(&ctx, &resolver("dev")).await.unwrap();

    assert_eq!(synthesis.stack_name, "blog-backend-dev");

    // Registry before image push before function.
    assert!(position(&synthesis, "Repository") < position(&synthesis, "ImagePush"));
    assert!(position(&synthesis, "ImagePush") < position(&synthesis, "DockerImageFunction"));
    // Gateway domain before the DNS alias record.
    assert!(position(&synthesis, "CustomDomain") < position(&synthesis, "AliasRecord"));

    // The alias record edge is present in the composed graph, not just
    // satisfied by accident of ordering.
    assert!(synthesis
        .graph
        .has_edge(&LogicalId::from("AliasRecord"), &LogicalId::from("CustomDomain")));
}

#[tokio::test]
async fn app_stack_surfaces_stage_scoped_outputs() {
    let ctx = context("prod", "app", r#"service "blog""#);
    let synthesis = synthesize(&ctx, &resolver("prod")).await.unwrap();

    let names: Vec<&str> = synthesis.outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ECRRepositoryName",
            "APIGatewayUrl",
            "APIUrl",
            "LambdaLogGroupName"
        ]
    );

    let api_url = synthesis
        .outputs
        .iter()
        .find(|o| o.name == "APIUrl")
        .unwrap();
    assert_eq!(
        api_url.export_name.as_deref(),
        Some("blog-backend-prod-api-url")
    );
}

#[tokio::test]
async fn cdn_stack_composes_only_cdn_resources() {
    let ctx = context("dev", "cdn", r#"service "blog""#);
    let synthesis = synthesize(&ctx, &resolver("dev")).await.unwrap();

    assert_eq!(synthesis.stack_name, "blog-cdn-dev");
    assert!(!synthesis.graph.is_empty());
    for node in synthesis.graph.nodes() {
        assert!(
            !matches!(
                node.resource_type,
                ResourceType::EcrRepository
                    | ResourceType::HttpApi
                    | ResourceType::DnsRecord
                    | ResourceType::LambdaFunction
            ),
            "application resource {} leaked into cdn stack",
            node.id
        );
    }
}

#[tokio::test]
async fn cdn_stack_honors_retain_on_delete() {
    let kdl = r#"
        service "blog"
        cdn {
            origin "bucket"
            retain-on-delete #true
        }
    "#;
    let ctx = context("prod", "cdn", kdl);
    let synthesis = synthesize(&ctx, &resolver("prod")).await.unwrap();

    let template = synthesis.template().unwrap();
    assert_eq!(
        template["resources"]["Distribution"]["deletion_policy"],
        serde_json::json!("retain")
    );
}

#[tokio::test]
async fn cdn_stack_function_url_origin_variant() {
    let kdl = r#"
        service "blog"
        cdn { origin "function-url" }
    "#;
    let ctx = context("dev", "cdn", kdl);
    let synthesis = synthesize(&ctx, &resolver("dev")).await.unwrap();

    // Invoke permission lands after the distribution it is scoped to.
    assert!(position(&synthesis, "Distribution") < position(&synthesis, "InvokeByCloudFront"));
    assert!(synthesis.outputs.iter().any(|o| o.name == "FunctionUrl"));
}

#[tokio::test]
async fn unrecognized_stack_selection_composes_nothing() {
    let ctx = context("dev", "nonsense", r#"service "blog""#);
    let synthesis = synthesize(&ctx, &resolver("dev")).await.unwrap();

    assert!(synthesis.graph.is_empty());
    assert!(synthesis.outputs.is_empty());
}

#[tokio::test]
async fn missing_parameters_abort_with_no_resources() {
    let ctx = context("dev", "app", r#"service "blog""#);
    // Store missing every application key.
    let store = MemoryParameterStore::new().with("/blog-api/dev/BLOG_AWS_S3_BUCKET", "bucket");
    let resolver = ParameterResolver::new(Arc::new(store), "blog");

    let result = synthesize(&ctx, &resolver).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn commit_identifier_flows_into_image_push() {
    let manifest = parse_manifest(r#"service "blog""#).unwrap();
    let ctx = DeployContext::build(
        manifest,
        Some("dev"),
        Some("app"),
        Some("cafe1234".to_string()),
    )
    .unwrap();
    let synthesis = synthesize(&ctx, &resolver("dev")).await.unwrap();

    let template = synthesis.template().unwrap();
    assert_eq!(
        template["resources"]["ImagePush"]["properties"]["tag"],
        serde_json::json!("cafe1234")
    );
}
