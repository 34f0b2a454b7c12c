//! Compilation pipeline scenarios

use anyhow::Result;
use mdxe::compiler::CompileOptions;
use mdxe::core::{ArtifactReference, MdxeError};
use mdxe::fetcher::HttpResponse;
use mdxe::resolver::{ArtifactKind, SpecifierResolver};
use mdxe::test_utils::{DocumentFixture, TestProject, init_test_logging};
use serde_json::{Value, json};

const BODY_MARKER: &str = "BODY-MARKER";

/// Declared component resolved through a mapping is exported before the body
#[tokio::test]
async fn test_mapped_component_exported_before_body() -> Result<()> {
    init_test_logging(None);
    let mut project = TestProject::new()?;
    project
        .config
        .mappings
        .default
        .components
        .insert("react-button".to_string(), "https://esm.sh/react-button@1.0.0".to_string());
    project.transport.respond("https://esm.sh/react-button@1.0.0", HttpResponse::ok("export default Button"));

    let document = DocumentFixture::new("button.mdx").with_body("<Button>Click</Button>\n").document();
    let options = CompileOptions::default().with_component(ArtifactReference::new("Button", "react-button"));
    let output = project.compiler()?.compile(&document, &options).await?;

    let export = "export Button from 'https://esm.sh/react-button@1.0.0'";
    let export_at = output.code.find(export).expect("component export missing");
    let body_at = output.code.find("<Button>Click</Button>").expect("body missing");
    assert!(export_at < body_at);
    assert_eq!(project.transport.request_count("https://esm.sh/react-button@1.0.0"), 1);
    Ok(())
}

/// Scoped package without a version synthesizes a clean registry URL
#[tokio::test]
async fn test_scoped_package_resolves_without_version_suffix() -> Result<()> {
    let resolved = SpecifierResolver::default().resolve("@mdx-js/react", None, None).await?;
    assert_eq!(resolved.url, "https://esm.sh/@mdx-js/react");
    assert_eq!(resolved.kind, ArtifactKind::Component);
    Ok(())
}

/// Local specifier finds the first existing extension with no network traffic
#[tokio::test]
async fn test_local_specifier_probes_extensions() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("test/dir/components/Button.ts", "export const Button = () => null")?;

    let content = project
        .fetcher()
        .fetch("./components/Button", Some(&project.path().join("test/dir")))
        .await?;

    assert_eq!(content, "export const Button = () => null");
    assert_eq!(project.transport.total_requests(), 0);
    Ok(())
}

/// Type and context pick a context-specific layout; linked metadata has no extra keys
#[tokio::test]
async fn test_context_specific_layout_from_type() -> Result<()> {
    let mut project = TestProject::new()?;
    let mut docs = mdxe::resolver::MappingTable::default();
    docs.layouts.insert(
        "https://schema.org/BlogPosting".to_string(),
        "https://esm.sh/@mdxui/docs-layout".to_string(),
    );
    project.config.mappings.contexts.insert("https://mdx.org.ai/docs".to_string(), docs);
    project.transport.respond("https://esm.sh/@mdxui/docs-layout", HttpResponse::ok("export default Layout"));

    let document = DocumentFixture::new("guide.mdx")
        .with_field("$type", "https://schema.org/BlogPosting")
        .with_field("$context", "https://mdx.org.ai/docs")
        .with_body("# Guide\n")
        .document();
    let output = project.compiler()?.compile(&document, &CompileOptions::default()).await?;

    assert!(output.code.starts_with("export layout from 'https://esm.sh/@mdxui/docs-layout'\n"));
    assert_eq!(
        Value::Object(output.linked_metadata),
        json!({
            "$type": "https://schema.org/BlogPosting",
            "$context": "https://mdx.org.ai/docs"
        })
    );
    assert!(output.plain_metadata.is_empty());
    Ok(())
}

/// Inherited type falls back to the schema.org/Thing layout
#[tokio::test]
async fn test_layout_found_through_type_inheritance() -> Result<()> {
    let mut project = TestProject::new()?;
    project
        .config
        .mappings
        .default
        .layouts
        .insert("schema.org/Thing".to_string(), "https://esm.sh/@mdxui/thing-layout".to_string());
    project.transport.respond("https://esm.sh/@mdxui/thing-layout", HttpResponse::ok("layout"));

    let document = DocumentFixture::blog_post("post.mdx").document();
    let output = project.compiler()?.compile(&document, &CompileOptions::default()).await?;

    assert!(output.code.starts_with("export layout from 'https://esm.sh/@mdxui/thing-layout'"));
    Ok(())
}

/// A type with no usable layout compiles without a layout export
#[tokio::test]
async fn test_layout_derivation_failure_is_silent() -> Result<()> {
    let project = TestProject::new()?;
    let compiler = project.compiler()?;

    // Unmapped URL type on a host outside the allow-list
    let document = DocumentFixture::new("recipe.mdx")
        .with_field("$type", "https://schema.org/Recipe")
        .with_body(BODY_MARKER)
        .document();
    let output = compiler.compile(&document, &CompileOptions::default()).await?;
    assert_eq!(output.code, BODY_MARKER);

    // Synthesized package URL that the registry does not serve
    let options = CompileOptions::default().with_type("UnknownThing");
    let output = compiler.compile(&DocumentFixture::new("x.mdx").with_body(BODY_MARKER).document(), &options).await?;
    assert_eq!(output.code, BODY_MARKER);
    assert_eq!(project.transport.request_count("https://esm.sh/UnknownThing"), 1);
    Ok(())
}

/// Exports precede the body for every combination of components and layout
#[tokio::test]
async fn test_exports_always_precede_body() -> Result<()> {
    let mut project = TestProject::new()?;
    for i in 0..3 {
        let url = format!("https://esm.sh/c{i}@1.0.0");
        project.config.mappings.default.components.insert(format!("c{i}"), url.clone());
        project.transport.respond(&url, HttpResponse::ok(format!("c{i}")));
    }
    project.transport.respond("https://esm.sh/site-layout", HttpResponse::ok("layout"));
    let compiler = project.compiler()?;
    let document = DocumentFixture::new("doc.mdx").with_body(BODY_MARKER).document();

    for count in 0..=3 {
        for with_layout in [false, true] {
            let mut options = CompileOptions::default();
            for i in 0..count {
                options = options.with_component(ArtifactReference::new(format!("C{i}"), format!("c{i}")));
            }
            if with_layout {
                options = options.with_layout(ArtifactReference::new("layout", "site-layout"));
            }

            let output = compiler.compile(&document, &options).await?;
            let lines: Vec<&str> = output.code.lines().collect();
            let exports = count + usize::from(with_layout);

            assert_eq!(lines.len(), exports + 1, "unexpected code: {}", output.code);
            assert!(lines[..exports].iter().all(|l| l.starts_with("export ")));
            assert_eq!(lines[exports], BODY_MARKER);
            if with_layout {
                assert_eq!(lines[exports - 1], "export layout from 'https://esm.sh/site-layout'");
            }
            for (i, line) in lines.iter().take(count).enumerate() {
                assert_eq!(*line, format!("export C{i} from 'https://esm.sh/c{i}@1.0.0'"));
            }
        }
    }
    Ok(())
}

/// Frontmatter declarations are compiled, with explicit options taking precedence
#[tokio::test]
async fn test_frontmatter_components_merged_with_options() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond("https://esm.sh/chart-lib@2.0.0", HttpResponse::ok("chart"));
    project.transport.respond("https://esm.sh/card-v2", HttpResponse::ok("card"));

    let document = DocumentFixture::new("dash.mdx")
        .with_field("components", r#"{"Chart": "chart-lib@2.0.0", "Card": "card-v1"}"#)
        .with_body("<Chart /><Card />")
        .document();
    let options = CompileOptions::default().with_component(ArtifactReference::new("Card", "card-v2"));
    let output = project.compiler()?.compile(&document, &options).await?;

    let lines: Vec<&str> = output.code.lines().collect();
    assert_eq!(lines[0], "export Chart from 'https://esm.sh/chart-lib@2.0.0'");
    assert_eq!(lines[1], "export Card from 'https://esm.sh/card-v2'");
    assert!(output.code.ends_with("<Chart /><Card />"));
    assert_eq!(project.transport.request_count("https://esm.sh/card-v1"), 0);
    assert!(output.plain_metadata.contains_key("components"));
    Ok(())
}

/// Version on a reference is applied during synthesis
#[tokio::test]
async fn test_reference_version_applied() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond("https://esm.sh/react-button@1.0.0", HttpResponse::ok("button"));

    let options = CompileOptions::default()
        .with_component(ArtifactReference::new("Button", "react-button").with_version("1.0.0"));
    let output = project
        .compiler()?
        .compile(&DocumentFixture::new("v.mdx").with_body("x").document(), &options)
        .await?;

    assert!(output.code.starts_with("export Button from 'https://esm.sh/react-button@1.0.0'"));
    Ok(())
}

/// Unreachable URL fails with the status and leaves no cache entry
#[tokio::test]
async fn test_failed_fetch_reports_status_and_caches_nothing() -> Result<()> {
    let project = TestProject::new()?;
    let url = "https://esm.sh/does-not-exist@0.0.0";
    project.transport.respond(url, HttpResponse::status(404, "Not Found"));

    let err = project.fetcher().fetch(url, None).await.unwrap_err();
    match err {
        MdxeError::FetchError {
            url: failed,
            cause,
        } => {
            assert_eq!(failed, url);
            assert!(cause.contains("404"));
        }
        other => panic!("Expected FetchError, got {other:?}"),
    }
    assert!(!project.cache().path_for(url).exists());
    Ok(())
}

/// A required artifact failure aborts with document and specifier named
#[tokio::test]
async fn test_required_failure_names_document_and_specifier() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond("https://esm.sh/ok-lib", HttpResponse::ok("ok"));

    let document = DocumentFixture::new("docs/broken.mdx").with_body("<A /><B />").document();
    let options = CompileOptions::default()
        .with_component(ArtifactReference::new("A", "ok-lib"))
        .with_component(ArtifactReference::new("B", "missing-lib"));
    let err = project.compiler()?.compile(&document, &options).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("docs/broken.mdx"), "{message}");
    assert!(message.contains("missing-lib"), "{message}");
    assert!(matches!(err.root_cause(), MdxeError::FetchError { .. }));
    Ok(())
}

/// Missing local component surfaces as a compilation error
#[tokio::test]
async fn test_missing_local_component() -> Result<()> {
    let project = TestProject::new()?;
    let options = CompileOptions::default()
        .with_component(ArtifactReference::new("Widget", "./Widget"))
        .with_base_dir(project.path());

    let err = project
        .compiler()?
        .compile(&DocumentFixture::new("w.mdx").with_body("<Widget />").document(), &options)
        .await
        .unwrap_err();

    assert!(matches!(err, MdxeError::CompilationError { ref specifier, .. } if specifier == "./Widget"));
    assert!(matches!(err.root_cause(), MdxeError::LocalArtifactNotFound { .. }));
    Ok(())
}

/// Bare imports in the body are rewritten when enabled
#[tokio::test]
async fn test_bare_import_rewriting() -> Result<()> {
    let mut project = TestProject::new()?;
    project.config.imports.rewrite_bare_imports = true;

    let document = DocumentFixture::new("imports.mdx")
        .with_body("import Chart from 'recharts'\nimport Local from './Local'\n\n<Chart />\n")
        .document();
    let output = project.compiler()?.compile(&document, &CompileOptions::default()).await?;

    assert!(output.code.contains("import Chart from 'https://esm.sh/recharts'"));
    assert!(output.code.contains("import Local from './Local'"));
    Ok(())
}

/// Indented component maps are read, and names that cannot be exported are skipped
#[tokio::test]
async fn test_block_frontmatter_components() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond("https://esm.sh/chart-lib@2.0.0", HttpResponse::ok("chart"));

    let document = DocumentFixture::new("block.mdx")
        .with_field("components", "\n  Chart: chart-lib@2.0.0\n  my-card: card-lib")
        .with_body("<Chart />\n")
        .document();
    let output = project.compiler()?.compile(&document, &CompileOptions::default()).await?;

    assert_eq!(output.code, "export Chart from 'https://esm.sh/chart-lib@2.0.0'\n<Chart />\n");
    assert_eq!(project.transport.total_requests(), 1);
    Ok(())
}

/// An explicit component name that is not an identifier is rejected before any fetch
#[tokio::test]
async fn test_invalid_component_name_rejected() -> Result<()> {
    let project = TestProject::new()?;
    let options = CompileOptions::default()
        .with_component(ArtifactReference::new("X from 'evil'; export Y", "react-button"));

    let err = project
        .compiler()?
        .compile(&DocumentFixture::new("bad.mdx").with_body("x").document(), &options)
        .await
        .unwrap_err();

    assert!(matches!(err.root_cause(), MdxeError::InvalidComponentName { .. }));
    assert_eq!(project.transport.total_requests(), 0);
    Ok(())
}
