//! Configuration files driving the pipeline

use anyhow::Result;
use mdxe::compiler::{CompileOptions, Compiler};
use mdxe::config::MdxeConfig;
use mdxe::core::{ArtifactReference, MdxeError};
use mdxe::fetcher::HttpResponse;
use mdxe::test_utils::{DocumentFixture, TestProject};
use serial_test::serial;

const CONFIG: &str = r#"
[imports]
base_url = "https://esm.sh"

[imports.aliases]
icons = "react-icons@4.11.0"

[mappings.default.layouts]
"schema.org/BlogPosting" = "https://esm.sh/@mdxui/article-layout"

[types."mdx.org.ai/Guide"]
inherits = ["schema.org/BlogPosting"]
"#;

fn load(project: &TestProject, contents: &str) -> Result<MdxeConfig> {
    let path = project.write_file("mdxe.toml", contents)?;
    let mut config = MdxeConfig::load_from(&path)?;
    config.cache.dir = Some(project.cache_dir().display().to_string());
    Ok(config)
}

/// Aliases and declared type inheritance from a file both apply
#[tokio::test]
async fn test_file_aliases_and_type_inheritance() -> Result<()> {
    let project = TestProject::new()?;
    let config = load(&project, CONFIG)?;
    project.transport.respond("https://esm.sh/react-icons@4.11.0", HttpResponse::ok("icons"));
    project.transport.respond("https://esm.sh/@mdxui/article-layout", HttpResponse::ok("layout"));

    let compiler = Compiler::with_transport(&config, project.transport.clone())?;
    let document = DocumentFixture::new("guide.mdx")
        .with_field("$type", "https://mdx.org.ai/Guide")
        .with_body("<Icon />")
        .document();
    let options = CompileOptions::default().with_component(ArtifactReference::new("Icon", "icons"));
    let output = compiler.compile(&document, &options).await?;

    let lines: Vec<&str> = output.code.lines().collect();
    assert_eq!(lines[0], "export Icon from 'https://esm.sh/react-icons@4.11.0'");
    assert_eq!(lines[1], "export layout from 'https://esm.sh/@mdxui/article-layout'");
    assert!(output.code.ends_with("<Icon />"));
    Ok(())
}

/// Reachability probing turns an unpublished package into an unresolvable specifier
#[tokio::test]
async fn test_probe_enabled_from_file() -> Result<()> {
    let project = TestProject::new()?;
    let config = load(&project, "[resolver]\nprobe = true\n")?;
    assert!(config.resolver.probe);

    let compiler = Compiler::with_transport(&config, project.transport.clone())?;
    let options = CompileOptions::default().with_component(ArtifactReference::new("Ghost", "ghost-pkg"));
    let err = compiler
        .compile(&DocumentFixture::new("g.mdx").with_body("<Ghost />").document(), &options)
        .await
        .unwrap_err();

    assert!(matches!(err.root_cause(), MdxeError::UnresolvableSpecifier { .. }));
    // The probe ran; the fetch never did
    assert_eq!(project.transport.request_count("https://esm.sh/ghost-pkg"), 1);
    Ok(())
}

/// Invalid values are rejected at load time
#[test]
fn test_invalid_values_rejected() -> Result<()> {
    let project = TestProject::new()?;
    for contents in ["[cache]\nttl_hours = 0\n", "[imports]\nbase_url = \"not a url\"\n", "[local]\nextensions = [\"tsx\"]\n"] {
        let path = project.write_file("mdxe.toml", contents)?;
        assert!(MdxeConfig::load_from(&path).is_err(), "accepted: {contents}");
    }
    Ok(())
}

/// Explicitly named file must exist
#[test]
fn test_missing_explicit_file() -> Result<()> {
    let project = TestProject::new()?;
    let err = MdxeConfig::load(Some(&project.path().join("absent.toml"))).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
    Ok(())
}

/// Discovery walks up from nested directories
#[test]
#[serial]
fn test_discovery_walks_up() -> Result<()> {
    let project = TestProject::new()?;
    let config_path = project.write_file("mdxe.toml", CONFIG)?;
    let nested = project.path().join("docs/guides/advanced");
    std::fs::create_dir_all(&nested)?;

    let found = MdxeConfig::discover(&nested).expect("config should be discovered");
    assert_eq!(found.canonicalize()?, config_path.canonicalize()?);
    Ok(())
}

/// `MDXE_CONFIG_PATH` overrides discovery
#[test]
#[serial]
fn test_config_path_env_override() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("mdxe.toml", CONFIG)?;
    let elsewhere = project.write_file("other/custom.toml", "[resolver]\nprobe = true\n")?;

    // SAFETY: serialized with every other test that reads this variable
    unsafe { std::env::set_var("MDXE_CONFIG_PATH", &elsewhere) };
    let found = MdxeConfig::discover(project.path());
    unsafe { std::env::remove_var("MDXE_CONFIG_PATH") };

    assert_eq!(found, Some(elsewhere));
    Ok(())
}
