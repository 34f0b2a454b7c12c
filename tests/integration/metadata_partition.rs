//! Plain and linked metadata through `compile`

use anyhow::Result;
use mdxe::compiler::CompileOptions;
use mdxe::test_utils::{DocumentFixture, TestProject};
use serde_json::{Value, json};

/// Every key lands in exactly one map, with no loss
#[tokio::test]
async fn test_partition_is_total_and_disjoint() -> Result<()> {
    let project = TestProject::new()?;
    let compiler = project.compiler()?;

    let cases: Vec<Vec<(&str, &str)>> = vec![
        vec![],
        vec![("title", "Only plain")],
        vec![("$type", "https://schema.org/Thing")],
        vec![("@id", "https://example.com/post"), ("title", "Mixed"), ("$context", "https://schema.org")],
        vec![("tags", "[\"a\", \"b\"]"), ("$meta", "{\"draft\": true}"), ("count", "3")],
    ];

    for fields in cases {
        let mut fixture = DocumentFixture::new("case.mdx").with_body("body");
        for (key, value) in &fields {
            fixture = fixture.with_field(key, value);
        }
        let output = compiler.compile(&fixture.document(), &CompileOptions::default()).await?;

        assert_eq!(output.plain_metadata.len() + output.linked_metadata.len(), fields.len());
        for (key, _) in &fields {
            let linked = key.starts_with('$') || key.starts_with('@');
            assert_eq!(output.linked_metadata.contains_key(*key), linked, "{key}");
            assert_eq!(output.plain_metadata.contains_key(*key), !linked, "{key}");
        }
    }
    Ok(())
}

/// Structured frontmatter values keep their structure
#[tokio::test]
async fn test_structured_values_preserved() -> Result<()> {
    let project = TestProject::new()?;
    let document = DocumentFixture::new("s.mdx")
        .with_field("tags", "[\"rust\", \"mdx\"]")
        .with_field("$meta", "{\"draft\": true}")
        .with_field("title", "\"Quoted: title\"")
        .document();

    let output = project.compiler()?.compile(&document, &CompileOptions::default()).await?;

    assert_eq!(output.plain_metadata["tags"], json!(["rust", "mdx"]));
    assert_eq!(output.plain_metadata["title"], json!("Quoted: title"));
    assert_eq!(output.linked_metadata["$meta"], json!({ "draft": true }));
    Ok(())
}

/// Metadata export carries the plain summary plus linked data
#[tokio::test]
async fn test_metadata_export() -> Result<()> {
    let project = TestProject::new()?;
    let document = DocumentFixture::blog_post("post.mdx").with_field("keywords", "rust, mdx").document();
    let options = CompileOptions {
        emit_metadata: true,
        ..CompileOptions::default()
    };

    let output = project.compiler()?.compile(&document, &options).await?;

    let json_text = output
        .code
        .strip_prefix("export const metadata = ")
        .and_then(|rest| rest.split("\n# Hello").next())
        .expect("metadata export should lead the output");
    let metadata: Value = serde_json::from_str(json_text)?;
    assert_eq!(
        metadata,
        json!({
            "title": "Hello",
            "description": "A first post",
            "keywords": ["rust", "mdx"],
            "$type": "https://mdx.org.ai/BlogPost",
            "$context": "https://schema.org"
        })
    );
    Ok(())
}

/// Documents without frontmatter compile to the body unchanged
#[tokio::test]
async fn test_no_frontmatter() -> Result<()> {
    let project = TestProject::new()?;
    let text = "# Plain\n\nNo metadata here.\n";
    let output = project
        .compiler()?
        .compile(&DocumentFixture::new("p.mdx").with_body(text).document(), &CompileOptions::default())
        .await?;

    assert_eq!(output.code, text);
    assert!(output.plain_metadata.is_empty());
    assert!(output.linked_metadata.is_empty());
    Ok(())
}
