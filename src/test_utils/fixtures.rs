//! Document fixtures.

use crate::core::Document;

/// An MDX document built up line by line for tests.
#[derive(Debug, Clone, Default)]
pub struct DocumentFixture {
    pub path: String,
    pub frontmatter: Vec<(String, String)>,
    pub body: String,
}

impl DocumentFixture {
    /// Empty document at `path`.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// A blog post with plain metadata and schema.org linked data.
    pub fn blog_post(path: &str) -> Self {
        Self::new(path)
            .with_field("title", "Hello")
            .with_field("description", "A first post")
            .with_field("$type", "https://mdx.org.ai/BlogPost")
            .with_field("$context", "https://schema.org")
            .with_body("# Hello\n\nWelcome to the blog.\n")
    }

    /// Append a raw `key: value` frontmatter line.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.frontmatter.push((key.to_string(), value.to_string()));
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Render as raw MDX text.
    pub fn render(&self) -> String {
        if self.frontmatter.is_empty() {
            return self.body.clone();
        }

        let mut text = String::from("---\n");
        for (key, value) in &self.frontmatter {
            text.push_str(&format!("{key}: {value}\n"));
        }
        text.push_str("---\n");
        text.push_str(&self.body);
        text
    }

    /// Convert into a [`Document`].
    pub fn document(&self) -> Document {
        Document::new(self.path.clone(), self.render())
    }
}
