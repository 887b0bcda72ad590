//! Head fragments contributed by plugins, layouts and pages.
//!
//! Fragments merge additively: a later title replaces an earlier one, a later
//! meta with the same name replaces the earlier value in place, and styles
//! sharing an id are concatenated with a single space.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadStyle {
    pub id: Option<String>,
    pub css: String,
}

impl HeadStyle {
    pub fn new(css: impl Into<String>) -> Self {
        HeadStyle {
            id: None,
            css: css.into(),
        }
    }

    pub fn with_id(id: impl Into<String>, css: impl Into<String>) -> Self {
        HeadStyle {
            id: Some(id.into()),
            css: css.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    title: Option<String>,
    metas: Vec<(String, String)>,
    styles: Vec<HeadStyle>,
}

impl Head {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn meta(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        let name = name.into();
        let content = content.into();
        match self.metas.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = content,
            None => self.metas.push((name, content)),
        }
        self
    }

    pub fn style(&mut self, css: impl Into<String>) -> &mut Self {
        self.push_style(HeadStyle::new(css))
    }

    pub fn style_with_id(&mut self, id: impl Into<String>, css: impl Into<String>) -> &mut Self {
        self.push_style(HeadStyle::with_id(id, css))
    }

    pub fn push_style(&mut self, style: HeadStyle) -> &mut Self {
        if let Some(id) = &style.id {
            if let Some(existing) = self.styles.iter_mut().find(|s| s.id.as_ref() == Some(id)) {
                existing.css.push(' ');
                existing.css.push_str(&style.css);
                return self;
            }
        }
        self.styles.push(style);
        self
    }

    /// Fold `later` into `self`; `later` wins on conflicts.
    pub fn merge(&mut self, later: Head) {
        if later.title.is_some() {
            self.title = later.title;
        }
        for (name, content) in later.metas {
            self.meta(name, content);
        }
        for style in later.styles {
            self.push_style(style);
        }
    }

    pub fn get_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.metas.is_empty() && self.styles.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            let _ = write!(out, "<title>{}</title>", escape_html(title));
        }
        for (name, content) in &self.metas {
            let _ = write!(
                out,
                r#"<meta name="{}" content="{}" />"#,
                escape_html(name),
                escape_html(content)
            );
        }
        for style in &self.styles {
            let css = style.css.replace("</", "<\\/");
            match &style.id {
                Some(id) => {
                    let _ = write!(out, r#"<style id="{}">{}</style>"#, escape_html(id), css);
                }
                None => {
                    let _ = write!(out, "<style>{}</style>", css);
                }
            }
        }
        out
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
