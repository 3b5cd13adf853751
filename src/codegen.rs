//! Code Generation - Single Entry Point
//!
//! `generate` is a pure function of the document and options: no clock, no
//! random ids, no environment. Files are kept in a `BTreeMap` so the bundle
//! serializes identically every time.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::render::{escape_attr, escape_text, RenderTable, INDENT};
use crate::schema::UiIr;

pub const DEFAULT_ACCENT: &str = "#3b82f6";
pub const DEFAULT_FONT: &str = "'Inter', sans-serif";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("Unsupported framework: {0} (expected one of: next, react)")]
    UnsupportedFramework(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Next,
    React,
}

impl Framework {
    pub fn as_str(self) -> &'static str {
        match self {
            Framework::Next => "next",
            Framework::React => "react",
        }
    }

    /// Path of the entry file within the bundle.
    pub fn entry_path(self) -> &'static str {
        match self {
            Framework::Next => "app/page.tsx",
            Framework::React => "src/main.tsx",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Framework::Next),
            "react" => Ok(Framework::React),
            other => Err(CodegenError::UnsupportedFramework(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(default)]
    pub framework: Framework,
}

impl GenerateOptions {
    pub fn new(framework: Framework) -> Self {
        Self { framework }
    }

    pub fn for_target(framework: &str) -> Result<Self, CodegenError> {
        Ok(Self::new(framework.parse()?))
    }
}

/// Generated source files keyed by relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBundle {
    pub files: BTreeMap<String, String>,
    pub entry: String,
    pub framework: Framework,
}

impl CodeBundle {
    pub fn entry_source(&self) -> Option<&str> {
        self.files.get(&self.entry).map(String::as_str)
    }
}

/// Lower a validated document with the standard render table.
pub fn generate(ui: &UiIr, options: &GenerateOptions) -> CodeBundle {
    generate_with(&RenderTable::standard(), ui, options)
}

/// Parse the framework name first, so an unknown target never yields a
/// partial bundle.
pub fn generate_target(ui: &UiIr, framework: &str) -> Result<CodeBundle, CodegenError> {
    let options = GenerateOptions::for_target(framework)?;
    Ok(generate(ui, &options))
}

pub fn generate_with(table: &RenderTable, ui: &UiIr, options: &GenerateOptions) -> CodeBundle {
    let framework = options.framework;
    let mut files = BTreeMap::new();

    match framework {
        Framework::Next => {
            files.insert("app/page.tsx".to_string(), next_page(table, ui));
            files.insert("app/layout.tsx".to_string(), next_layout(ui));
            files.insert("app/globals.css".to_string(), globals_css(ui));
            files.insert("tailwind.config.js".to_string(), tailwind_config());
            files.insert("postcss.config.js".to_string(), POSTCSS_CONFIG.to_string());
        }
        Framework::React => {
            files.insert("src/App.tsx".to_string(), react_component(table, ui));
            files.insert("src/main.tsx".to_string(), REACT_MAIN.to_string());
            files.insert("index.html".to_string(), host_html(ui));
        }
    }
    files.insert("package.json".to_string(), package_json(ui, framework));

    tracing::debug!(framework = %framework, files = files.len(), "bundle generated");

    CodeBundle {
        files,
        entry: framework.entry_path().to_string(),
        framework,
    }
}

/// The `GeneratedApp` component wrapping the lowered tree.
pub fn react_component(table: &RenderTable, ui: &UiIr) -> String {
    let markup = table.render(&ui.layout_tree);
    format!(
        "import React from 'react';\n\nexport const GeneratedApp: React.FC = () => {{\n{i}return ({markup}\n{i});\n}};\n",
        i = INDENT,
        markup = markup
    )
}

pub fn next_page(table: &RenderTable, ui: &UiIr) -> String {
    format!(
        "'use client';\n\n{}\nexport default function Page() {{\n{}return <GeneratedApp />;\n}}\n",
        react_component(table, ui),
        INDENT
    )
}

fn next_layout(ui: &UiIr) -> String {
    let description = ui.description.as_deref().unwrap_or("");
    format!(
        r#"import './globals.css';
import type {{ Metadata }} from 'next';

export const metadata: Metadata = {{
  title: {title},
  description: {description},
}};

export default function RootLayout({{ children }}: {{ children: React.ReactNode }}) {{
  return (
    <html lang="{lang}">
      <body>{{children}}</body>
    </html>
  );
}}
"#,
        title = js_string(&ui.title),
        description = js_string(description),
        lang = escape_attr(&ui.locale),
    )
}

/// Accent comes from `accent`, then `primary`, then the fixed default.
pub fn accent_color(ui: &UiIr) -> &str {
    let colors = &ui.theme.tokens.colors;
    colors
        .get("accent")
        .or_else(|| colors.get("primary"))
        .map(String::as_str)
        .filter(|c| is_css_safe(c))
        .unwrap_or(DEFAULT_ACCENT)
}

fn body_font(ui: &UiIr) -> &str {
    ui.theme
        .tokens
        .typography
        .font_families
        .get("body")
        .map(String::as_str)
        .filter(|f| is_css_safe(f))
        .unwrap_or(DEFAULT_FONT)
}

fn is_css_safe(value: &str) -> bool {
    !value.is_empty() && !value.contains([';', '{', '}', '<', '>'])
}

fn globals_css(ui: &UiIr) -> String {
    format!(
        "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n:root {{\n  --accent: {};\n}}\n\nbody {{\n  font-family: {};\n  background: #f8fafc;\n}}\n",
        accent_color(ui),
        body_font(ui)
    )
}

fn tailwind_config() -> String {
    r#"/** @type {import('tailwindcss').Config} */
module.exports = {
  content: ['./app/**/*.{ts,tsx,js,jsx}', './components/**/*.{ts,tsx,js,jsx}'],
  theme: {
    extend: {},
  },
  plugins: [],
};
"#
    .to_string()
}

const POSTCSS_CONFIG: &str = r#"module.exports = {
  plugins: {
    tailwindcss: {},
    autoprefixer: {},
  },
};
"#;

const REACT_MAIN: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import { GeneratedApp } from './App';

ReactDOM.createRoot(document.getElementById('root')!).render(<GeneratedApp />);
"#;

fn host_html(ui: &UiIr) -> String {
    format!(
        "<!doctype html>\n<html lang=\"{}\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    <title>{}</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n    <script type=\"module\" src=\"/src/main.tsx\"></script>\n  </body>\n</html>\n",
        escape_attr(&ui.locale),
        escape_text(&ui.title)
    )
}

fn package_json(ui: &UiIr, framework: Framework) -> String {
    let manifest = match framework {
        Framework::Next => json!({
            "name": package_name(&ui.id),
            "private": true,
            "version": ui.version,
            "scripts": { "dev": "next dev", "build": "next build", "start": "next start" },
            "dependencies": {
                "next": "^14.1.0",
                "react": "^18.2.0",
                "react-dom": "^18.2.0"
            },
            "devDependencies": {
                "autoprefixer": "^10.4.17",
                "postcss": "^8.4.35",
                "tailwindcss": "^3.4.1"
            }
        }),
        Framework::React => json!({
            "name": package_name(&ui.id),
            "private": true,
            "version": ui.version,
            "type": "module",
            "scripts": { "dev": "vite", "build": "vite build", "preview": "vite preview" },
            "dependencies": {
                "react": "^18.2.0",
                "react-dom": "^18.2.0"
            },
            "devDependencies": {
                "@vitejs/plugin-react": "^4.2.1",
                "vite": "^5.1.0"
            }
        }),
    };
    // serde_json::Map is ordered by key, so this is stable.
    let mut text = serde_json::to_string_pretty(&manifest).unwrap_or_default();
    text.push('\n');
    text
}

/// npm-safe package name derived from the document id.
fn package_name(id: &str) -> String {
    let slug: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "generated-prototype".to_string()
    } else {
        slug
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_document;

    #[test]
    fn test_framework_parsing() {
        assert_eq!("next".parse::<Framework>(), Ok(Framework::Next));
        assert_eq!("react".parse::<Framework>(), Ok(Framework::React));
        assert_eq!(
            "vue".parse::<Framework>(),
            Err(CodegenError::UnsupportedFramework("vue".to_string()))
        );
    }

    #[test]
    fn test_react_layout() {
        let bundle = generate(&sample_document(), &GenerateOptions::new(Framework::React));
        assert_eq!(bundle.entry, "src/main.tsx");
        assert!(bundle.files.contains_key("src/App.tsx"));
        assert!(bundle.files.contains_key("index.html"));
        assert!(bundle.entry_source().unwrap().contains("getElementById('root')"));
        assert!(bundle.files["index.html"].contains("<div id=\"root\"></div>"));
    }

    #[test]
    fn test_accent_falls_back() {
        let mut ui = sample_document();
        assert_eq!(accent_color(&ui), "#f97316");

        ui.theme.tokens.colors.remove("accent");
        assert_eq!(accent_color(&ui), "#3b82f6");

        ui.theme.tokens.colors.clear();
        assert_eq!(accent_color(&ui), DEFAULT_ACCENT);

        ui.theme.tokens.colors.insert("accent".into(), "red;} body {".into());
        assert_eq!(accent_color(&ui), DEFAULT_ACCENT);
    }

    #[test]
    fn test_layout_uses_locale_and_title() {
        let ui = sample_document();
        let bundle = generate(&ui, &GenerateOptions::default());
        let layout = &bundle.files["app/layout.tsx"];
        assert!(layout.contains("<html lang=\"zh-CN\">"));
        assert!(layout.contains(&js_string(&ui.title)));
    }

    #[test]
    fn test_package_name_slug() {
        assert_eq!(package_name("Demo Project_1"), "demo-project-1");
        assert_eq!(package_name("###"), "generated-prototype");
    }
}
