//! Markdown to HTML batch conversion.
//!
//! Walks a folder for Markdown documents, rewrites `.md` cross-references to
//! `.html`, renders each document with `pulldown-cmark` and writes a styled
//! page into a mirrored output tree.
//!
//! Rendering adds a few things on top of CommonMark:
//!
//! - tables and strikethrough
//! - fenced code blocks highlighted with `syntect` inside `<div class="codehilite">`
//! - ```` ```mermaid ```` blocks emitted as `<pre class="mermaid">` for the
//!   embedded mermaid script
//! - slug ids on every heading, and a `[TOC]` paragraph replaced by a nested
//!   table of contents
//!
//! A batch stops at the first document that fails to read, render or write.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{ConverterConfig, RewriteMode};
use crate::highlight::SyntaxHighlighter;

const SOURCE_EXT: &str = ".md";
const TARGET_EXT: &str = ".html";
const TOC_MARKER: &str = "[TOC]";

/// One converted document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of [`convert_all`].
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub output_root: PathBuf,
    pub documents: Vec<ConvertedDocument>,
}

/// CLI entry point for `tutorgen convert`.
pub fn run_convert(config: &ConverterConfig, source: &Path, output: Option<&Path>) -> Result<()> {
    let report = convert_all(config, source, output)?;
    for doc in &report.documents {
        println!(
            "Converted {} to {}",
            doc.source.display(),
            doc.destination.display()
        );
    }
    println!(
        "{} document(s) written to {}",
        report.documents.len(),
        report.output_root.display()
    );
    Ok(())
}

/// Convert every matching document under `source_root`.
///
/// `output_root` defaults to `source_root/html`. Files already under the
/// output root are never picked up as sources.
pub fn convert_all(
    config: &ConverterConfig,
    source_root: &Path,
    output_root: Option<&Path>,
) -> Result<ConvertReport> {
    if !source_root.is_dir() {
        bail!("Source folder does not exist: {}", source_root.display());
    }

    let output_root = output_root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source_root.join("html"));
    fs::create_dir_all(&output_root).with_context(|| {
        format!(
            "Failed to create output folder: {}",
            output_root.display()
        )
    })?;

    let include_set = build_globset(&config.include_globs)?;
    let highlighter = SyntaxHighlighter::new()?;
    let mut documents = Vec::new();

    // Compared canonically so `docs` and `./docs/html` still line up.
    let source_canonical = fs::canonicalize(source_root)
        .with_context(|| format!("Failed to resolve {}", source_root.display()))?;
    let output_canonical = fs::canonicalize(&output_root)
        .with_context(|| format!("Failed to resolve {}", output_root.display()))?;
    let skip_output = output_canonical != source_canonical;

    let walker = WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(skip_output
                && e.file_type().is_dir()
                && fs::canonicalize(e.path()).is_ok_and(|p| p == output_canonical))
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(source_root).unwrap_or(path);
        if !include_set.is_match(relative) {
            continue;
        }

        let destination =
            convert_document(config, &highlighter, path, source_root, &output_root)?;
        documents.push(ConvertedDocument {
            source: path.to_path_buf(),
            destination,
        });
    }

    Ok(ConvertReport {
        output_root,
        documents,
    })
}

/// Convert one document and return the path it was written to.
///
/// The destination keeps the document's path relative to `source_root`,
/// with the extension changed to `.html`.
pub fn convert_document(
    config: &ConverterConfig,
    highlighter: &SyntaxHighlighter,
    source: &Path,
    source_root: &Path,
    output_root: &Path,
) -> Result<PathBuf> {
    let markdown = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let body = render_document(&markdown, config.rewrite, highlighter);
    let page = wrap_page(&source.display().to_string(), &body, &config.mermaid_url);

    let relative = match source.strip_prefix(source_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => source
            .file_name()
            .map(PathBuf::from)
            .with_context(|| format!("Not a file path: {}", source.display()))?,
    };
    let destination = output_root.join(relative).with_extension("html");

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&destination, page)
        .with_context(|| format!("Failed to write {}", destination.display()))?;

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        "converted document"
    );
    Ok(destination)
}

/// Replace every `.md` in `text` with `.html`.
///
/// This is a plain substring replace: prose and code blocks are rewritten
/// too. [`RewriteMode::Links`] limits it to link destinations.
pub fn rewrite_cross_references(text: &str) -> String {
    text.replace(SOURCE_EXT, TARGET_EXT)
}

/// Render a Markdown document body to an HTML fragment.
pub fn render_document(
    markdown: &str,
    mode: RewriteMode,
    highlighter: &SyntaxHighlighter,
) -> String {
    match mode {
        RewriteMode::All => {
            render_markdown(&rewrite_cross_references(markdown), mode, highlighter)
        }
        RewriteMode::Links => render_markdown(markdown, mode, highlighter),
    }
}

fn render_markdown(text: &str, mode: RewriteMode, highlighter: &SyntaxHighlighter) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let events: Vec<Event> = Parser::new_ext(text, options).collect();
    let events = transform_events(events, mode, highlighter);

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

// ============ Event transforms ============

#[derive(Debug, Clone)]
struct Heading {
    index: usize,
    level: u8,
    id: String,
    text: String,
}

enum CodeStyle {
    Mermaid,
    Highlighted {
        language: Option<String>,
        source: String,
    },
}

fn transform_events<'a>(
    events: Vec<Event<'a>>,
    mode: RewriteMode,
    highlighter: &SyntaxHighlighter,
) -> Vec<Event<'a>> {
    let headings = collect_headings(&events);
    let heading_ids: HashMap<usize, String> =
        headings.iter().map(|h| (h.index, h.id.clone())).collect();
    let toc_markers = find_toc_markers(&events);

    let mut out = Vec::with_capacity(events.len());
    let mut skip_until: Option<usize> = None;
    let mut code: Option<CodeStyle> = None;

    for (i, event) in events.into_iter().enumerate() {
        if let Some(end) = skip_until {
            if i <= end {
                continue;
            }
            skip_until = None;
        }
        if let Some(&end) = toc_markers.get(&i) {
            out.extend(toc_events(&headings));
            skip_until = Some(end);
            continue;
        }

        match event {
            Event::Start(Tag::Heading {
                level,
                id: _,
                classes,
                attrs,
            }) => out.push(Event::Start(Tag::Heading {
                level,
                id: heading_ids.get(&i).cloned().map(CowStr::from),
                classes,
                attrs,
            })),
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = code_language(&kind);
                if language.as_deref() == Some("mermaid") {
                    out.push(Event::Html("<pre class=\"mermaid\">".into()));
                    code = Some(CodeStyle::Mermaid);
                } else {
                    code = Some(CodeStyle::Highlighted {
                        language,
                        source: String::new(),
                    });
                }
            }
            Event::Text(text) if matches!(code, Some(CodeStyle::Highlighted { .. })) => {
                if let Some(CodeStyle::Highlighted { source, .. }) = &mut code {
                    source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => match code.take() {
                Some(CodeStyle::Mermaid) => out.push(Event::Html("</pre>\n".into())),
                Some(CodeStyle::Highlighted { language, source }) => {
                    out.extend(highlighted_block(highlighter, language.as_deref(), source));
                }
                None => out.push(Event::End(TagEnd::CodeBlock)),
            },
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) if mode == RewriteMode::Links => out.push(Event::Start(Tag::Link {
                link_type,
                dest_url: rewrite_destination(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) if mode == RewriteMode::Links => out.push(Event::Start(Tag::Image {
                link_type,
                dest_url: rewrite_destination(dest_url),
                title,
                id,
            })),
            other => out.push(other),
        }
    }

    out
}

/// First word of a fenced block's info string.
fn code_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

fn highlighted_block<'a>(
    highlighter: &SyntaxHighlighter,
    language: Option<&str>,
    source: String,
) -> Vec<Event<'a>> {
    match highlighter.highlight(&source, language) {
        Ok(html) => vec![Event::Html(
            format!("<div class=\"codehilite\">\n{}</div>\n", html).into(),
        )],
        Err(e) => {
            tracing::warn!(error = %e, "syntax highlighting failed, emitting plain code");
            vec![
                Event::Html("<div class=\"codehilite\">\n<pre><code>".into()),
                Event::Text(source.into()),
                Event::Html("</code></pre>\n</div>\n".into()),
            ]
        }
    }
}

fn rewrite_destination(dest: CowStr<'_>) -> CowStr<'_> {
    match rewrite_link_target(&dest) {
        Some(rewritten) => CowStr::from(rewritten),
        None => dest,
    }
}

/// `doc.md` -> `doc.html`, `doc.md#intro` -> `doc.html#intro`.
fn rewrite_link_target(dest: &str) -> Option<String> {
    if let Some(stem) = dest.strip_suffix(SOURCE_EXT) {
        return Some(format!("{}{}", stem, TARGET_EXT));
    }
    let anchored = format!("{}#", SOURCE_EXT);
    dest.find(&anchored).map(|pos| {
        format!(
            "{}{}{}",
            &dest[..pos],
            TARGET_EXT,
            &dest[pos + SOURCE_EXT.len()..]
        )
    })
}

fn collect_headings(events: &[Event<'_>]) -> Vec<Heading> {
    // Explicit `{#id}`s are reserved up front so auto slugs never reuse them.
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    let mut headings = Vec::new();
    let mut i = 0;

    while i < events.len() {
        if let Event::Start(Tag::Heading { level, id, .. }) = &events[i] {
            let mut text = String::new();
            let mut j = i + 1;
            while j < events.len() {
                match &events[j] {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
                j += 1;
            }

            let id = match id {
                Some(explicit) => explicit.to_string(),
                None => unique_slug(&text, &used),
            };
            used.insert(id.clone());
            headings.push(Heading {
                index: i,
                level: *level as u8,
                id,
                text,
            });
            i = j;
        }
        i += 1;
    }

    headings
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_sep = true;
        }
    }
    slug
}

fn unique_slug(text: &str, used: &HashSet<String>) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
        base = "section".to_string();
    }

    let mut candidate = base.clone();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    candidate
}

/// Paragraphs whose whole text is `[TOC]`, as start index -> end index.
fn find_toc_markers(events: &[Event<'_>]) -> HashMap<usize, usize> {
    let mut markers = HashMap::new();

    for (i, event) in events.iter().enumerate() {
        if !matches!(event, Event::Start(Tag::Paragraph)) {
            continue;
        }
        let mut text = String::new();
        for (j, inner) in events.iter().enumerate().skip(i + 1) {
            match inner {
                Event::Text(t) => text.push_str(t),
                Event::End(TagEnd::Paragraph) => {
                    if text.trim() == TOC_MARKER {
                        markers.insert(i, j);
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    markers
}

fn toc_events<'a>(headings: &[Heading]) -> Vec<Event<'a>> {
    let mut events = vec![Event::Html("<div class=\"toc\">\n".into())];
    let mut open: Vec<u8> = Vec::new();

    for heading in headings {
        while let Some(&top) = open.last() {
            if heading.level < top && open.len() > 1 {
                events.push(Event::Html("</li>\n</ul>\n".into()));
                open.pop();
            } else {
                break;
            }
        }
        match open.last() {
            Some(&top) if heading.level <= top => {
                events.push(Event::Html("</li>\n".into()));
            }
            // Deeper than the open entry, or the first heading: nest a list.
            _ => {
                events.push(Event::Html("<ul>\n".into()));
                open.push(heading.level);
            }
        }
        events.push(Event::Html(
            format!("<li><a href=\"#{}\">", heading.id).into(),
        ));
        events.push(Event::Text(heading.text.clone().into()));
        events.push(Event::Html("</a>".into()));
    }

    for _ in &open {
        events.push(Event::Html("</li>\n</ul>\n".into()));
    }
    events.push(Event::Html("</div>\n".into()));
    events
}

// ============ Page template ============

/// Wrap a rendered fragment in the standalone page shell.
pub fn wrap_page(title: &str, body: &str, mermaid_url: &str) -> String {
    format!(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
        <script type="module">
            import mermaid from '{mermaid_url}';
            mermaid.initialize({{ startOnLoad: true }});
        </script>
       <style>
            body {{
                max-width: 800px;
                margin: 2em auto;
                font-family: system-ui, sans-serif;
                line-height: 1.6;
                color: #333;
                padding: 0 1em;
            }}
            pre {{
                background: #f6f8fa;
                padding: 1em;
                overflow-x: auto;
            }}
            code {{
                background: #f0f0f0;
                padding: 2px 4px;
                border-radius: 4px;
            }}
            a {{
                color: #0366d6;
                text-decoration: none;
            }}
            a:hover {{
                text-decoration: underline;
            }}
        </style>
</head>
<body>
{body}
</body>
</html>
"#
    )
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
