//! Markdown to HTML rendering.
//!
//! Drives pulldown-cmark over the scanned body and writes HTML directly,
//! so headings can carry fresh anchor ids and code blocks can carry a
//! `data-lang` attribute. The base grammar is a GitHub-flavored-Markdown
//! superset; soft line breaks render as hard breaks.

use std::fmt::Write;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::extension::{ExtensionSet, RenderContext};
use crate::footnote::FootnoteLookup;
use crate::scanner::{ScannedText, scan};
use crate::state::{HeadingCollector, TocEntry, escape_html};

/// Result of rendering one document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML (unsanitized).
    pub html: String,
    /// Flat table of contents in encounter order.
    pub toc: Vec<TocEntry>,
}

/// Render an article body to HTML.
///
/// `lookup` is the per-document footnote table built by
/// [`extract_footnotes`](crate::extract_footnotes); pass
/// [`FootnoteLookup::empty`] for content without footnotes.
#[must_use]
pub fn render_document(
    body: &str,
    lookup: &FootnoteLookup,
    extensions: &ExtensionSet,
) -> RenderResult {
    let cx = RenderContext { footnotes: lookup };
    let scanned = scan(body, extensions, &cx);

    let mut writer = HtmlWriter::new();
    for event in Parser::new_ext(&scanned.text, parser_options()) {
        writer.process(event);
    }

    let mut html = writer.output;
    let mut toc = writer.heading.take_entries();
    substitute(&mut html, &mut toc, &scanned);

    RenderResult { html, toc }
}

/// Render a standalone fragment (e.g. one footnote's content) through the
/// same grammar. No TOC is produced.
#[must_use]
pub fn render_fragment(
    fragment: &str,
    lookup: &FootnoteLookup,
    extensions: &ExtensionSet,
) -> String {
    let cx = RenderContext { footnotes: lookup };
    let scanned = scan(fragment, extensions, &cx);

    let mut writer = HtmlWriter::new();
    for event in Parser::new_ext(&scanned.text, parser_options()) {
        writer.process(event);
    }

    let mut html = writer.output;
    let mut toc = writer.heading.take_entries();
    substitute(&mut html, &mut toc, &scanned);
    html
}

/// GFM superset: tables, strikethrough, task lists.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Replace placeholders with rendered extension output, and restore the
/// raw source inside TOC text.
fn substitute(html: &mut String, toc: &mut [TocEntry], scanned: &ScannedText) {
    for sub in &scanned.substitutions {
        if sub.block {
            // A standalone block placeholder gets wrapped in a paragraph
            // by the parser; drop the wrapper with it.
            let wrapped = format!("<p>{}</p>", sub.placeholder);
            *html = html.replace(&wrapped, &sub.html);
        }
        *html = html.replace(&sub.placeholder, &sub.html);

        for entry in toc.iter_mut() {
            if entry.text.contains(&sub.placeholder) {
                entry.text = entry.text.replace(&sub.placeholder, &sub.raw);
            }
        }
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Event-driven HTML writer.
struct HtmlWriter {
    output: String,
    heading: HeadingCollector,
    code_lang: Option<String>,
    code_buffer: String,
    in_code: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    image_alt: String,
    in_image: bool,
    pending_image: Option<(String, String)>,
}

impl HtmlWriter {
    fn new() -> Self {
        Self {
            output: String::with_capacity(1024),
            heading: HeadingCollector::new(),
            code_lang: None,
            code_buffer: String::new(),
            in_code: false,
            alignments: Vec::new(),
            cell_index: 0,
            in_table_head: false,
            image_alt: String::new(),
            in_image: false,
            pending_image: None,
        }
    }

    /// Write inline content to the heading buffer when a heading is open,
    /// otherwise to the output.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            // Soft breaks become hard breaks.
            Event::SoftBreak | Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked {
                    r#"<input type="checkbox" checked disabled>"#
                } else {
                    r#"<input type="checkbox" disabled>"#
                });
            }
            // Parser options for these are not enabled; extensions handle
            // math and footnotes before the parse.
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                self.heading.start(heading_depth(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                self.in_code = true;
                self.code_buffer.clear();
                self.code_lang = match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => {
                        // The fence info word before any attributes.
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    _ => None,
                };
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => {
                    let _ = write!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.cell_index = 0;
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let align = match self.alignments.get(self.cell_index) {
                    Some(Alignment::Left) => r#" style="text-align:left""#,
                    Some(Alignment::Center) => r#" style="text-align:center""#,
                    Some(Alignment::Right) => r#" style="text-align:right""#,
                    Some(Alignment::None) | None => "",
                };
                let _ = write!(self.output, "<{tag}{align}>");
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => {
                let href = escape_html(&dest_url);
                self.push_inline(&format!(r#"<a href="{href}">"#));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.in_image = true;
                self.image_alt.clear();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.finish() {
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    );
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                self.in_code = false;
                let content = std::mem::take(&mut self.code_buffer);
                match self.code_lang.take() {
                    Some(lang) => {
                        let lang = escape_html(&lang);
                        let _ = write!(
                            self.output,
                            r#"<pre><code class="language-{lang}" data-lang="{lang}">{}</code></pre>"#,
                            escape_html(&content)
                        );
                    }
                    None => {
                        let _ = write!(
                            self.output,
                            "<pre><code>{}</code></pre>",
                            escape_html(&content)
                        );
                    }
                }
            }
            TagEnd::List(ordered) => {
                self.output.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
                self.cell_index += 1;
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                self.in_image = false;
                let alt = std::mem::take(&mut self.image_alt);
                if let Some((src, title)) = self.pending_image.take() {
                    if title.is_empty() {
                        let _ = write!(
                            self.output,
                            r#"<img src="{}" alt="{}">"#,
                            escape_html(&src),
                            escape_html(&alt)
                        );
                    } else {
                        let _ = write!(
                            self.output,
                            r#"<img src="{}" title="{}" alt="{}">"#,
                            escape_html(&src),
                            escape_html(&title),
                            escape_html(&alt)
                        );
                    }
                }
            }
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code {
            self.code_buffer.push_str(text);
        } else if self.in_image {
            self.image_alt.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.push_text(code);
            let _ = write!(
                self.heading.html_buffer(),
                "<code>{}</code>",
                escape_html(code)
            );
        } else {
            let _ = write!(self.output, "<code>{}</code>", escape_html(code));
        }
    }
}
