//! HTML rendering of author metadata.
//!
//! The author panel is the block shown next to a document whenever one of
//! its authors is selected: name, title, description, portrait and a
//! definition list of ranked properties. [`render_author_panel`] produces just
//! the fragment for embedding; [`render_author_page`] wraps it in a
//! standalone document for previewing from the CLI.
//!
//! ## Structure
//!
//! ```text
//! section.author-panel
//! ├── header         name, title, description
//! ├── figure         portrait + legend (when an image property exists)
//! └── dl             one dt/dd pair per property
//!     └── ul > li    one item per value, qualifiers in span.qualifiers
//! ```
//!
//! ## CSS
//!
//! `static/author.css` is embedded at compile time and inlined into the
//! standalone page.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Every interpolated value is escaped, which matters here: property values
//! come from an external knowledge base.

use crate::properties::{AggregatedProperty, AuthorMetadata, QualifierGroup, ValueGroup};
use maud::{DOCTYPE, Markup, html};

const CSS_STATIC: &str = include_str!("../static/author.css");

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the author panel fragment.
pub fn render_author_panel(metadata: &AuthorMetadata) -> Markup {
    let author = &metadata.author;
    html! {
        section.author-panel id={ "author-" (author.slug) } data-author-id=(author.id) {
            header {
                h1 { (author.name) }
                @if !author.title.is_empty() {
                    p.author-title { (author.title) }
                }
                @if !author.description.is_empty() {
                    p.author-description { (author.description) }
                }
            }
            @if let Some(image) = &metadata.image {
                figure.author-image {
                    img src=(image.url) alt=(image.alt);
                    figcaption { (image.alt) }
                }
            }
            @if !metadata.properties.is_empty() {
                dl.author-properties {
                    @for property in &metadata.properties {
                        (render_property(property))
                    }
                }
            }
        }
    }
}

fn render_property(property: &AggregatedProperty) -> Markup {
    html! {
        dt data-rank=(property.rank) { (property.display_name) }
        dd {
            ul {
                @for group in &property.values {
                    (render_value(group))
                }
            }
        }
    }
}

fn render_value(group: &ValueGroup) -> Markup {
    html! {
        li {
            (group.value)
            @if !group.qualifiers.is_empty() {
                " "
                span.qualifiers {
                    "("
                    @for (i, qualifier) in group.qualifiers.iter().enumerate() {
                        @if i > 0 { "; " }
                        (render_qualifier(qualifier))
                    }
                    ")"
                }
            }
        }
    }
}

fn render_qualifier(qualifier: &QualifierGroup) -> Markup {
    html! {
        (qualifier.name()) ": " (qualifier.values().join(", "))
    }
}

/// Renders a standalone page containing only the author panel.
pub fn render_author_page(metadata: &AuthorMetadata) -> Markup {
    base_document(&metadata.author.name, CSS_STATIC, render_author_panel(metadata))
}
