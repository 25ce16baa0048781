//! Instruction-formatted prompt for the reply model.

use crate::core::models::{EnrichmentBundle, Item};

pub const INSTRUCTION_HEADER: &str = "### Instruction:\n\
Respond to this Reddit post with an award winning top comment.\n\n";

pub const POST_SECTION_LABEL: &str = "### Reddit Post:\n";

pub const IMAGE_CONTEXT_LABEL: &str = "### Image Context:\n";

/// Marker after which the model continues with its reply.
pub const RESPONSE_MARKER: &str = "### Response:\n";

pub const DESCRIPTION_LABEL: &str = "- Description:";
pub const TEXT_LABEL: &str = "- Text:";
pub const ENTITIES_LABEL: &str = "- Celebrities:";

/// Title, then the body after a blank line when there is one.
#[must_use]
pub fn render_post(item: &Item) -> String {
    if item.body.is_empty() {
        item.title.clone()
    } else {
        format!("{}\n\n{}", item.title, item.body)
    }
}

fn field_line(label: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{label}\n")
    } else {
        format!("{label} {value}\n")
    }
}

/// Description, detected text and entities, always in that order. Empty
/// fields still get their line.
#[must_use]
pub fn render_image_context(bundle: &EnrichmentBundle) -> String {
    let mut out = String::from(IMAGE_CONTEXT_LABEL);
    out.push_str(&field_line(DESCRIPTION_LABEL, bundle.caption.trim()));
    out.push_str(&field_line(TEXT_LABEL, &bundle.detected_text.join(" ")));
    out.push_str(&field_line(ENTITIES_LABEL, &bundle.entities.join(", ")));
    out
}

/// Render the full prompt for `item`. Pure: identical inputs give identical output.
#[must_use]
pub fn assemble(item: &Item, bundle: &EnrichmentBundle) -> String {
    format!(
        "{INSTRUCTION_HEADER}{POST_SECTION_LABEL}{}\n\n{}\n{RESPONSE_MARKER}",
        render_post(item),
        render_image_context(bundle)
    )
}
