//! Caption generation for product posts

use crate::domain::entities::Product;

/// Instagram rejects captions longer than this
pub const MAX_CAPTION_CHARS: usize = 2200;

/// Build the default caption for a product post.
///
/// Name, then the description when present, then the price, separated by
/// blank lines.
pub fn caption_for(product: &Product) -> String {
    let mut parts: Vec<String> = vec![product.name.clone()];
    if let Some(description) = product.description.as_deref() {
        if !description.is_empty() {
            parts.push(description.to_string());
        }
    }
    parts.push(format!("Price: {:.2}", product.price));

    truncate_caption(&parts.join("\n\n"))
}

/// Cut a caption to `MAX_CAPTION_CHARS` characters
pub fn truncate_caption(caption: &str) -> String {
    caption.chars().take(MAX_CAPTION_CHARS).collect()
}
