use crate::types::AssetSummary;

// Pure helpers behind the rendered views. Nothing here touches the network.

pub const ELLIPSIS: &str = "...";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const READ_MORE: &str = "Read More...";
pub const READ_LESS: &str = "Read Less...";

/// Case-insensitive substring match against name or symbol.
/// An empty query matches everything.
pub fn matches_query(asset: &AssetSummary, query: &str) -> bool {
    let needle = query.to_lowercase();
    needle.is_empty()
        || asset.name.to_lowercase().contains(&needle)
        || asset.symbol.to_lowercase().contains(&needle)
}

pub fn filter_assets<'a>(assets: &'a [AssetSummary], query: &str) -> Vec<&'a AssetSummary> {
    assets
        .iter()
        .filter(|asset| matches_query(asset, query))
        .collect()
}

/// Cuts `text` to `max_len` characters and appends [`ELLIPSIS`].
/// Text that already fits is returned unchanged.
///
/// Descriptions arrive as HTML with literal `<` escaped, so a cut that lands
/// inside a tag backs off to just before that tag's `<`.
pub fn truncate_description(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_len).collect();
    if let Some(open) = truncated.rfind('<') {
        if !truncated[open..].contains('>') {
            truncated.truncate(open);
        }
    }
    truncated.push_str(ELLIPSIS);
    truncated
}

pub fn description_text(raw: &str, max_len: usize, expanded: bool) -> String {
    let text = if raw.trim().is_empty() { NO_DESCRIPTION } else { raw };
    if expanded {
        text.to_string()
    } else {
        truncate_description(text, max_len)
    }
}

pub fn toggle_label(expanded: bool) -> &'static str {
    if expanded {
        READ_LESS
    } else {
        READ_MORE
    }
}
