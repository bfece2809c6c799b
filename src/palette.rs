use rand::seq::IndexedRandom;

pub const PROJECT_COLORS: [&str; 16] = [
    "#667eea", "#f093fb", "#4facfe", "#43e97b", "#fa709a", "#ffecd2", "#a8edea", "#d299c2",
    "#ff9a9e", "#fecfef", "#f6d365", "#fda085", "#8b5cf6", "#06b6d4", "#84cc16", "#f97316",
];

pub const TAG_COLORS: [&str; 12] = [
    "#667eea", "#f093fb", "#4facfe", "#43e97b", "#fa709a", "#ffecd2", "#a8edea", "#d299c2",
    "#ff9a9e", "#fecfef", "#f6d365", "#fda085",
];

/// Colour shown for a tag name no stored tag matches.
pub const FALLBACK_TAG_COLOR: &str = "#667eea";

/// Picks uniformly among palette colours not in `used`; once every colour is
/// taken, picks uniformly from the whole palette.
pub fn pick_color<'a>(palette: &[&str], used: impl IntoIterator<Item = &'a str>) -> String {
    let used: Vec<&str> = used.into_iter().collect();
    let free: Vec<&str> = palette
        .iter()
        .copied()
        .filter(|color| !used.iter().any(|u| u == color))
        .collect();

    let mut rng = rand::rng();
    let choice = if free.is_empty() {
        palette.choose(&mut rng).copied()
    } else {
        free.choose(&mut rng).copied()
    };
    choice.unwrap_or(FALLBACK_TAG_COLOR).to_string()
}
