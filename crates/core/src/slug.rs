use rand::{distributions::Alphanumeric, Rng};

const SUFFIX_LEN: usize = 4;
/// Leaves room for `-` plus the suffix inside a 255 character column.
const MAX_BASE_LEN: usize = 255 - 1 - SUFFIX_LEN;

/// Derives a URL-safe slug from a display name.
///
/// German umlauts are transliterated, everything else outside `[a-z0-9]`
/// collapses into single dashes. Names without any usable character fall
/// back to `user`. Long names are cut to [`MAX_BASE_LEN`].
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.trim().to_lowercase().chars() {
        let mapped: Option<&str> = match ch {
            'ä' => Some("ae"),
            'ö' => Some("oe"),
            'ü' => Some("ue"),
            'ß' => Some("ss"),
            _ => None,
        };

        if let Some(text) = mapped {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push_str(text);
        } else if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    // Only ASCII is ever pushed, so byte truncation is safe.
    slug.truncate(MAX_BASE_LEN);
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "user".to_string()
    } else {
        slug.to_string()
    }
}

/// Appends a random lowercase suffix, used when a slug is already taken.
pub fn with_random_suffix(base: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}", base, suffix)
}

pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
