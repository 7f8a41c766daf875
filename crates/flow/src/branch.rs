//! Branch label correction.
//!
//! The label a caller displays is not always the label on the site's
//! branch button (spacing and casing drift between the two). This table
//! maps caller labels to the button text to search for; anything not in
//! the table passes through unchanged and will simply fail downstream
//! with a button-not-found timeout if it is wrong.

/// Map a caller-facing branch label to the site-facing button label.
pub fn site_label(branch: &str) -> &str {
    match branch {
        "Central World" => "Centralworld",
        "ICON SIAM" => "Icon Siam",
        "Emphere" => "Emsphere",
        "Terminal 21" => "Terminal 21",
        "Centralworld" => "Centralworld",
        "Central Ladprao" => "Central Ladprao",
        "Fashion Island" => "Fashion Island",
        "MEGABANGNA" => "MEGABANGNA",
        "Siam Center" => "Siam Center",
        "Siam Square" => "Siam Square",
        "Central Pattaya" => "Central Pattaya",
        "Seacon Square" => "Seacon Square",
        "Central Westgate" => "Central Westgate",
        "Central Chiangmai" => "Central Chiangmai",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrected_labels() {
        assert_eq!(site_label("Central World"), "Centralworld");
        assert_eq!(site_label("ICON SIAM"), "Icon Siam");
        assert_eq!(site_label("Emphere"), "Emsphere");
    }

    #[test]
    fn identity_entries_pass_through() {
        assert_eq!(site_label("Terminal 21"), "Terminal 21");
        assert_eq!(site_label("MEGABANGNA"), "MEGABANGNA");
    }

    #[test]
    fn unknown_labels_are_unchanged() {
        assert_eq!(site_label("Unknown Place"), "Unknown Place");
        // No case folding or trimming happens.
        assert_eq!(site_label("central world"), "central world");
        assert_eq!(site_label(" Central World"), " Central World");
    }
}
