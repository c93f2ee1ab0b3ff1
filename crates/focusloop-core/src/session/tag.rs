use serde::Serialize;

/// A category a pomodoro can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionTag {
    pub id: &'static str,
    pub name: &'static str,
    pub color_hex: &'static str,
}

pub const PREDEFINED_TAGS: [SessionTag; 6] = [
    SessionTag {
        id: "study",
        name: "Study",
        color_hex: "#3B82F6",
    },
    SessionTag {
        id: "work",
        name: "Work",
        color_hex: "#10B981",
    },
    SessionTag {
        id: "research",
        name: "Research",
        color_hex: "#8B5CF6",
    },
    SessionTag {
        id: "personal",
        name: "Personal",
        color_hex: "#F59E0B",
    },
    SessionTag {
        id: "meeting",
        name: "Meeting",
        color_hex: "#EF4444",
    },
    SessionTag {
        id: "other",
        name: "Other",
        color_hex: "#6B7280",
    },
];

pub const DEFAULT_TAG_ID: &str = "study";

/// Neutral gray used for ids missing from the catalog.
pub const FALLBACK_COLOR_HEX: &str = "#6B7280";

pub fn find_tag(id: &str) -> Option<&'static SessionTag> {
    PREDEFINED_TAGS.iter().find(|tag| tag.id == id)
}

/// Display data for a stored tag id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDisplay {
    pub id: String,
    pub name: String,
    pub color_hex: String,
    /// False when the id was not found and fallback data is shown.
    pub known: bool,
}

/// Look up a tag id. Unknown ids display as themselves in the neutral color.
pub fn resolve_tag(id: &str) -> TagDisplay {
    match find_tag(id) {
        Some(tag) => TagDisplay {
            id: tag.id.to_string(),
            name: tag.name.to_string(),
            color_hex: tag.color_hex.to_string(),
            known: true,
        },
        None => TagDisplay {
            id: id.to_string(),
            name: id.to_string(),
            color_hex: FALLBACK_COLOR_HEX.to_string(),
            known: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in PREDEFINED_TAGS.iter().enumerate() {
            for b in &PREDEFINED_TAGS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
        assert!(find_tag(DEFAULT_TAG_ID).is_some());
    }

    #[test]
    fn known_tag_resolves_from_catalog() {
        let tag = resolve_tag("work");
        assert!(tag.known);
        assert_eq!(tag.name, "Work");
        assert_eq!(tag.color_hex, "#10B981");
    }

    #[test]
    fn unknown_tag_falls_back() {
        let tag = resolve_tag("gardening");
        assert!(!tag.known);
        assert_eq!(tag.name, "gardening");
        assert_eq!(tag.color_hex, FALLBACK_COLOR_HEX);
    }
}
