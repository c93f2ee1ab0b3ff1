//! Completed-session records and the tag catalog.

mod record;
mod tag;

pub use record::Session;
pub use tag::{
    find_tag, resolve_tag, SessionTag, TagDisplay, DEFAULT_TAG_ID,
    FALLBACK_COLOR_HEX, PREDEFINED_TAGS,
};
