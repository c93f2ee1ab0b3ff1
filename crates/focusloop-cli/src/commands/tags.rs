use clap::Subcommand;
use focusloop_core::session::resolve_tag;
use focusloop_core::PREDEFINED_TAGS;

#[derive(Subcommand)]
pub enum TagsAction {
    /// List the predefined tags
    List,
    /// Show how a tag id is displayed
    Show {
        /// Tag id; unknown ids get the fallback color
        id: String,
    },
}

pub fn run(action: TagsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TagsAction::List => {
            let tags: Vec<_> = PREDEFINED_TAGS.iter().map(|t| resolve_tag(t.id)).collect();
            println!("{}", serde_json::to_string_pretty(&tags)?);
        }
        TagsAction::Show { id } => {
            println!("{}", serde_json::to_string_pretty(&resolve_tag(&id))?);
        }
    }
    Ok(())
}
