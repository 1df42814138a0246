use eyre::{bail, Result};
use knowledge_core::{
    validate_create, validate_update, ApiError, CreateEntry, EntryApi, EntryErrors, EntryId, EntryStore,
    KnowledgeEntry, UpdateEntry,
};

use crate::cli::{AddArgs, Command, EditArgs};

/// Outcome of a successful command: an optional notice plus the list as the
/// store last saw it.
#[derive(Debug)]
pub struct Report {
    pub notice: Option<String>,
    pub entries: Vec<KnowledgeEntry>,
    /// Set when the follow-up refresh after a mutation failed.
    pub refresh_error: Option<String>,
}

pub async fn execute<A: EntryApi>(command: Command, api: A) -> Result<Report> {
    let store = EntryStore::activate(api).await;

    let notice = match command {
        Command::List => {
            if let Some(error) = store.snapshot().error {
                bail!(error);
            }
            None
        }
        Command::Add(args) => {
            let input = create_input(args);
            validate_create(&input).map_err(invalid)?;
            store.add(&input).await.map_err(failed)?;
            Some("Knowledge entry created successfully!".to_string())
        }
        Command::Edit(args) => {
            let (id, input) = update_input(args);
            if input.is_empty() {
                bail!("Nothing to update: pass --title, --description or --image");
            }
            validate_update(&input).map_err(invalid)?;
            store.edit(&id, &input).await.map_err(failed)?;
            Some("Knowledge entry updated successfully!".to_string())
        }
        Command::Delete { id } => {
            store.remove(&EntryId::from(id)).await.map_err(failed)?;
            Some("Knowledge entry deleted successfully!".to_string())
        }
    };

    let state = store.snapshot();
    Ok(Report {
        notice,
        entries: state.entries,
        refresh_error: state.error,
    })
}

fn create_input(args: AddArgs) -> CreateEntry {
    CreateEntry {
        title: args.title.trim().to_string(),
        description: args.description.trim().to_string(),
        image: args.image,
    }
}

fn update_input(args: EditArgs) -> (EntryId, UpdateEntry) {
    let input = UpdateEntry {
        title: args.title.map(|t| t.trim().to_string()),
        description: args.description.map(|d| d.trim().to_string()),
        image: args.image,
    };
    (EntryId::from(args.id), input)
}

fn invalid(errors: EntryErrors) -> eyre::Report {
    eyre::eyre!(errors.messages().collect::<Vec<_>>().join("; "))
}

fn failed(error: ApiError) -> eyre::Report {
    eyre::eyre!(error.to_string())
}

/// Plain-text listing, one block per entry.
pub fn render_entries(entries: &[KnowledgeEntry]) -> String {
    if entries.is_empty() {
        return "No knowledge entries yet.\n".to_string();
    }
    entries.iter().map(render_entry).collect()
}

fn render_entry(entry: &KnowledgeEntry) -> String {
    let image = if entry.image.is_some() { "    (has image)\n" } else { "" };
    format!(
        "[{}] {}\n    {}\n{image}    updated {}\n",
        entry.id, entry.title, entry.description, entry.updated_at
    )
}
