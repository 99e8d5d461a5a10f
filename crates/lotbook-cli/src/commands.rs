//! Command-mode execution: one subcommand per form action.

use std::io::{self, Write};

use clap::Subcommand;
use lotbook_core::{parse_price, Error, Lot, LotDraft, Workbook};

use crate::formatter::{self, OutputFormat};

/// Form actions exposed as subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new lot
    Add {
        /// Product name
        #[arg(long)]
        name: String,
        /// Price (accepts "10.50" or "10,50")
        #[arg(long)]
        price: String,
        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
        /// Skip the duplicate-name confirmation
        #[arg(long)]
        yes: bool,
    },
    /// List lots matching a name/code term (all lots when omitted)
    Search {
        /// Case-insensitive substring of a name or code
        term: Option<String>,
    },
    /// List all lots
    List,
    /// Edit the fields of an existing lot
    Edit {
        /// Code of the lot to edit (e.g. L005)
        code: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New price
        #[arg(long)]
        price: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a lot
    Delete {
        /// Code of the lot to delete
        code: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Duplicate a lot under a freshly generated code
    Duplicate {
        /// Code of the lot to duplicate
        code: String,
        /// Override the copied name
        #[arg(long)]
        name: Option<String>,
        /// Override the copied price
        #[arg(long)]
        price: Option<String>,
        /// Override the copied description
        #[arg(long)]
        description: Option<String>,
        /// Skip the duplicate-name confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Show the derived summary
    Summary,
    /// Show the change log
    Log,
    /// Open the data file with the system default application
    Open,
}

/// Execute a single command against the workbook.
pub fn execute(
    book: &mut Workbook,
    command: Command,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Add {
            name,
            price,
            description,
            yes,
        } => {
            let draft = LotDraft::new(name, parse_price(&price)?, description);
            let lot = with_name_confirmation(yes, |allow| book.add(draft.clone(), allow))?;
            println!("Lot {} added", lot.code);
            Ok(())
        }
        Command::Search { term } => {
            let hits = book.search(term.as_deref().unwrap_or(""));
            println!("{}", formatter::render_lots(&hits, format));
            Ok(())
        }
        Command::List => {
            let all = book.search("");
            println!("{}", formatter::render_lots(&all, format));
            Ok(())
        }
        Command::Edit {
            code,
            name,
            price,
            description,
        } => {
            let current = book
                .get(&code)
                .cloned()
                .ok_or_else(|| Error::CodeNotFound(code.clone()))?;
            let draft = LotDraft::new(
                name.unwrap_or(current.name),
                match price {
                    Some(p) => parse_price(&p)?,
                    None => current.price,
                },
                description.unwrap_or(current.description),
            );
            let changed = book.edit(&code, draft)?;
            println!("Lot {} updated ({} field(s) changed)", code, changed);
            Ok(())
        }
        Command::Delete { code, yes } => {
            if book.get(&code).is_none() {
                return Err(Error::CodeNotFound(code).into());
            }
            if !yes && !confirm(&format!("Delete lot {}?", code))? {
                println!("Aborted");
                return Ok(());
            }
            let removed = book.delete(&code)?;
            println!("Lot {} ({}) deleted", removed.code, removed.name);
            Ok(())
        }
        Command::Duplicate {
            code,
            name,
            price,
            description,
            yes,
        } => {
            let source = book
                .get(&code)
                .cloned()
                .ok_or_else(|| Error::CodeNotFound(code.clone()))?;
            let draft = LotDraft::new(
                name.unwrap_or(source.name),
                match price {
                    Some(p) => parse_price(&p)?,
                    None => source.price,
                },
                description.unwrap_or(source.description),
            );
            let lot =
                with_name_confirmation(yes, |allow| book.duplicate(&code, draft.clone(), allow))?;
            println!("Lot {} duplicated from {}", lot.code, code);
            Ok(())
        }
        Command::Summary => {
            println!("{}", formatter::render_summary(&book.summary(), format));
            Ok(())
        }
        Command::Log => {
            println!("{}", formatter::render_history(book.history(), format));
            Ok(())
        }
        Command::Open => {
            if book.data_path().exists() {
                open::that(book.data_path())?;
            } else {
                println!("Data file does not exist yet");
            }
            Ok(())
        }
    }
}

/// Run a mutation, downgrading the duplicate-name error to a y/n prompt and
/// retrying once when the user confirms.
fn with_name_confirmation<F>(
    pre_confirmed: bool,
    mut op: F,
) -> Result<Lot, Box<dyn std::error::Error>>
where
    F: FnMut(bool) -> Result<Lot, Error>,
{
    match op(pre_confirmed) {
        Err(Error::DuplicateName(name)) => {
            if confirm(&format!(
                "A lot named {:?} already exists. Add anyway?",
                name
            ))? {
                Ok(op(true)?)
            } else {
                Err("aborted".into())
            }
        }
        other => Ok(other?),
    }
}

/// Ask a yes/no question on stdin; default is "no".
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
