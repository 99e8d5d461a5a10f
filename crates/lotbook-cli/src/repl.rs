//! Interactive form session.
//!
//! Presents the same fields the form application presented: name, price,
//! description, and the read-only generated code, with confirmation prompts
//! for deletes and duplicate names. The session ends with a final
//! save-and-backup, like closing the form window.

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;

use lotbook_core::{format_price, parse_price, Error, Lot, LotDraft, Workbook};

use crate::formatter::{self, OutputFormat};

type Repl = Editor<(), DefaultHistory>;

/// Get the history file path.
fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lotbook_history")
}

/// Run the interactive session.
pub fn run(book: &mut Workbook, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Repl = Editor::with_config(rl_config)?;

    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    println!("Lotbook - data file: {}", book.data_path().display());
    println!("Type help for commands, exit to quit\n");

    loop {
        match rl.readline("lot> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (cmd, arg) = split_command(line);
                let done = dispatch(&mut rl, book, format, cmd, arg);
                if done {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    // Final save-and-backup on the way out.
    book.close()?;
    println!("Saved {}", book.data_path().display());
    Ok(())
}

/// Handle one command line; returns true when the session should end.
fn dispatch(rl: &mut Repl, book: &mut Workbook, format: OutputFormat, cmd: &str, arg: &str) -> bool {
    let result = match cmd {
        "exit" | "quit" => return true,
        "help" | "?" => {
            print_help();
            Ok(())
        }
        "list" => {
            println!("{}", formatter::render_lots(&book.search(""), format));
            Ok(())
        }
        "search" => {
            println!("{}", formatter::render_lots(&book.search(arg), format));
            Ok(())
        }
        "summary" => {
            println!("{}", formatter::render_summary(&book.summary(), format));
            Ok(())
        }
        "log" => {
            println!("{}", formatter::render_history(book.history(), format));
            Ok(())
        }
        "open" => open_data_file(book),
        "add" => add(rl, book),
        "edit" => edit(rl, book, arg),
        "delete" | "del" => delete(rl, book, arg),
        "dup" | "duplicate" => duplicate(rl, book, arg),
        _ => {
            println!("Unknown command {:?}. Type help for commands.", cmd);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
    false
}

fn print_help() {
    println!(
        "Commands:\n\
         \x20 add              add a new lot (prompts for fields)\n\
         \x20 search [term]    find lots by name or code\n\
         \x20 list             show all lots\n\
         \x20 edit <code>      edit a lot's fields\n\
         \x20 delete <code>    delete a lot (asks for confirmation)\n\
         \x20 dup <code>       duplicate a lot under a fresh code\n\
         \x20 summary          show the derived totals\n\
         \x20 log              show the change log\n\
         \x20 open             open the data file externally\n\
         \x20 exit             save, back up, and quit"
    );
}

fn open_data_file(book: &Workbook) -> Result<(), Box<dyn std::error::Error>> {
    if book.data_path().exists() {
        open::that(book.data_path())?;
    } else {
        println!("Data file does not exist yet");
    }
    Ok(())
}

fn add(rl: &mut Repl, book: &mut Workbook) -> Result<(), Box<dyn std::error::Error>> {
    println!("Code (auto): {}", book.next_code());
    let Some(draft) = prompt_draft(rl, None)? else {
        println!("Aborted");
        return Ok(());
    };
    match confirm_names(rl, |allow| book.add(draft.clone(), allow))? {
        Some(lot) => println!("Lot {} added", lot.code),
        None => println!("Aborted"),
    }
    Ok(())
}

fn edit(rl: &mut Repl, book: &mut Workbook, arg: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(code) = resolve_code(rl, arg)? else {
        println!("Aborted");
        return Ok(());
    };
    let current = book
        .get(&code)
        .cloned()
        .ok_or_else(|| Error::CodeNotFound(code.clone()))?;

    println!("Editing lot {} ({})", current.code, current.name);
    let Some(draft) = prompt_draft(rl, Some(&current))? else {
        println!("Aborted");
        return Ok(());
    };
    let changed = book.edit(&code, draft)?;
    println!("Lot {} updated ({} field(s) changed)", code, changed);
    Ok(())
}

fn delete(rl: &mut Repl, book: &mut Workbook, arg: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(code) = resolve_code(rl, arg)? else {
        println!("Aborted");
        return Ok(());
    };
    if book.get(&code).is_none() {
        return Err(Error::CodeNotFound(code).into());
    }
    if !ask(rl, &format!("Delete lot {}? [y/N] ", code)) {
        println!("Aborted");
        return Ok(());
    }
    let removed = book.delete(&code)?;
    println!("Lot {} ({}) deleted", removed.code, removed.name);
    Ok(())
}

fn duplicate(
    rl: &mut Repl,
    book: &mut Workbook,
    arg: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(code) = resolve_code(rl, arg)? else {
        println!("Aborted");
        return Ok(());
    };
    let source = book
        .get(&code)
        .cloned()
        .ok_or_else(|| Error::CodeNotFound(code.clone()))?;

    println!("Duplicating lot {}; code (auto): {}", code, book.next_code());
    let Some(draft) = prompt_draft(rl, Some(&source))? else {
        println!("Aborted");
        return Ok(());
    };
    match confirm_names(rl, |allow| book.duplicate(&code, draft.clone(), allow))? {
        Some(lot) => println!("Lot {} duplicated from {}", lot.code, code),
        None => println!("Aborted"),
    }
    Ok(())
}

/// Prompt for the form fields, pre-filled from `initial` when editing or
/// duplicating. Returns `None` when the user cancels a prompt.
fn prompt_draft(
    rl: &mut Repl,
    initial: Option<&Lot>,
) -> Result<Option<LotDraft>, Box<dyn std::error::Error>> {
    let Some(name) = read_field(rl, "Name: ", initial.map_or("", |l| l.name.as_str()))? else {
        return Ok(None);
    };
    let price_initial = initial.map(|l| format_price(l.price)).unwrap_or_default();
    let Some(price_text) = read_field(rl, "Price: ", &price_initial)? else {
        return Ok(None);
    };
    let price = parse_price(&price_text)?;
    let Some(description) =
        read_field(rl, "Description: ", initial.map_or("", |l| l.description.as_str()))?
    else {
        return Ok(None);
    };
    Ok(Some(LotDraft::new(name, price, description)))
}

/// Read one field with an editable pre-filled value; `None` on Ctrl-C/Ctrl-D.
fn read_field(
    rl: &mut Repl,
    prompt: &str,
    initial: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match rl.readline_with_initial(prompt, (initial, "")) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Code from the command argument, or prompted when missing.
fn resolve_code(rl: &mut Repl, arg: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if !arg.is_empty() {
        return Ok(Some(arg.to_string()));
    }
    match read_field(rl, "Code (e.g. L005): ", "")? {
        Some(code) if !code.trim().is_empty() => Ok(Some(code.trim().to_string())),
        _ => Ok(None),
    }
}

/// Run a mutation, downgrading the duplicate-name error to a prompt and
/// retrying once when confirmed. `None` means the user declined.
fn confirm_names<F>(rl: &mut Repl, mut op: F) -> Result<Option<Lot>, Box<dyn std::error::Error>>
where
    F: FnMut(bool) -> Result<Lot, Error>,
{
    match op(false) {
        Err(Error::DuplicateName(name)) => {
            if ask(
                rl,
                &format!("A lot named {:?} already exists. Add anyway? [y/N] ", name),
            ) {
                Ok(Some(op(true)?))
            } else {
                Ok(None)
            }
        }
        other => Ok(Some(other?)),
    }
}

fn ask(rl: &mut Repl, prompt: &str) -> bool {
    matches!(
        rl.readline(prompt).as_deref().map(str::trim),
        Ok("y") | Ok("Y") | Ok("yes")
    )
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    }
}
