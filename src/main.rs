//! Interactive patient record console
//!
//! Login gate followed by a numbered menu over the patient manager:
//! register, search, remove, inspect the index structure, list, save.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use prettytable::{row, Table};
use rustyline::DefaultEditor;

use medrec::btree::DEFAULT_MAX_KEYS;
use medrec::{AuthManager, BTree, Patient, PatientDetails, PatientManager};

/// Patient record system backed by a B-Tree index
#[derive(Parser, Debug)]
#[command(name = "medrec")]
#[command(about = "Patient record system backed by a B-Tree index")]
#[command(version)]
struct Args {
    /// Snapshot file holding the patient collection
    #[arg(short, long, default_value = "patients.json")]
    data_file: PathBuf,

    /// Maximum records per tree node (>= 3, odd preferred)
    #[arg(short, long, default_value_t = DEFAULT_MAX_KEYS)]
    max_keys: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Cannot open terminal: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let auth = AuthManager::default();
    if !login(&auth, &mut editor) {
        println!("Too many failed attempts. Goodbye.");
        return ExitCode::FAILURE;
    }

    let mut manager = match PatientManager::open(&args.data_file, args.max_keys) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("Cannot open {}: {}", args.data_file.display(), err);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "\nLoaded {} patient(s) from {}",
        manager.len(),
        args.data_file.display()
    );

    loop {
        print_menu();
        let Some(choice) = read_line(&mut editor, "Select (0-6): ") else {
            break;
        };

        match choice.trim() {
            "1" => add_patient(&mut manager, &mut editor),
            "2" => search_patient(&manager, &mut editor),
            "3" => remove_patient(&mut manager, &mut editor),
            "4" => show_tree(manager.tree()),
            "5" => list_patients(&manager),
            "6" => match manager.persist() {
                Ok(()) => println!("Saved {} patient(s).", manager.len()),
                Err(err) => eprintln!("Save failed: {}", err),
            },
            "0" => break,
            other => println!("Unrecognized choice: {}", other),
        }
    }

    if manager.has_unsaved_changes() {
        println!("Warning: unsaved changes were not written to disk.");
    }
    println!("Goodbye.");
    ExitCode::SUCCESS
}

/// Bounded-retry login; the attempt policy lives in the auth manager
fn login(auth: &AuthManager, editor: &mut DefaultEditor) -> bool {
    println!("=== Patient Record System Login ===");
    auth.login(|remaining| {
        if remaining < auth.max_attempts() {
            println!("Wrong username or password. {} attempt(s) left.", remaining);
        }
        let username = read_line(editor, "Username: ")?;
        let password = read_line(editor, "Password: ")?;
        Some((username, password))
    })
}

fn print_menu() {
    println!("\n==== MENU ====");
    println!("1. Add patient");
    println!("2. Find patient by ID");
    println!("3. Remove patient by ID");
    println!("4. Show tree structure");
    println!("5. List all patients");
    println!("6. Save to file");
    println!("0. Quit");
}

fn add_patient(manager: &mut PatientManager, editor: &mut DefaultEditor) {
    println!("\n-- Add patient (ID {} will be assigned) --", manager.next_id());

    let Some(details) = read_details(editor) else {
        println!("Cancelled.");
        return;
    };

    match manager.add_patient(details) {
        Ok(patient) => println!("Added: {}", patient),
        Err(err) => eprintln!("Add failed: {}", err),
    }
}

fn read_details(editor: &mut DefaultEditor) -> Option<PatientDetails> {
    let name = read_line(editor, "Name: ")?;
    let age = loop {
        let raw = read_line(editor, "Age: ")?;
        match raw.trim().parse() {
            Ok(age) => break age,
            Err(_) => println!("Age must be a number."),
        }
    };
    let gender = loop {
        let raw = read_line(editor, "Gender (M/F/O): ")?;
        match raw.parse() {
            Ok(gender) => break gender,
            Err(msg) => println!("{}", msg),
        }
    };
    let phone = read_line(editor, "Phone: ")?;
    let visit_date = read_line(editor, "Visit date (YYYY-MM-DD): ")?;

    Some(PatientDetails {
        name,
        age,
        gender,
        phone,
        visit_date,
    })
}

fn search_patient(manager: &PatientManager, editor: &mut DefaultEditor) {
    let Some(id) = read_id(editor, "Patient ID to find: ") else {
        return;
    };
    match manager.find_patient(id) {
        Some(patient) => println!("Found: {}", patient),
        None => println!("No patient with ID {}.", id),
    }
}

fn remove_patient(manager: &mut PatientManager, editor: &mut DefaultEditor) {
    let Some(id) = read_id(editor, "Patient ID to remove: ") else {
        return;
    };
    let Some(patient) = manager.find_patient(id) else {
        println!("No patient with ID {}.", id);
        return;
    };
    println!("{}", patient);

    let Some(answer) = read_line(editor, "Remove this patient? (y/n): ") else {
        return;
    };
    if !answer.trim().eq_ignore_ascii_case("y") {
        println!("Kept.");
        return;
    }

    match manager.remove_patient(id) {
        Ok(removed) => println!("Removed patient {}.", removed.id),
        Err(err) => eprintln!("Remove failed: {}", err),
    }
}

fn show_tree(tree: &BTree<Patient>) {
    println!("\nB-Tree structure (max {} keys per node)", tree.max_keys());

    if tree.is_empty() {
        println!("(empty tree)");
        return;
    }

    for (depth, row) in tree.levels().iter().enumerate() {
        let rendered: Vec<String> = row
            .iter()
            .filter_map(|&id| tree.node(id))
            .map(|node| {
                let ids: Vec<String> = node.keys.iter().map(|p| p.id.to_string()).collect();
                format!("[{}]", ids.join(", "))
            })
            .collect();

        let label = if depth == 0 { " (root)" } else { "" };
        println!("  Level {}{}: {}", depth, label, rendered.join("  "));
    }

    println!(
        "  height = {}, nodes = {}, patients = {}",
        tree.height(),
        tree.node_count(),
        tree.len()
    );
}

fn list_patients(manager: &PatientManager) {
    let patients = manager.list_all();
    if patients.is_empty() {
        println!("No patients registered.");
        return;
    }

    let mut table = Table::new();
    table.set_titles(row!["ID", "Name", "Age", "Gender", "Phone", "Visit date"]);
    for p in &patients {
        table.add_row(row![p.id, p.name, p.age, p.gender, p.phone, p.visit_date]);
    }
    table.printstd();
    println!("Total: {} patient(s)", patients.len());
}

fn read_line(editor: &mut DefaultEditor, prompt: &str) -> Option<String> {
    editor.readline(prompt).ok().map(|line| line.trim().to_string())
}

fn read_id(editor: &mut DefaultEditor, prompt: &str) -> Option<u64> {
    let raw = read_line(editor, prompt)?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("IDs are numeric.");
            None
        }
    }
}
