//! bookledger CLI
//!
//! One request per invocation: open the library, run the command, save.

use std::path::PathBuf;

use bookledger::{Book, Config, Library, Result, SortKey};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// bookledger
#[derive(Parser, Debug)]
#[command(name = "bookledger")]
#[command(about = "Library catalog with a loan ledger")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./library_data")]
    data_dir: PathBuf,

    /// Replay the ledger into the catalog before running the command
    ///
    /// Only for a snapshot saved before the ledger's events (e.g. after a
    /// crash): events already counted in the snapshot are applied again, and
    /// a command that saves will persist the doubled counters.
    #[arg(long)]
    replay: bool,

    /// fsync every ledger append
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a new book
    Add(BookFields),

    /// Overwrite a book's title, author, category and stock
    Update(BookFields),

    /// Delete a book
    Delete {
        isbn: String,
    },

    /// Loan copies of a book
    Loan {
        isbn: String,
        quantity: u32,
    },

    /// Return copies of a book
    Return {
        isbn: String,
        quantity: u32,
    },

    /// Show one book by ISBN
    Show {
        isbn: String,
    },

    /// Search by exact title, exact author, or keyword
    Search {
        #[arg(long, group = "query")]
        title: Option<String>,

        #[arg(long, group = "query")]
        author: Option<String>,

        #[arg(long, group = "query")]
        keyword: Option<String>,
    },

    /// List books, optionally in sorted order (stock | loans)
    List {
        #[arg(long)]
        sort: Option<SortKey>,
    },

    /// Permanently re-order the catalog (stock | loans)
    Sort {
        key: SortKey,
    },

    /// Show which loans are returned or outstanding
    History,

    /// Show the catalog with the ledger replayed into it
    ///
    /// Nothing is written unless `--save` is given. Saving folds every ledger
    /// event into the snapshot, so a later replay would count them twice.
    Replay {
        #[arg(long)]
        save: bool,
    },

    /// Rewrite the legacy ledger in the current format
    MigrateLedger,

    /// Copy the operation log to a file
    ExportLog {
        dest: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct BookFields {
    isbn: String,
    title: String,
    author: String,
    stock: u32,

    #[arg(short, long)]
    category: Option<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookledger=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("bookledger v{}", bookledger::VERSION);

    let mut builder = Config::builder()
        .data_dir(&args.data_dir)
        .replay_on_open(args.replay);
    if args.sync {
        builder = builder.ledger_sync_strategy(bookledger::config::LedgerSyncStrategy::EveryAppend);
    }

    let library = match Library::open(builder.build()) {
        Ok(library) => library,
        Err(e) => {
            tracing::error!("Failed to open library: {}", e);
            std::process::exit(1);
        }
    };

    match run(&library, args.command) {
        Ok(changed) => {
            if changed {
                if let Err(e) = library.close() {
                    tracing::error!("Failed to save catalog: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Execute one command; returns whether the catalog changed
fn run(library: &Library, command: Commands) -> Result<bool> {
    match command {
        Commands::Add(fields) => {
            library.add_book(
                &fields.isbn,
                &fields.title,
                &fields.author,
                fields.category.as_deref(),
                fields.stock,
            )?;
            println!("added {}", fields.isbn);
            Ok(true)
        }
        Commands::Update(fields) => {
            let book = library.update_book(
                &fields.isbn,
                &fields.title,
                &fields.author,
                fields.category.as_deref(),
                fields.stock,
            )?;
            print_book(&book);
            Ok(true)
        }
        Commands::Delete { isbn } => {
            let book = library.delete_book(&isbn)?;
            println!("deleted {} ({})", book.isbn, book.title);
            Ok(true)
        }
        Commands::Loan { isbn, quantity } => {
            print_book(&library.loan(&isbn, quantity)?);
            Ok(true)
        }
        Commands::Return { isbn, quantity } => {
            print_book(&library.return_book(&isbn, quantity)?);
            Ok(true)
        }
        Commands::Show { isbn } => {
            match library.find_exact(&isbn) {
                Some(book) => print_book(&book),
                None => println!("no book with ISBN {}", isbn),
            }
            Ok(false)
        }
        Commands::Search {
            title,
            author,
            keyword,
        } => {
            let books = match (title, author, keyword) {
                (Some(title), _, _) => library.find_by_title(&title),
                (_, Some(author), _) => library.find_by_author(&author),
                (_, _, Some(keyword)) => library.find_by_keyword(&keyword),
                (None, None, None) => library.records(),
            };
            print_books(&books);
            Ok(false)
        }
        Commands::List { sort } => {
            let books = match sort {
                Some(key) => library.sorted(key),
                None => library.records(),
            };
            print_books(&books);
            Ok(false)
        }
        Commands::Sort { key } => {
            library.sort(key);
            print_books(&library.records());
            Ok(true)
        }
        Commands::History => {
            let history = library.outstanding_history()?;
            if history.is_empty() {
                println!("no loan history");
            }
            for entry in history {
                println!("{}", entry);
            }
            Ok(false)
        }
        Commands::Replay { save } => {
            let result = library.replay()?;
            println!(
                "replayed {} events ({} orphaned, {} corrupt, {} clamped)",
                result.events_applied,
                result.events_orphaned,
                result.records_corrupt,
                result.stock_clamped
            );
            print_books(&library.records());
            Ok(save)
        }
        Commands::MigrateLedger => {
            let written = library.migrate_ledger()?;
            println!("migrated {} legacy records", written);
            Ok(false)
        }
        Commands::ExportLog { dest } => {
            let bytes = library.export_audit_log(&dest)?;
            println!("exported {} bytes to {}", bytes, dest.display());
            Ok(false)
        }
    }
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("no books");
    }
    for book in books {
        print_book(book);
    }
}

fn print_book(book: &Book) {
    println!(
        "{} | {} | {} | {} | stock {} | loaned {}",
        book.isbn, book.title, book.author, book.category, book.stock, book.loaned
    );
}
