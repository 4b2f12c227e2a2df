use std::path::PathBuf;
use std::process;

use clap::Parser;

use card_script::script::compile;

/// Compile a card file and report its diagnostics.
#[derive(Parser)]
#[command(name = "card-script", version, about = "Card scripting language compiler")]
struct Cli {
    /// Path to the card file
    file: PathBuf,

    /// Print the compiled cards as JSON (diagnostics go to stderr)
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let compilation = match compile(&cli.file) {
        Ok(compilation) => compilation,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&compilation.cards) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: failed to serialize cards: {}", e);
                process::exit(2);
            }
        }
        if !compilation.is_clean() {
            eprintln!("{}", compilation.report());
        }
    } else {
        println!("{}", compilation.report());
    }

    if !compilation.is_clean() {
        process::exit(1);
    }
}
