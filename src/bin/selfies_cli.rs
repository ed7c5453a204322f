//! Command-line front end for the SMILES <-> SELFIES codec.
//!
//! Not part of the core (spec.md explicitly scopes command-line examples
//! out of scope) but kept as ambient scaffolding for a shippable crate,
//! gated behind the `cli` feature so `cargo build --lib` stays
//! dependency-light.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "selfies-cli", about = "Translate between SMILES and SELFIES")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a SMILES string into SELFIES.
    Encode {
        /// The SMILES string to encode.
        smiles: String,
    },
    /// Decode a SELFIES string into SMILES.
    Decode {
        /// The SELFIES string to decode.
        selfies: String,
        /// Use nitrogen's pentavalent (5) rather than amine (3) valence.
        #[arg(long)]
        unrestricted_nitrogen: bool,
    },
    /// Print the currently configured SELFIES alphabet, one symbol per line.
    Alphabet,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Encode { smiles } => match selfies::encode(&smiles) {
            Ok(encoded) => println!("{encoded}"),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        },
        Command::Decode {
            selfies: input,
            unrestricted_nitrogen,
        } => {
            println!("{}", selfies::decode(&input, !unrestricted_nitrogen));
        }
        Command::Alphabet => {
            for symbol in selfies::get_alphabet() {
                println!("{symbol}");
            }
        }
    }
}
