//! SMILES-side half of the codec: a tokenizer that turns a fragment into
//! `(bond, symbol, kind)` triples, and a kekulizer that rewrites any
//! aromatic subgraph it finds into explicit alternating bonds.

mod error;
mod kekulize;
mod scanner;
mod token;
mod tokenizer;

pub use error::SmilesError;
pub use kekulize::kekulize;
pub use token::{AtomToken, BranchToken, RingToken, Token};
pub use tokenizer::{tokenize, Tokenizer};

/// Tokenizes and kekulizes a single (dot-free) SMILES fragment in one
/// step — the pipeline the encoder drives before walking the token list
/// into SELFIES symbols.
pub fn prepare_fragment(
    fragment: &str,
    restricted_nitrogen: bool,
) -> Result<Vec<Token>, SmilesError> {
    let mut tokens = tokenize(fragment)?;
    kekulize(&mut tokens, restricted_nitrogen)?;
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prepares_simple_chain() {
        let tokens = prepare_fragment("CCO", true).unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn prepares_aromatic_ring() {
        let tokens = prepare_fragment("c1ccccc1", true).unwrap();
        for token in tokens {
            if let Token::Atom(atom) = token {
                assert!(!atom.aromatic);
            }
        }
    }
}
