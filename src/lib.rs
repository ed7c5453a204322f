//! A bidirectional codec between [SMILES](https://en.wikipedia.org/wiki/Simplified_molecular-input_line-entry_system)
//! (the conventional chemical line notation) and [SELFIES](https://github.com/aspuru-guzik-group/selfies),
//! a self-referencing, robustness-biased alternative in which every
//! syntactically well-formed string decodes to a chemically valid
//! molecule.
//!
//! The crate is organized around three subsystems:
//!
//! - [`smiles`] tokenizes and kekulizes SMILES into an explicit
//!   alternating single/double-bond token stream.
//! - [`selfies`] turns that token stream into SELFIES symbols
//!   ([`selfies::encode`]) and derives SMILES back out of any SELFIES
//!   string, total over malformed input ([`selfies::decode`]).
//! - [`tables`] holds the element/valence/bond-order tables both halves
//!   share.
//!
//! The top-level `encode`/`decode` here use a process-wide alphabet
//! snapshot for source compatibility with the reference `selfies` API;
//! callers who want to avoid shared global state — or need concurrent
//! calls that interleave with [`set_alphabet`] — can drive
//! [`selfies::encode`] / [`selfies::decode`] directly with an explicit
//! [`AlphabetSnapshot`].

/// SELFIES-side half of the codec: alphabet, encoder, decoder.
pub mod selfies;
/// SMILES-side half of the codec: tokenizer and kekulizer.
pub mod smiles;
/// Atom and bond tables shared by both halves.
pub mod tables;

pub use selfies::{get_alphabet, get_atom_dict, set_alphabet, AlphabetError, AlphabetSnapshot};
pub use smiles::SmilesError;

/// Encodes a SMILES string into SELFIES, using the process-wide
/// alphabet (see [`set_alphabet`]). Fragments separated by `.` are
/// encoded independently and rejoined with `.`.
pub fn encode(smiles: &str) -> Result<String, SmilesError> {
    selfies::encode(smiles, true, &selfies::alphabet::get_alphabet_snapshot())
}

/// Decodes a SELFIES string into SMILES, using the process-wide
/// alphabet. Never errors: every input, well-formed or not, produces a
/// syntactically valid SMILES string. `restricted_nitrogen` selects
/// nitrogen's amine valence (3, the default in the reference
/// implementation) over its pentavalent form (5) when `false`.
pub fn decode(selfies: &str, restricted_nitrogen: bool) -> String {
    selfies::decode(
        selfies,
        restricted_nitrogen,
        &selfies::alphabet::get_alphabet_snapshot(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_then_decode_simple_chain() {
        assert_eq!(encode("CCO").unwrap(), "[C][C][O]");
        assert_eq!(decode("[C][C][O]", true), "CCO");
    }

    #[test]
    fn round_trips_a_double_bond() {
        let selfies = encode("C=C").unwrap();
        assert_eq!(decode(&selfies, true), "C=C");
    }

    #[test]
    fn round_trips_cyclohexane() {
        let selfies = encode("C1CCCCC1").unwrap();
        assert_eq!(decode(&selfies, true), "C1CCCCC1");
    }

}
