//! SMILES -> SELFIES encoding: walk a kekulized token list once, emitting
//! one bracketed symbol per atom and a length-prefixed marker at every
//! branch open and ring closure.

use std::collections::HashMap;

use super::alphabet::AlphabetSnapshot;
use super::length::{chars_from_n, min_arity_for};
use crate::smiles::{prepare_fragment, SmilesError, Token};
use crate::tables::BondKind;

/// Encodes a full (possibly `.`-separated) SMILES string into SELFIES.
pub fn encode(
    smiles: &str,
    restricted_nitrogen: bool,
    alphabet: &AlphabetSnapshot,
) -> Result<String, SmilesError> {
    let fragments: Vec<&str> = smiles.split('.').collect();
    let mut encoded = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let tokens = prepare_fragment(fragment, restricted_nitrogen)?;
        encoded.push(encode_fragment(&tokens, alphabet));
    }
    Ok(encoded.join("."))
}

fn encode_fragment(tokens: &[Token], alphabet: &AlphabetSnapshot) -> String {
    let mut pos = 0usize;
    let mut atom_counter = 0usize;
    let mut ring_opens: HashMap<u16, (usize, BondKind)> = HashMap::new();
    let symbols = encode_sequence(tokens, &mut pos, &mut atom_counter, &mut ring_opens, alphabet);
    symbols.join("")
}

/// Encodes one chain — either the whole fragment (`pos` starts at 0) or
/// a branch body (`pos` starts just past its opening paren) — returning
/// once it runs out of tokens or hits the branch's matching close paren.
fn encode_sequence(
    tokens: &[Token],
    pos: &mut usize,
    atom_counter: &mut usize,
    ring_opens: &mut HashMap<u16, (usize, BondKind)>,
    alphabet: &AlphabetSnapshot,
) -> Vec<String> {
    let mut out = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::Atom(atom) => {
                let symbol_text = alphabet.symbol_text(&atom.element);
                out.push(format!("[{}{}]", atom.bond.selfies_prefix(), symbol_text));
                *atom_counter += 1;
                *pos += 1;
            }
            Token::Branch(b) if b.open => {
                *pos += 1; // step past '('
                let branch_bond_order = match tokens.get(*pos) {
                    Some(Token::Atom(a)) => a.bond.order(),
                    _ => 1,
                };
                let x = branch_bond_order.clamp(1, 3);
                let inner = encode_sequence(tokens, pos, atom_counter, ring_opens, alphabet);
                let n = (inner.len() as u32).saturating_sub(1);
                let arity = min_arity_for(n);
                out.push(format!("[Branch{arity}_{x}]"));
                out.extend(chars_from_n(n, arity).into_iter().map(str::to_string));
                out.extend(inner);
            }
            Token::Branch(_) => {
                *pos += 1; // step past ')'
                return out;
            }
            Token::Ring(r) => {
                if let Some((open_atom, open_bond)) = ring_opens.remove(&r.number) {
                    let right = atom_counter.saturating_sub(1);
                    let n = right.saturating_sub(open_atom + 1) as u32;
                    let arity = min_arity_for(n);
                    let bond = if open_bond != BondKind::Elided {
                        open_bond
                    } else {
                        r.bond
                    };
                    let name = if bond == BondKind::Elided {
                        "Ring"
                    } else {
                        "ExplRing"
                    };
                    out.push(format!("[{}{name}{arity}]", bond.selfies_prefix()));
                    out.extend(chars_from_n(n, arity).into_iter().map(str::to_string));
                } else {
                    ring_opens.insert(r.number, (atom_counter.saturating_sub(1), r.bond));
                }
                *pos += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode_default(smiles: &str) -> String {
        encode(smiles, true, &AlphabetSnapshot::default()).unwrap()
    }

    #[test]
    fn encodes_simple_chain() {
        assert_eq!(encode_default("CCO"), "[C][C][O]");
    }

    #[test]
    fn encodes_double_bond() {
        assert_eq!(encode_default("C=C"), "[C][=C]");
    }

    #[test]
    fn encodes_branch() {
        let out = encode_default("CC(C)O");
        assert!(out.contains("[Branch1_1]"));
    }

    #[test]
    fn encodes_ring() {
        let out = encode_default("C1CCCCC1");
        assert!(out.contains("[Ring1]"));
    }

    #[test]
    fn encodes_fragmented_smiles() {
        let out = encode_default("CC.O");
        assert_eq!(out, "[C][C].[O]");
    }

    #[test]
    fn encodes_aromatic_ring_kekulized() {
        let out = encode_default("c1ccccc1");
        assert!(out.contains("[=C]"));
        assert!(!out.contains("[c]"));
    }
}
