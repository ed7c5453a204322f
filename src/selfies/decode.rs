//! SELFIES -> SMILES decoding: the single left-to-right derivation pass
//! with recursive descent into branches.
//!
//! This is the only half of the codec with a totality guarantee: every
//! bracketed token is interpreted defensively (skipped, downgraded, or
//! dropped) so that any input — including strings that were never
//! produced by [`crate::selfies::encode`] — decodes to a syntactically
//! valid SMILES. There is deliberately no `Result` return here; see the
//! module docs on [`crate::SmilesError`] for the half of the codec that
//! *can* fail.

use std::collections::HashMap;

use super::alphabet::AlphabetSnapshot;
use super::length::n_from_chars;
use crate::tables::{upper_first, BondKind};

/// Default `N` used for a branch whose length digits ran past the end
/// of the input before all of them could be read. Matches the
/// `selfiesv1` reference decoder's `default=1` for branches.
const BRANCH_DEFAULT_N: u32 = 1;
/// Same, for rings (`default=5` in the reference decoder, also stated
/// directly in spec.md).
const RING_DEFAULT_N: u32 = 5;

/// The decoder's derivation state: how many bonds the next atom may
/// spend attaching to the preceding one.
///
/// `Root` is the state before any atom has been derived — there is no
/// preceding atom, so no bond is ever clamped or consumed. `BranchInit`
/// is one of the three sentinels (`999X`) entered when recursing into a
/// branch body; for the purposes of attaching the branch's first atom
/// it behaves exactly like `Budget(X)` (see DESIGN.md for why the
/// unification is the simplest reading of spec.md's glossary entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DState {
    Root,
    Budget(i64),
    BranchInit(u8),
}

impl DState {
    fn as_budget(self) -> Option<i64> {
        match self {
            Self::Root => None,
            Self::Budget(b) => Some(b),
            Self::BranchInit(x) => Some(i64::from(x)),
        }
    }
}

/// One bracketed SELFIES token, classified by shape. Anything that
/// doesn't parse into a recognized shape becomes `Garbage` and is
/// treated exactly like `[epsilon]` by the derivation loop — a
/// no-op that breaks the current chain.
enum Symbol<'a> {
    Epsilon,
    Atom { order: u8, text: &'a str },
    Branch { initiator: u8, arity: u8 },
    Ring { bond: BondKind, arity: u8 },
    Garbage,
}

fn parse_symbol(token: &str) -> Symbol<'_> {
    let Some(inner) = token.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Symbol::Garbage;
    };
    if inner == "epsilon" {
        return Symbol::Epsilon;
    }

    let (bond, rest) = if let Some(r) = inner.strip_prefix('=') {
        (BondKind::Double, r)
    } else if let Some(r) = inner.strip_prefix('#') {
        (BondKind::Triple, r)
    } else {
        (BondKind::Elided, inner)
    };

    if let Some(branch_rest) = rest.strip_prefix("Branch") {
        return match branch_rest.split_once('_') {
            Some((l_str, x_str)) => Symbol::Branch {
                initiator: x_str.parse::<u8>().unwrap_or(1).clamp(1, 3),
                arity: l_str.parse::<u8>().unwrap_or(1).clamp(1, 3),
            },
            None => Symbol::Garbage,
        };
    }

    if let Some(l_str) = rest.strip_prefix("ExplRing").or_else(|| rest.strip_prefix("Ring")) {
        return Symbol::Ring {
            bond,
            arity: l_str.parse::<u8>().unwrap_or(1).clamp(1, 3),
        };
    }

    if rest.is_empty() {
        return Symbol::Garbage;
    }
    Symbol::Atom {
        order: bond.order(),
        text: rest,
    }
}

/// Resolves a parsed atom symbol's text (e.g. `"C"`, `"Liexpl"`) to its
/// canonical element spelling. The decoder accepts any alphabetic
/// element text, known to the periodic table or not — SELFIES imposes
/// no restriction here beyond "looks like an element name" (see
/// spec.md §4.1's unconfigured-element handling).
fn resolve_element(text: &str) -> Option<String> {
    let core = text.strip_suffix("expl").unwrap_or(text);
    if core.is_empty() || !core.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(upper_first(core))
}

/// The atom's text-with-bond-prefix budget and parent index, as in
/// spec.md §3's derivation record. `bracketed` mirrors the SMILES
/// convention that only organic-subset elements may appear bare; any
/// configured or unrecognized element is written with brackets.
struct DerivedAtom {
    bond: BondKind,
    element: String,
    bracketed: bool,
    budget: i64,
    parent: isize,
    ring_closures: Vec<(BondKind, String)>,
}

struct RingRequest {
    left: usize,
    right: usize,
    bond: BondKind,
}

/// Splits a fragment into its bracketed tokens, exactly like
/// `selfiesv1`'s character generator: scan for `[`, then the next `]`,
/// and repeat. Anything outside brackets (stray characters from
/// malformed input) is silently dropped — another facet of the
/// decoder's totality.
fn split_tokens(fragment: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = fragment;
    while let Some(start) = rest.find('[') {
        let Some(end) = rest[start + 1..].find(']') else {
            break;
        };
        tokens.push(rest[start..=start + 1 + end].to_string());
        rest = &rest[start + end + 2..];
    }
    tokens
}

/// Computes the bond consumed attaching an atom of valence `cap` in
/// state `state`, and that atom's own remaining budget afterward.
/// Returns `(0, Budget(0))` when the attachment must downgrade all the
/// way to a chain break.
fn next_atom_state(state: DState, requested: u8, cap: i64) -> (u8, DState) {
    match state.as_budget() {
        None => (0, DState::Budget(cap)),
        Some(budget) => {
            let allowed = i64::from(requested).min(budget).min(cap).max(0);
            if allowed <= 0 {
                (0, DState::Budget(0))
            } else {
                (allowed as u8, DState::Budget(cap - allowed))
            }
        }
    }
}

/// Derives atoms from `tokens` into `derived`, recursing into branch
/// bodies as they're encountered. `prev_idx` is the atom this call's
/// first attachment bonds to (`-1` at the true root of a fragment).
#[allow(clippy::too_many_arguments)]
fn derive(
    tokens: &[String],
    init_state: DState,
    mut prev_idx: isize,
    derived: &mut Vec<DerivedAtom>,
    branches: &mut Vec<(usize, usize)>,
    rings: &mut Vec<RingRequest>,
    alphabet: &AlphabetSnapshot,
    restricted_nitrogen: bool,
) {
    let mut state = init_state;
    let mut i = 0usize;

    while i < tokens.len() {
        match parse_symbol(&tokens[i]) {
            Symbol::Branch { initiator, arity } => {
                i += 1;
                match state {
                    DState::Budget(0) | DState::Budget(1) => {
                        if i < tokens.len() {
                            i += 1;
                        }
                    }
                    DState::BranchInit(_) => {}
                    _ => {
                        let mut digits: Vec<&str> = Vec::new();
                        for _ in 0..arity {
                            if i >= tokens.len() {
                                break;
                            }
                            digits.push(tokens[i].as_str());
                            i += 1;
                        }
                        let n = if digits.len() == arity as usize {
                            n_from_chars(&digits)
                        } else {
                            BRANCH_DEFAULT_N
                        };

                        let body_start = i;
                        let body_end = (i + n as usize + 1).min(tokens.len());
                        let body = &tokens[body_start..body_end];
                        i = body_end;

                        let branch_start = derived.len();
                        derive(
                            body,
                            DState::BranchInit(initiator),
                            prev_idx,
                            derived,
                            branches,
                            rings,
                            alphabet,
                            restricted_nitrogen,
                        );
                        if derived.len() > branch_start {
                            branches.push((branch_start, derived.len() - 1));
                        }

                        state = if prev_idx >= 0 {
                            DState::Budget(derived[prev_idx as usize].budget)
                        } else {
                            DState::Root
                        };
                    }
                }
            }

            Symbol::Ring { bond, arity } => {
                i += 1;
                if state == DState::Budget(0) {
                    if i < tokens.len() {
                        i += 1;
                    }
                } else {
                    let mut digits: Vec<&str> = Vec::new();
                    for _ in 0..arity {
                        if i >= tokens.len() {
                            break;
                        }
                        digits.push(tokens[i].as_str());
                        i += 1;
                    }
                    let n = if digits.len() == arity as usize {
                        n_from_chars(&digits)
                    } else {
                        RING_DEFAULT_N
                    };

                    if !derived.is_empty() {
                        let right = derived.len() - 1;
                        let left = right.saturating_sub(n as usize + 1);
                        rings.push(RingRequest { left, right, bond });
                    }
                    // state is unchanged: a ring request never itself
                    // consumes budget (that happens bilocally, later).
                }
            }

            Symbol::Epsilon | Symbol::Garbage => {
                i += 1;
                state = DState::Budget(0);
            }

            Symbol::Atom { order, text } => {
                i += 1;
                match resolve_element(text) {
                    None => state = DState::Budget(0),
                    Some(element) => {
                        let cap = i64::from(alphabet.valence(&element, restricted_nitrogen));
                        let (consumed, new_state) = next_atom_state(state, order, cap);

                        if consumed == 0 && prev_idx >= 0 {
                            state = DState::Budget(0);
                        } else {
                            let bond = if prev_idx < 0 {
                                BondKind::Elided
                            } else {
                                BondKind::from_order(consumed)
                            };
                            let budget = new_state.as_budget().unwrap_or(cap);
                            let bracketed = !alphabet.is_organic_subset(&element);

                            derived.push(DerivedAtom {
                                bond,
                                element,
                                bracketed,
                                budget,
                                parent: prev_idx,
                                ring_closures: Vec::new(),
                            });
                            if prev_idx >= 0 {
                                derived[prev_idx as usize].budget -= i64::from(consumed);
                            }
                            prev_idx = (derived.len() - 1) as isize;
                            state = DState::Budget(budget);
                        }
                    }
                }
            }
        }
    }
}

/// Resolves ring requests after every atom has been derived, per
/// spec.md §4.6's bilocal ring-formation rules: drop degenerate or
/// over-budget rings, merge chain-adjacent ones into the existing bond,
/// and assign closure digits to everything else.
fn form_rings_bilocally(derived: &mut [DerivedAtom], rings: &[RingRequest]) {
    let mut ring_locs: Vec<(usize, usize, BondKind)> = Vec::new();

    for request in rings {
        let RingRequest { left, right, bond } = *request;
        if left == right {
            continue;
        }

        let bond_order = i64::from(bond.order());
        if bond_order > derived[left].budget || bond_order > derived[right].budget {
            continue;
        }

        if derived[right].parent == left as isize {
            let combined = (derived[right].bond.order() + bond.order()).min(3);
            derived[right].bond = BondKind::from_order(combined);
        } else if let Some(entry) = ring_locs
            .iter_mut()
            .find(|(l, r, _)| *l == left && *r == right)
        {
            let combined = (entry.2.order() + bond.order()).min(3);
            entry.2 = BondKind::from_order(combined);
        } else {
            ring_locs.push((left, right, bond));
        }

        derived[left].budget -= bond_order;
        derived[right].budget -= bond_order;
    }

    for (id, (left, right, bond)) in ring_locs.into_iter().enumerate() {
        let number = id + 1;
        let id_text = if number >= 10 {
            format!("%{number:02}")
        } else {
            number.to_string()
        };
        derived[left].ring_closures.push((bond, id_text.clone()));
        derived[right].ring_closures.push((bond, id_text));
    }
}

/// Renders the derivation record into SMILES text: atoms in derivation
/// order, with branch parens and ring-closure digits placed per
/// spec.md §4.6's reconstruction rule.
fn reconstruct(derived: &[DerivedAtom], branches: &[(usize, usize)]) -> String {
    let mut opens: HashMap<usize, usize> = HashMap::new();
    let mut closes: HashMap<usize, usize> = HashMap::new();
    for &(open_at, close_at) in branches {
        *opens.entry(open_at).or_insert(0) += 1;
        *closes.entry(close_at).or_insert(0) += 1;
    }

    let mut out = String::new();
    for (i, atom) in derived.iter().enumerate() {
        if let Some(&n) = opens.get(&i) {
            out.extend(std::iter::repeat('(').take(n));
        }

        out.push_str(&atom.bond.to_string());
        if atom.bracketed {
            out.push('[');
            out.push_str(&atom.element);
            out.push(']');
        } else {
            out.push_str(&atom.element);
        }
        for (bond, id) in &atom.ring_closures {
            out.push_str(&bond.to_string());
            out.push_str(id);
        }

        if let Some(&n) = closes.get(&i) {
            out.extend(std::iter::repeat(')').take(n));
        }
    }
    out
}

fn decode_fragment(fragment: &str, restricted_nitrogen: bool, alphabet: &AlphabetSnapshot) -> String {
    let tokens = split_tokens(fragment);
    let mut derived: Vec<DerivedAtom> = Vec::new();
    let mut branches: Vec<(usize, usize)> = Vec::new();
    let mut rings: Vec<RingRequest> = Vec::new();

    derive(
        &tokens,
        DState::Root,
        -1,
        &mut derived,
        &mut branches,
        &mut rings,
        alphabet,
        restricted_nitrogen,
    );
    form_rings_bilocally(&mut derived, &rings);
    reconstruct(&derived, &branches)
}

/// Decodes a full (possibly `.`-separated) SELFIES string into SMILES.
/// Total: every input, well-formed or not, produces a syntactically
/// valid SMILES string (possibly empty).
pub fn decode(selfies: &str, restricted_nitrogen: bool, alphabet: &AlphabetSnapshot) -> String {
    selfies
        .split('.')
        .map(|fragment| decode_fragment(fragment, restricted_nitrogen, alphabet))
        .collect::<Vec<_>>()
        .join(".")
}
