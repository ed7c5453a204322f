//! Rewrites aromatic (lowercase-element) subgraphs into an explicit
//! alternating single/double bond form.
//!
//! Aromatic bonds are paired off by DFS backtracking over each
//! connected aromatic component: assign a double bond if both endpoints
//! still have spare valence, recurse, and undo on failure. An attempt
//! budget keeps pathological inputs from backtracking forever.

use std::collections::HashMap;

use super::error::SmilesError;
use super::token::Token;
use crate::tables::{default_valence, BondKind};

const MATCH_ATTEMPT_LIMIT: usize = 100_000;

/// One aromatic bond discovered in the token stream: either between two
/// consecutive atoms in the chain (`atom_site` identifies the later
/// atom, whose `bond` field is rewritten) or between two ring-closure
/// occurrences (`ring_sites` identifies both `RingToken`s to rewrite).
#[derive(Debug, Clone, Copy)]
enum BondSite {
    Chain { atom_index: usize },
    Ring { open_index: usize, close_index: usize },
}

#[derive(Debug, Clone, Copy)]
struct AromaticEdge {
    a: usize,
    b: usize,
    site: BondSite,
}

struct AtomInfo {
    element: String,
    degree: u32,
    explicit_h: u8,
    aromatic: bool,
}

impl AtomInfo {
    /// How many more bonds this atom's valence cap permits beyond the
    /// baseline single bond already assumed for each incident edge.
    fn spare_capacity(&self, restricted_nitrogen: bool) -> i64 {
        let cap = i64::from(default_valence(&self.element, restricted_nitrogen));
        if cap == i64::from(crate::tables::UNBOUNDED_VALENCE) {
            return 1; // unconfigured elements may take one extra bond
        }
        cap - i64::from(self.degree) - i64::from(self.explicit_h)
    }
}

/// Rewrites `tokens` in place so no lowercase (aromatic) element symbol
/// survives: every aromatic atom is uppercased, and every aromatic bond
/// becomes an explicit single or double order.
pub fn kekulize(tokens: &mut [Token], restricted_nitrogen: bool) -> Result<(), SmilesError> {
    let (atoms, edges) = scan(tokens);

    if atoms.iter().all(|a| !a.aromatic) {
        return Ok(());
    }

    let aromatic_edges: Vec<AromaticEdge> = edges
        .into_iter()
        .filter(|e| atoms[e.a].aromatic && atoms[e.b].aromatic)
        .collect();

    let components = connected_components(atoms.len(), &aromatic_edges);

    let mut matched = vec![false; aromatic_edges.len()];
    for component_edges in &components {
        if component_edges.is_empty() {
            continue;
        }
        let component_atoms = component_atom_set(component_edges, &aromatic_edges);
        let mut counts: HashMap<usize, u8> = HashMap::new();
        let mut attempts = 0usize;
        let ok = backtrack(
            0,
            component_edges,
            &component_atoms,
            &aromatic_edges,
            &atoms,
            restricted_nitrogen,
            &mut counts,
            &mut matched,
            &mut attempts,
        );
        if !ok {
            let failing_atom = component_edges.first().map_or(0, |&i| aromatic_edges[i].a);
            return Err(SmilesError::Unkekulizable(failing_atom));
        }
    }

    apply(tokens, &aromatic_edges, &matched);

    for token in tokens.iter_mut() {
        if let Token::Atom(atom) = token {
            atom.aromatic = false;
        }
    }

    Ok(())
}

fn scan(tokens: &[Token]) -> (Vec<AtomInfo>, Vec<AromaticEdge>) {
    let mut atoms: Vec<AtomInfo> = Vec::new();
    let mut edges: Vec<AromaticEdge> = Vec::new();
    let mut current: Option<usize> = None;
    let mut branch_stack: Vec<Option<usize>> = Vec::new();
    // ring number -> (atom index, token index, bond) recorded when opened
    let mut ring_open: HashMap<u16, (usize, usize, BondKind)> = HashMap::new();

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Atom(atom) => {
                let idx = atoms.len();
                atoms.push(AtomInfo {
                    element: atom.element.clone(),
                    degree: 0,
                    explicit_h: atom.explicit_h,
                    aromatic: atom.aromatic,
                });
                if let Some(prev) = current {
                    atoms[prev].degree += 1;
                    atoms[idx].degree += 1;
                    if atom.bond == BondKind::Elided {
                        edges.push(AromaticEdge {
                            a: prev,
                            b: idx,
                            site: BondSite::Chain { atom_index: i },
                        });
                    }
                }
                current = Some(idx);
            }
            Token::Branch(b) if b.open => branch_stack.push(current),
            Token::Branch(_) => current = branch_stack.pop().flatten(),
            Token::Ring(r) => {
                let here = current.expect("ring digit follows an atom");
                if let Some((open_atom, open_index, open_bond)) = ring_open.remove(&r.number) {
                    atoms[open_atom].degree += 1;
                    atoms[here].degree += 1;
                    if open_bond == BondKind::Elided && r.bond == BondKind::Elided {
                        edges.push(AromaticEdge {
                            a: open_atom,
                            b: here,
                            site: BondSite::Ring {
                                open_index,
                                close_index: i,
                            },
                        });
                    }
                } else {
                    ring_open.insert(r.number, (here, i, r.bond));
                }
            }
        }
    }

    (atoms, edges)
}

fn connected_components(atom_count: usize, edges: &[AromaticEdge]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..atom_count).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }

    for edge in edges {
        let ra = find(&mut parent, edge.a);
        let rb = find(&mut parent, edge.b);
        if ra != rb {
            parent[ra] = rb;
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, _edge) in edges.iter().enumerate() {
        let root = find(&mut parent, edges[i].a);
        groups.entry(root).or_default().push(i);
    }
    groups.into_values().collect()
}

/// The distinct atom indices touched by a component's edges, used to
/// check afterward that every atom with spare valence actually got
/// matched (spec.md §4.3: "atoms not matched must already have
/// satisfied valence").
fn component_atom_set(component_edges: &[usize], edges: &[AromaticEdge]) -> Vec<usize> {
    let mut set = std::collections::BTreeSet::new();
    for &edge_index in component_edges {
        set.insert(edges[edge_index].a);
        set.insert(edges[edge_index].b);
    }
    set.into_iter().collect()
}

/// True iff every atom in the component has either been matched at
/// least once or had no spare valence to begin with. A completed
/// assignment (`position == component_edges.len()`) only counts as a
/// valid Kekulé structure when this holds — reaching the end of the
/// edge list with some single-only atom left unsaturated is not a
/// perfect matching, just a vacuous one, and must be rejected so the
/// search backtracks onto an assignment that does saturate it.
fn is_perfect_matching(
    component_atoms: &[usize],
    atoms: &[AtomInfo],
    counts: &HashMap<usize, u8>,
    restricted_nitrogen: bool,
) -> bool {
    component_atoms.iter().all(|&atom_index| {
        counts.get(&atom_index).copied().unwrap_or(0) >= 1
            || atoms[atom_index].spare_capacity(restricted_nitrogen) < 1
    })
}

#[allow(clippy::too_many_arguments)]
fn backtrack(
    position: usize,
    component_edges: &[usize],
    component_atoms: &[usize],
    edges: &[AromaticEdge],
    atoms: &[AtomInfo],
    restricted_nitrogen: bool,
    counts: &mut HashMap<usize, u8>,
    matched: &mut [bool],
    attempts: &mut usize,
) -> bool {
    if position == component_edges.len() {
        return is_perfect_matching(component_atoms, atoms, counts, restricted_nitrogen);
    }
    if *attempts >= MATCH_ATTEMPT_LIMIT {
        return false;
    }
    *attempts += 1;

    let edge_index = component_edges[position];
    let edge = edges[edge_index];

    let can_double = counts.get(&edge.a).copied().unwrap_or(0) == 0
        && counts.get(&edge.b).copied().unwrap_or(0) == 0
        && atoms[edge.a].spare_capacity(restricted_nitrogen) >= 1
        && atoms[edge.b].spare_capacity(restricted_nitrogen) >= 1;

    if can_double {
        matched[edge_index] = true;
        *counts.entry(edge.a).or_insert(0) += 1;
        *counts.entry(edge.b).or_insert(0) += 1;

        if backtrack(
            position + 1,
            component_edges,
            component_atoms,
            edges,
            atoms,
            restricted_nitrogen,
            counts,
            matched,
            attempts,
        ) {
            return true;
        }

        *counts.get_mut(&edge.a).unwrap() -= 1;
        *counts.get_mut(&edge.b).unwrap() -= 1;
        matched[edge_index] = false;
    }

    if backtrack(
        position + 1,
        component_edges,
        component_atoms,
        edges,
        atoms,
        restricted_nitrogen,
        counts,
        matched,
        attempts,
    ) {
        return true;
    }

    false
}

fn apply(tokens: &mut [Token], edges: &[AromaticEdge], matched: &[bool]) {
    for (edge, &is_double) in edges.iter().zip(matched) {
        if !is_double {
            continue;
        }
        match edge.site {
            BondSite::Chain { atom_index } => {
                if let Token::Atom(atom) = &mut tokens[atom_index] {
                    atom.bond = BondKind::Double;
                }
            }
            BondSite::Ring {
                open_index,
                close_index,
            } => {
                if let Token::Ring(r) = &mut tokens[open_index] {
                    r.bond = BondKind::Double;
                }
                if let Token::Ring(r) = &mut tokens[close_index] {
                    r.bond = BondKind::Double;
                }
            }
        }
    }
}
