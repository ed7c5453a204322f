use crate::tables::BondKind;

/// One lexical unit of a SMILES fragment, as produced by
/// [`crate::smiles::tokenizer::tokenize`]: a bond prefix together with
/// the symbol it attaches to, tagged with what kind of symbol it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare or bracketed atom.
    Atom(AtomToken),
    /// `(` or `)`.
    Branch(BranchToken),
    /// A ring-closure digit, bare (`1`..`9`) or `%NN`.
    Ring(RingToken),
}

/// An atom symbol: its leading bond (empty if elided), its canonical
/// (always uppercase) element spelling, whether it was written
/// aromatically (lowercase) in the source, and — for bracket atoms —
/// the explicit hydrogen count and charge that reduce its remaining
/// valence budget.
///
/// Isotope and stereo-configuration markers are not modeled beyond
/// hydrogen count and charge (spec.md's Non-goals) and are dropped,
/// not preserved — this crate never serializes SMILES back out of
/// `AtomToken` directly, only through `selfies::encode`'s symbol
/// rebuild from `element`/`bond`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomToken {
    pub bond: BondKind,
    pub element: String,
    pub aromatic: bool,
    pub explicit_h: u8,
    pub charge: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchToken {
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingToken {
    pub bond: BondKind,
    pub number: u16,
}
