//! End-to-end scenarios from spec.md's literal table (§8), plus the
//! totality property exercised against the kind of varied SMILES corpus
//! the teacher's own integration suite drew from (rings, branches,
//! bracket atoms, charges, multi-fragment salts).

use pretty_assertions::assert_eq;

#[test]
fn encodes_simple_chain() {
    assert_eq!(selfies::encode("CCO").unwrap(), "[C][C][O]");
}

#[test]
fn decodes_simple_chain() {
    assert_eq!(selfies::decode("[C][C][O]", true), "CCO");
}

#[test]
fn double_bond_round_trips() {
    let encoded = selfies::encode("C=C").unwrap();
    assert_eq!(selfies::decode(&encoded, true), "C=C");
}

#[test]
fn cyclohexane_round_trips() {
    let encoded = selfies::encode("C1CCCCC1").unwrap();
    assert_eq!(selfies::decode(&encoded, true), "C1CCCCC1");
}

#[test]
fn branch_only_selfies_has_no_unmatched_parens() {
    let out = selfies::decode("[Branch1_1][C][C][C]", true);
    assert_balanced(&out);
}

fn assert_balanced(smiles: &str) {
    let mut depth = 0i32;
    for c in smiles.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                assert!(depth >= 0, "unmatched ')' in {smiles:?}");
            }
            _ => {}
        }
    }
    assert_eq!(depth, 0, "unmatched '(' in {smiles:?}");
}

/// A sample of real molecules, reused from the kind of corpus the
/// teacher's own roundtrip suite drew from, restricted to what this
/// codec actually supports (no stereo bonds beyond `/`, `\`, no SMARTS).
const SAMPLE_SMILES: &[&str] = &[
    "CCO",
    "C1=CC=CC=C1",
    "c1ccccc1",
    "CC(=O)O",
    "CC(=O)NCCC1=CNc2c1cc(OC)cc2CC(=O)NCCc1c[nH]c2ccc(OC)cc12",
    "O=Cc1ccc(O)c(OC)c1COc1cc(C=O)ccc1O",
    "C1CC1C(=O)O",
    "[NH4+]",
    "CC.O",
    "c1ccc[se]1",
    "C5CCC(C14CCCC1C2CCCC23CCCC34)C5",
];

#[test]
fn encode_succeeds_on_sample_corpus() {
    for smiles in SAMPLE_SMILES {
        selfies::encode(smiles).unwrap_or_else(|err| panic!("{smiles} failed to encode: {err}"));
    }
}

#[test]
fn decode_of_every_encoded_sample_is_balanced_smiles() {
    for smiles in SAMPLE_SMILES {
        let encoded = selfies::encode(smiles).unwrap();
        let decoded = selfies::decode(&encoded, true);
        assert_balanced(&decoded);
    }
}

#[test]
fn decoder_is_total_over_arbitrary_bracket_soup() {
    let alphabet = selfies::get_alphabet();
    // A small deterministic "random" walk over the alphabet, standing in
    // for spec.md §8's "random string of 50 symbols" scenario without
    // pulling in a random-number dependency for one test.
    let mut selected = String::new();
    for i in 0..50 {
        let symbol = &alphabet[(i * 37 + 5) % alphabet.len()];
        selected.push_str(symbol);
    }
    let out = selfies::decode(&selected, true);
    assert_balanced(&out);
}

#[test]
fn malformed_smiles_reports_an_error() {
    assert!(selfies::encode("Xx").is_err());
    assert!(selfies::encode("[CH4").is_err());
}

#[test]
fn fragment_separator_round_trips_a_salt() {
    let encoded = selfies::encode("CC.O").unwrap();
    assert_eq!(encoded, "[C][C].[O]");
    assert_eq!(selfies::decode(&encoded, true), "CC.O");
}

#[test]
fn set_alphabet_then_restore_is_idempotent_on_decode() {
    let before = selfies::decode("[C][C][O]", true);

    let mut mapping = std::collections::BTreeMap::new();
    mapping.insert("Li".to_string(), 1);
    selfies::set_alphabet(Some(mapping)).unwrap();
    assert_eq!(selfies::decode("[Liexpl]", true), "[Li]");

    selfies::set_alphabet(None).unwrap();
    assert_eq!(selfies::decode("[C][C][O]", true), before);
}
