use criterion::{criterion_group, criterion_main, Criterion};

const SMILES_STRINGS: &[&str] = &[
    "CO",
    "C1=CC=CC=C1",
    "c1ccccc1",
    "CC(=O)O",
    "CC(=O)NCCC1=CNc2c1cc(OC)cc2CC(=O)NCCc1c[nH]c2ccc(OC)cc12",
    "O=Cc1ccc(O)c(OC)c1COc1cc(C=O)ccc1O",
    "C1CC1C(=O)O",
    "OCCc1c(C)[n+](cs1)Cc2cnc(C)nc2N",
    "C5CCC(C14CCCC1C2CCCC23CCCC34)C5",
];

fn benchmark_encode(c: &mut Criterion) {
    c.bench_function("encode", |b| {
        b.iter(|| {
            for smiles in SMILES_STRINGS {
                selfies::encode(smiles).unwrap();
            }
        });
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let encoded: Vec<String> = SMILES_STRINGS
        .iter()
        .map(|s| selfies::encode(s).unwrap())
        .collect();

    c.bench_function("decode", |b| {
        b.iter(|| {
            for selfies_string in &encoded {
                selfies::decode(selfies_string, true);
            }
        });
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);
