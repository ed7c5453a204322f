//! Lazy tokenizer over a single (dot-free) SMILES fragment.
//!
//! Produces a finite, non-restartable sequence of [`Token`]s: one atom,
//! branch parenthesis, or ring-closure digit per step, each carrying
//! whatever bond character preceded it.

use super::error::SmilesError;
use super::scanner::Scanner;
use super::token::{AtomToken, BranchToken, RingToken, Token};
use crate::tables::{is_aromatic_token, is_known_element, upper_first, BondKind};

/// A lazy, one-shot iterator of [`Token`]s over a SMILES fragment.
pub struct Tokenizer<'a> {
    scanner: Scanner,
    source: &'a str,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(fragment: &'a str) -> Self {
        Self {
            scanner: Scanner::new(fragment),
            source: fragment,
            done: false,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, SmilesError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.scanner.is_done() {
            return None;
        }

        match read_token(&mut self.scanner) {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                if self.scanner.is_done() {
                    None
                } else {
                    Some(Err(SmilesError::MalformedSmiles(self.scanner.cursor())))
                }
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenizes a whole fragment eagerly, for callers (the kekulizer, the
/// encoder) that need the full token list rather than a streaming pass.
pub fn tokenize(fragment: &str) -> Result<Vec<Token>, SmilesError> {
    Tokenizer::new(fragment).collect()
}

fn read_token(scanner: &mut Scanner) -> Result<Option<Token>, SmilesError> {
    match scanner.peek() {
        Some('(') => {
            scanner.pop();
            Ok(Some(Token::Branch(BranchToken { open: true })))
        }
        Some(')') => {
            scanner.pop();
            Ok(Some(Token::Branch(BranchToken { open: false })))
        }
        Some('%') => read_ring(scanner, BondKind::Elided).map(Some),
        Some(c) if c.is_ascii_digit() => read_ring(scanner, BondKind::Elided).map(Some),
        Some('[') => read_bracket_atom(scanner, BondKind::Elided).map(Some),
        Some(c) if is_bond_char(c) => {
            scanner.pop();
            let bond = BondKind::from_char(c);
            match scanner.peek() {
                Some('%') | Some('0'..='9') => read_ring(scanner, bond).map(Some),
                Some('[') => read_bracket_atom(scanner, bond).map(Some),
                Some(_) => read_bare_atom(scanner, bond).map(Some),
                None => Err(SmilesError::MalformedSmiles(scanner.cursor())),
            }
        }
        Some(_) => read_bare_atom(scanner, BondKind::Elided).map(Some),
        None => Ok(None),
    }
}

const fn is_bond_char(c: char) -> bool {
    matches!(c, '-' | '/' | '\\' | '=' | '#')
}

fn read_ring(scanner: &mut Scanner, bond: BondKind) -> Result<Token, SmilesError> {
    let start = scanner.cursor();

    let number = if scanner.peek() == Some('%') {
        scanner.pop();
        let tens = scanner
            .pop()
            .filter(char::is_ascii_digit)
            .ok_or(SmilesError::MalformedSmiles(start))?;
        let ones = scanner
            .pop()
            .filter(char::is_ascii_digit)
            .ok_or(SmilesError::MalformedSmiles(start))?;
        u16::from(tens as u8 - b'0') * 10 + u16::from(ones as u8 - b'0')
    } else {
        let digit = scanner
            .pop()
            .filter(char::is_ascii_digit)
            .ok_or(SmilesError::MalformedSmiles(start))?;
        u16::from(digit as u8 - b'0')
    };

    Ok(Token::Ring(RingToken { bond, number }))
}

fn read_bare_atom(scanner: &mut Scanner, bond: BondKind) -> Result<Token, SmilesError> {
    let start = scanner.cursor();

    let Some(first) = scanner.peek() else {
        return Err(SmilesError::MalformedSmiles(start));
    };

    if first == '*' {
        scanner.pop();
        return Ok(Token::Atom(AtomToken {
            bond,
            element: "*".to_string(),
            aromatic: false,
            explicit_h: 0,
            charge: 0,
        }));
    }

    if !first.is_ascii_alphabetic() {
        return Err(SmilesError::MalformedSmiles(start));
    }
    scanner.pop();

    // Greedily try a two-letter aliphatic element (Cl, Br) before
    // falling back to the one-letter spelling.
    let mut element = first.to_string();
    if first.is_ascii_uppercase() {
        if let Some(second) = scanner.peek() {
            if second.is_ascii_lowercase() {
                let candidate = format!("{first}{second}");
                if is_known_element(&candidate) {
                    scanner.pop();
                    element = candidate;
                }
            }
        }
    }

    let aromatic = is_aromatic_token(&element);
    let canonical = if aromatic {
        upper_first(&element)
    } else {
        element.clone()
    };

    if !is_known_element(&canonical) {
        return Err(SmilesError::MalformedSmiles(start));
    }

    Ok(Token::Atom(AtomToken {
        bond,
        element: canonical,
        aromatic,
        explicit_h: 0,
        charge: 0,
    }))
}

fn read_bracket_atom(scanner: &mut Scanner, bond: BondKind) -> Result<Token, SmilesError> {
    let open = scanner.cursor();
    debug_assert_eq!(scanner.peek(), Some('['));
    scanner.pop();

    let mut content = String::new();
    while let Some(c) = scanner.peek() {
        if c == ']' {
            break;
        }
        content.push(c);
        scanner.pop();
    }
    if scanner.peek() != Some(']') {
        return Err(SmilesError::MalformedSmiles(open));
    }
    scanner.pop(); // ']'

    parse_bracket_contents(&content, bond, open)
}

fn parse_bracket_contents(
    content: &str,
    bond: BondKind,
    open: usize,
) -> Result<Token, SmilesError> {
    let mut chars = content.chars().peekable();

    // isotope (leading digits) — dropped, not modeled (non-goal)
    while chars.peek().is_some_and(char::is_ascii_digit) {
        chars.next();
    }

    let mut element = String::new();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => element.push(c),
        Some('*') => element.push('*'),
        _ => return Err(SmilesError::MalformedSmiles(open)),
    }
    if element != "*" {
        if let Some(&c) = chars.peek() {
            if c.is_ascii_lowercase() && element.chars().next().unwrap().is_ascii_uppercase() {
                let candidate = format!("{element}{c}");
                if is_known_element(&candidate) {
                    element = candidate;
                    chars.next();
                }
            }
        }
    }

    let aromatic = element != "*" && is_aromatic_token(&element);
    let canonical = if aromatic {
        upper_first(&element)
    } else {
        element.clone()
    };
    if element != "*" && !is_known_element(&canonical) {
        return Err(SmilesError::MalformedSmiles(open));
    }

    // configuration markers (@, @@) — skipped, not modeled (non-goal)
    while chars.peek() == Some(&'@') {
        chars.next();
    }

    let mut explicit_h = 0u8;
    if chars.peek() == Some(&'H') {
        chars.next();
        let mut digits = String::new();
        while chars.peek().is_some_and(char::is_ascii_digit) {
            digits.push(chars.next().unwrap());
        }
        explicit_h = if digits.is_empty() {
            1
        } else {
            digits.parse().unwrap_or(1)
        };
    }

    let mut charge = 0i8;
    match chars.peek() {
        Some('+') => {
            chars.next();
            let mut count = 1i8;
            let mut digits = String::new();
            while chars.peek() == Some(&'+') {
                chars.next();
                count += 1;
            }
            while chars.peek().is_some_and(char::is_ascii_digit) {
                digits.push(chars.next().unwrap());
            }
            charge = if digits.is_empty() {
                count
            } else {
                digits.parse().unwrap_or(count)
            };
        }
        Some('-') => {
            chars.next();
            let mut count = 1i8;
            let mut digits = String::new();
            while chars.peek() == Some(&'-') {
                chars.next();
                count += 1;
            }
            while chars.peek().is_some_and(char::is_ascii_digit) {
                digits.push(chars.next().unwrap());
            }
            charge = -(if digits.is_empty() {
                count
            } else {
                digits.parse().unwrap_or(count)
            });
        }
        _ => {}
    }

    // atom-class map (`:99`) — dropped, not modeled (non-goal)
    if chars.peek() == Some(&':') {
        chars.next();
        while chars.peek().is_some_and(char::is_ascii_digit) {
            chars.next();
        }
    }

    Ok(Token::Atom(AtomToken {
        bond,
        element: canonical,
        aromatic,
        explicit_h,
        charge,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn atoms(fragment: &str) -> Vec<AtomToken> {
        tokenize(fragment)
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Atom(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn simple_chain() {
        let atoms = atoms("CCO");
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[0].element, "C");
        assert_eq!(atoms[2].element, "O");
    }

    #[test]
    fn two_letter_element() {
        let atoms = atoms("CCl");
        assert_eq!(atoms[1].element, "Cl");
    }

    #[test]
    fn bond_prefix_is_captured() {
        let atoms = atoms("C=C");
        assert_eq!(atoms[1].bond, BondKind::Double);
    }

    #[test]
    fn aromatic_lowercase() {
        let atoms = atoms("c1ccccc1");
        assert!(atoms[0].aromatic);
        assert_eq!(atoms[0].element, "C");
    }

    #[test]
    fn bracket_atom_hcount_and_charge() {
        let atoms = atoms("[NH4+]");
        assert_eq!(atoms[0].element, "N");
        assert_eq!(atoms[0].explicit_h, 4);
        assert_eq!(atoms[0].charge, 1);
    }

    #[test]
    fn ring_digit_and_percent() {
        let tokens = tokenize("C1CC%11C").unwrap();
        let rings: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Ring(r) => Some(r.number),
                _ => None,
            })
            .collect();
        assert_eq!(rings, vec![1, 11]);
    }

    #[test]
    fn branch_tokens() {
        let tokens = tokenize("C(C)C").unwrap();
        assert!(matches!(tokens[1], Token::Branch(BranchToken { open: true })));
        assert!(matches!(tokens[3], Token::Branch(BranchToken { open: false })));
    }

    #[test]
    fn unmatched_bracket_is_malformed() {
        assert_eq!(tokenize("[CH4"), Err(SmilesError::MalformedSmiles(0)));
    }

    #[test]
    fn unknown_element_is_malformed() {
        assert!(tokenize("Xx").is_err());
    }

    #[test]
    fn trailing_bond_is_malformed() {
        assert!(tokenize("C-").is_err());
    }

    #[test]
    fn star_wildcard() {
        let atoms = atoms("*C");
        assert_eq!(atoms[0].element, "*");
    }
}
