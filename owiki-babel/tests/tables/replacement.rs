//! Character and symbol table behaviour, including properties of the
//! shorthand encoding.

use crate::common::parse_owiki;
use owiki_babel::model::{Block, Inline};
use owiki_babel::tables::{CharacterTable, SymbolTable};
use proptest::prelude::*;

/// Shorthand pieces and digits around `x`.
const PLAIN: &[char] = &[
    'a', 'b', '1', '2', ' ', 'x', '<', '>', '=', '!', '+', '-', '.', '(', ')', 'C', 'R', 'T',
    'M',
];

/// [`PLAIN`] plus the escape character and every symbol.
const ALPHABET: &[char] = &[
    'a', 'b', '1', '2', ' ', 'x', '<', '>', '=', '!', '+', '-', '.', '(', ')', 'C', 'R', 'T',
    'M', '\\', '→', '⇔', '↔', '—', '–', '←', '⇒', '≤', '≥', '≠', '±', '…', '©', '®', '™', '×',
];

const SHORTHANDS: &[&str] = &[
    "<=>", "<->", "---", "--", "->", "<-", "=>", "<=", ">=", "!=", "+-", "...", "(C)", "(R)",
    "(TM)",
];

fn text_over(alphabet: &'static [char]) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(alphabet), 0..24)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn encoded_text_decodes_to_itself(text in text_over(ALPHABET)) {
        let table = CharacterTable::standard();
        prop_assert_eq!(table.decode(&table.encode(&text)), text.clone());
        prop_assert_eq!(table.decode(&table.escape(&text)), text);
    }

    #[test]
    fn spaced_shorthand_survives_decode_then_encode(
        words in prop::collection::vec(prop::sample::select(SHORTHANDS), 1..6)
    ) {
        let table = CharacterTable::standard();
        let text = words.join(" ");
        prop_assert_eq!(table.encode(&table.decode(&text)), text);
    }

    #[test]
    fn decoding_is_idempotent_without_escapes(text in text_over(PLAIN)) {
        let table = CharacterTable::standard();
        let once = table.decode(&text);
        prop_assert_eq!(table.decode(&once), once.clone());
    }
}

#[test]
fn test_custom_character_table() {
    let table = CharacterTable::new(&[("<3", "♥"), ("", "ignored")]);
    assert_eq!(table.decode("I <3 it"), "I ♥ it");
    assert_eq!(table.encode("I ♥ it"), "I <3 it");
    assert_eq!(table.pairs().count(), 1);
}

#[test]
fn test_symbol_tokens_in_documents() {
    let doc = parse_owiki("(i) note (*r) and (off)");
    assert_eq!(
        doc.blocks,
        vec![Block::Paragraph(vec![
            Inline::Symbol("information.png".to_string()),
            Inline::run(" note "),
            Inline::Symbol("star-red.png".to_string()),
            Inline::run(" and "),
            Inline::Symbol("lightbulb-off.png".to_string()),
        ])]
    );
}

#[test]
fn test_longest_symbol_token_wins() {
    let table = SymbolTable::standard();
    let chars: Vec<char> = "(*g)".chars().collect();
    assert_eq!(table.match_at(&chars, 0), Some((4, "star-green.png")));
    assert_eq!(table.decode("(nope)"), None);
}
