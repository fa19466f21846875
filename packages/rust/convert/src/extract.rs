//! Verse extraction from chapter documents.
//!
//! Two source shapes are recognised:
//! - the helloao API form:
//!   `{"chapter": {"content": [{"type": "verse", "number": 1, "content": [...]}]}}`
//! - flat verse lists: `[{"verse": 1, "text": "..."}]` or `{"verses": [...]}`,
//!   with the number under `verse`, `verse_number` or `v` and the text under
//!   `text` or `content`.
//!
//! Malformed items are skipped, never reported as errors. A verse whose
//! text is blank after trimming counts as having no text.

use serde_json::{Map, Value};
use tracing::debug;

use bibledata_shared::VerseRecord;

use crate::flatten::flatten_content;

/// Keys tried, in order, for the verse number in flat verse lists.
const VERSE_NUMBER_KEYS: [&str; 3] = ["verse", "verse_number", "v"];

/// Keys tried, in order, for the verse text in flat verse lists.
const VERSE_TEXT_KEYS: [&str; 2] = ["text", "content"];

/// Extract the sorted verse records of one chapter document.
///
/// The result is ascending by verse number with each number appearing once
/// (the first occurrence in source order wins). Documents in an
/// unrecognised shape yield an empty list.
pub fn extract_verses(doc: &Value) -> Vec<VerseRecord> {
    let verses = match doc {
        Value::Object(map) if map.contains_key("chapter") => from_api_chapter(&map["chapter"]),
        Value::Array(items) => from_verse_list(items),
        Value::Object(map) => match map.get("verses") {
            Some(Value::Array(items)) => from_verse_list(items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    normalize(verses)
}

/// Sort ascending by verse number and drop repeated numbers.
pub fn normalize(mut verses: Vec<VerseRecord>) -> Vec<VerseRecord> {
    // Stable sort keeps source order among equal numbers.
    verses.sort_by_key(|v| v.verse);

    let before = verses.len();
    verses.dedup_by_key(|v| v.verse);
    if verses.len() != before {
        debug!(dropped = before - verses.len(), "dropped duplicate verse numbers");
    }

    verses
}

fn from_api_chapter(chapter: &Value) -> Vec<VerseRecord> {
    let Some(Value::Array(items)) = chapter.get("content") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("verse"))
        .filter_map(|item| {
            let number = item.get("number").and_then(verse_number)?;
            let text = item.get("content").map(flatten_content).unwrap_or_default();
            make_record(number, text)
        })
        .collect()
}

fn from_verse_list(items: &[Value]) -> Vec<VerseRecord> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let number = first_present(item, &VERSE_NUMBER_KEYS).and_then(verse_number)?;
            let text = first_present(item, &VERSE_TEXT_KEYS)
                .map(flatten_content)
                .unwrap_or_default();
            make_record(number, text)
        })
        .collect()
}

fn make_record(number: u32, text: String) -> Option<VerseRecord> {
    if text.trim().is_empty() {
        return None;
    }
    Some(VerseRecord { verse: number, text })
}

/// Value of the first key in `keys` that the object has.
fn first_present<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| item.get(*key))
}

/// A positive verse number, given as an integer, an integral float such as
/// `1.0`, or a numeric string.
fn verse_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => n,
            None => integral_float(n.as_f64()?)?,
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };

    u32::try_from(n).ok().filter(|n| *n > 0)
}

fn integral_float(f: f64) -> Option<u64> {
    (f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f <= f64::from(u32::MAX)).then_some(f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(verses: &[VerseRecord]) -> Vec<u32> {
        verses.iter().map(|v| v.verse).collect()
    }

    #[test]
    fn api_shape_basic_example() {
        let doc = json!({
            "chapter": {
                "number": 1,
                "content": [
                    {"type": "verse", "number": 1, "content": ["In the"]},
                    {"type": "verse", "number": 2, "content": ["beginning"]}
                ]
            }
        });

        let verses = extract_verses(&doc);
        assert_eq!(
            serde_json::to_value(&verses).unwrap(),
            json!([{"verse": 1, "text": "In the"}, {"verse": 2, "text": "beginning"}])
        );
    }

    #[test]
    fn api_shape_skips_non_verse_items() {
        let doc = json!({
            "chapter": {
                "content": [
                    {"type": "heading", "content": ["The Creation"]},
                    {"type": "verse", "number": 1, "content": ["In the beginning"]},
                    {"type": "line_break"},
                    "stray string",
                    {"type": "hebrew_subtitle", "content": ["A Psalm"]},
                    {
                        "type": "verse",
                        "number": 2,
                        "content": [{"text": "Now the earth", "poem": 1}]
                    }
                ]
            }
        });

        let verses = extract_verses(&doc);
        assert_eq!(numbers(&verses), vec![1, 2]);
        assert_eq!(verses[1].text, "Now the earth");
    }

    #[test]
    fn output_is_sorted_regardless_of_source_order() {
        let doc = json!({
            "chapter": {
                "content": [
                    {"type": "verse", "number": 3, "content": ["c"]},
                    {"type": "verse", "number": 1, "content": ["a"]},
                    {"type": "verse", "number": 5, "content": ["e"]},
                    {"type": "verse", "number": 2, "content": ["b"]},
                    {"type": "verse", "number": 4, "content": ["d"]}
                ]
            }
        });

        let verses = extract_verses(&doc);
        assert_eq!(numbers(&verses), vec![1, 2, 3, 4, 5]);
        let texts: Vec<&str> = verses.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn duplicate_numbers_keep_first_occurrence() {
        let doc = json!([
            {"verse": 2, "text": "second"},
            {"verse": 1, "text": "first"},
            {"verse": 2, "text": "second again"}
        ]);

        let verses = extract_verses(&doc);
        assert_eq!(numbers(&verses), vec![1, 2]);
        assert_eq!(verses[1].text, "second");
    }

    #[test]
    fn verses_without_number_or_text_are_excluded() {
        let doc = json!({
            "chapter": {
                "content": [
                    {"type": "verse", "content": ["no number"]},
                    {"type": "verse", "number": 0, "content": ["zero"]},
                    {"type": "verse", "number": -3, "content": ["negative"]},
                    {"type": "verse", "number": 2},
                    {"type": "verse", "number": 3, "content": [{"lineBreak": true}]},
                    {"type": "verse", "number": 4, "content": ["kept"]},
                    {"type": "verse", "number": 5, "content": [" ", {"text": "\t"}]},
                    {"type": "verse", "number": 6.5, "content": ["fractional"]}
                ]
            }
        });

        let verses = extract_verses(&doc);
        assert_eq!(verses, vec![VerseRecord::new(4, "kept")]);
    }

    #[test]
    fn blank_text_is_excluded_in_verse_lists() {
        let doc = json!([
            {"verse": 1, "text": "a"},
            {"verse": 2, "text": " "},
            {"verse": 3, "text": "\n\t"}
        ]);
        assert_eq!(extract_verses(&doc), vec![VerseRecord::new(1, "a")]);
    }

    #[test]
    fn integral_float_numbers_are_accepted() {
        let doc = json!({
            "chapter": {
                "content": [
                    {"type": "verse", "number": 1.0, "content": ["x"]},
                    {"type": "verse", "number": 0.0, "content": ["zero"]},
                    {"type": "verse", "number": -2.0, "content": ["negative"]},
                    {"type": "verse", "number": 1e12, "content": ["too large"]}
                ]
            }
        });
        assert_eq!(extract_verses(&doc), vec![VerseRecord::new(1, "x")]);

        let list = json!([{"v": 2.0, "text": "two"}]);
        assert_eq!(extract_verses(&list), vec![VerseRecord::new(2, "two")]);
    }

    #[test]
    fn chapter_without_content_yields_nothing() {
        assert!(extract_verses(&json!({"chapter": {"number": 1}})).is_empty());
        assert!(extract_verses(&json!({"chapter": null})).is_empty());
    }

    #[test]
    fn verse_list_alternate_keys() {
        let doc = json!([
            {"verse_number": 2, "content": ["two", "parts"]},
            {"v": "3", "text": "string number"},
            {"verse": 1, "text": "plain"},
            42
        ]);

        let verses = extract_verses(&doc);
        assert_eq!(
            verses,
            vec![
                VerseRecord::new(1, "plain"),
                VerseRecord::new(2, "two parts"),
                VerseRecord::new(3, "string number"),
            ]
        );
    }

    #[test]
    fn verses_key_object() {
        let doc = json!({
            "book": "GEN",
            "verses": [
                {"verse": 2, "text": "b"},
                {"verse": 1, "text": "a"},
                {"text": "missing number"}
            ]
        });
        assert_eq!(
            extract_verses(&doc),
            vec![VerseRecord::new(1, "a"), VerseRecord::new(2, "b")]
        );
    }

    #[test]
    fn chapter_key_takes_precedence_over_verses() {
        let doc = json!({
            "chapter": {"content": [{"type": "verse", "number": 1, "content": ["api"]}]},
            "verses": [{"verse": 1, "text": "list"}]
        });
        assert_eq!(extract_verses(&doc), vec![VerseRecord::new(1, "api")]);
    }

    #[test]
    fn already_converted_output_is_stable() {
        let converted = json!([
            {"verse": 1, "text": "起初，神創造天地。"},
            {"verse": 2, "text": "地是空虛混沌"}
        ]);
        let verses = extract_verses(&converted);
        assert_eq!(serde_json::to_value(&verses).unwrap(), converted);
    }

    #[test]
    fn unrecognised_shapes_yield_nothing() {
        assert!(extract_verses(&json!("text")).is_empty());
        assert!(extract_verses(&json!({"data": []})).is_empty());
        assert!(extract_verses(&json!({"verses": "nope"})).is_empty());
        assert!(extract_verses(&Value::Null).is_empty());
    }

    #[test]
    fn fixture_chapter_extracts() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/bsb_gen_1.fixture.json")
            .expect("read fixture");
        let doc: Value = serde_json::from_str(&fixture).expect("parse fixture");

        let verses = extract_verses(&doc);
        assert_eq!(numbers(&verses), vec![1, 2, 3]);
        assert_eq!(
            verses[0].text,
            "In the beginning God created the heavens and the earth."
        );
        assert_eq!(
            verses[2].text,
            "And God said, “Let there be light,” and there was light."
        );
    }

    #[test]
    fn fixture_cu1_chapter_extracts() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/cu1_jhn_1.fixture.json")
            .expect("read fixture");
        let doc: Value = serde_json::from_str(&fixture).expect("parse fixture");

        let verses = extract_verses(&doc);
        assert_eq!(numbers(&verses), vec![1, 2]);
        assert_eq!(verses[0].text, "太初有道，道與神同在，道就是神。");
    }
}
