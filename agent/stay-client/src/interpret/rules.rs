/// Rule-based interpreter
/// Deterministic, offline extraction with regular expressions. Used when no
/// LLM is configured and throughout the tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde_json::{json, Value};

use super::{mentions_refine, ExtractionError, KnownFields, Schema, StructuredInterpreter};

const NUMBER: &str = r"(\d+|one|two|three|four|five|six|seven|eight|nine|ten|a|an)";
const CHOICE_NUMBER: &str = r"(\d+|one|two|three|four|five|six|seven|eight|nine|ten)";

lazy_static::lazy_static! {
    static ref ISO_DATE: Regex = Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").unwrap();
    static ref CITY: Regex = Regex::new(
        r"\b(?:[Ii]n|[Tt]o|[Aa]t|[Nn]ear|[Vv]isit|[Vv]isiting)\s+([A-Z][\p{L}'.-]*(?:\s+[A-Z][\p{L}'.-]*)*)"
    ).unwrap();
    static ref ADULTS: Regex = Regex::new(&format!(r"(?i)\b{}\s+(?:adults?|grown-?ups?)\b", NUMBER)).unwrap();
    static ref CHILDREN: Regex = Regex::new(&format!(r"(?i)\b{}\s+(?:children|child|kids?)\b", NUMBER)).unwrap();
    static ref NO_CHILDREN: Regex = Regex::new(r"(?i)\bno\s+(?:children|kids)\b").unwrap();
    static ref PEOPLE: Regex = Regex::new(&format!(r"(?i)\b{}\s+(?:people|persons|guests|travell?ers)\b", NUMBER)).unwrap();
    static ref SOLO: Regex = Regex::new(r"(?i)\b(?:just me|solo|by myself|alone)\b").unwrap();

    // selection forms, most explicit first
    static ref CHOICE_LABELLED: Regex = Regex::new(
        &format!(r"(?i)(?:\boption|\bnumber|\bno\.|#)\s*{}\b", CHOICE_NUMBER)
    ).unwrap();
    static ref CHOICE_ORDINAL: Regex = Regex::new(
        r"(?i)\b(\d+)(?:st|nd|rd|th)\b|\b(first|second|third|fourth|fifth)\b"
    ).unwrap();
    static ref CHOICE_VERB: Regex = Regex::new(
        &format!(r"(?i)\b(?:take|book|choose|pick|select|prefer|with)\s+(?:the\s+|listing\s+)?{}\b", CHOICE_NUMBER)
    ).unwrap();
    static ref CHOICE_BARE: Regex = Regex::new(&format!(r"(?i)^\W*{}\W*$", CHOICE_NUMBER)).unwrap();
    static ref PARTY_NOUN: Regex = Regex::new(
        r"(?i)^\s*(?:adults?|grown-?ups?|children|child|kids?|people|persons|guests|travell?ers|nights?|days?)\b"
    ).unwrap();
}

/// Capitalised words that follow "in"/"to" but are not places
const NOT_A_PLACE: [&str; 22] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "Saturday", "Sunday", "I", "I'm", "I'd",
];

const CHECK_IN_CUES: [&str; 9] = [
    "from", "in", "arriving", "arrive", "arrival", "checkin", "check-in", "starting", "start",
];
const CHECK_OUT_CUES: [&str; 12] = [
    "to", "until", "till", "til", "through", "thru", "out", "checkout", "check-out", "leaving",
    "departing", "returning",
];
const FILLER: [&str; 3] = ["on", "the", "of"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateCue {
    CheckIn,
    CheckOut,
    Unmarked,
}

fn word_to_number(word: &str) -> Option<u32> {
    let lowered = word.to_lowercase();
    let n = match lowered.as_str() {
        "a" | "an" | "one" | "first" => 1,
        "two" | "second" => 2,
        "three" | "third" => 3,
        "four" | "fourth" => 4,
        "five" | "fifth" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => return digits.parse().ok(),
    };
    Some(n)
}

fn count(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| word_to_number(m.as_str()))
}

/// Cue carried by the nearest meaningful word before a date
fn cue_before(prefix: &str) -> DateCue {
    let word = prefix
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':' || c == ';')
        .rev()
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .find(|w| !FILLER.contains(&w.as_str()));

    match word.as_deref() {
        Some(w) if CHECK_OUT_CUES.contains(&w) => DateCue::CheckOut,
        Some(w) if CHECK_IN_CUES.contains(&w) => DateCue::CheckIn,
        _ => DateCue::Unmarked,
    }
}

fn calendar_date(caps: &Captures) -> Option<NaiveDate> {
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Valid dates in order of appearance, normalised to YYYY-MM-DD
fn dates(text: &str) -> Vec<(DateCue, String)> {
    let mut found = Vec::new();
    let mut last_end = 0;
    for caps in ISO_DATE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let prefix = &text[last_end..whole.start()];
        last_end = whole.end();

        if let Some(date) = calendar_date(&caps) {
            found.push((cue_before(prefix), date.format("%Y-%m-%d").to_string()));
        }
    }
    found
}

/// Assign the dates of one utterance to check-in and check-out. Cue words
/// win; a lone unmarked date answers whichever date is still missing.
fn trip_dates(text: &str, known: KnownFields) -> (Option<String>, Option<String>) {
    let mut date_from = None;
    let mut date_to = None;
    let mut unmarked = Vec::new();

    for (cue, date) in dates(text) {
        match cue {
            DateCue::CheckIn if date_from.is_none() => date_from = Some(date),
            DateCue::CheckOut if date_to.is_none() => date_to = Some(date),
            _ => unmarked.push(date),
        }
    }

    match unmarked.as_slice() {
        [only] if date_from.is_none() && date_to.is_none() && known.awaiting_check_out() => {
            date_to = Some(only.clone());
        }
        _ => {
            for date in unmarked {
                if date_from.is_none() {
                    date_from = Some(date);
                } else if date_to.is_none() {
                    date_to = Some(date);
                }
            }
        }
    }

    // a range given backwards in one breath
    let backwards = matches!((&date_from, &date_to), (Some(from), Some(to)) if from > to);
    if backwards {
        std::mem::swap(&mut date_from, &mut date_to);
    }

    (date_from, date_to)
}

fn city(text: &str) -> Option<String> {
    CITY.captures_iter(text).find_map(|caps| {
        let raw = caps.get(1)?.as_str();
        // stop at the end of the sentence
        let end = raw
            .char_indices()
            .find(|&(i, c)| c == '.' && raw[i + 1..].starts_with(char::is_whitespace))
            .map(|(i, _)| i)
            .unwrap_or(raw.len());

        let words: Vec<&str> = raw[..end]
            .split_whitespace()
            .take_while(|word| !NOT_A_PLACE.contains(word))
            .collect();
        if words.is_empty() {
            None
        } else {
            Some(words.join(" ").trim_end_matches(['.', ',']).to_string())
        }
    })
}

fn preferences(text: &str, known: KnownFields) -> Value {
    let (date_from, date_to) = trip_dates(text, known);
    let adults = count(&ADULTS, text)
        .or_else(|| count(&PEOPLE, text))
        .or_else(|| SOLO.is_match(text).then_some(1));
    let children = if NO_CHILDREN.is_match(text) {
        Some(0)
    } else {
        count(&CHILDREN, text)
    };

    json!({
        "city": city(text),
        "date_from": date_from,
        "date_to": date_to,
        "adults": adults,
        "children": children,
    })
}

fn selected_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures_iter(text).find_map(|caps| {
        let m = caps.iter().skip(1).flatten().next()?;
        if PARTY_NOUN.is_match(&text[m.end()..]) {
            return None;
        }
        word_to_number(m.as_str())
    })
}

/// Listing number the text picks, if it clearly picks one
fn choice(text: &str) -> Option<u32> {
    if mentions_refine(text) {
        return None;
    }
    [&*CHOICE_LABELLED, &*CHOICE_ORDINAL, &*CHOICE_VERB, &*CHOICE_BARE]
        .into_iter()
        .find_map(|re| selected_number(re, text))
}

/// Interpreter backed by regular expressions
#[derive(Debug, Default, Clone)]
pub struct RuleInterpreter;

impl RuleInterpreter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StructuredInterpreter for RuleInterpreter {
    async fn interpret(&self, schema: Schema, text: &str) -> Result<Value, ExtractionError> {
        match schema {
            Schema::Preferences { known } => Ok(preferences(text, known)),
            Schema::Choice { .. } => choice(text)
                .map(|choice| json!({ "choice": choice }))
                .ok_or(ExtractionError::NoValue("choice")),
        }
    }
}
