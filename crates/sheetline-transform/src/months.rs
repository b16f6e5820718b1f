//! Month names accepted in `<day> <month> <year>` text.

use chrono::Month;

/// Indonesian month names and abbreviations, plus the English spellings that
/// commonly show up in the same exports.
const MONTH_NAMES: &[(&str, Month)] = &[
    ("jan", Month::January),
    ("januari", Month::January),
    ("january", Month::January),
    ("feb", Month::February),
    ("februari", Month::February),
    ("february", Month::February),
    ("mar", Month::March),
    ("maret", Month::March),
    ("march", Month::March),
    ("apr", Month::April),
    ("april", Month::April),
    ("mei", Month::May),
    ("may", Month::May),
    ("jun", Month::June),
    ("juni", Month::June),
    ("june", Month::June),
    ("jul", Month::July),
    ("juli", Month::July),
    ("july", Month::July),
    ("agu", Month::August),
    ("agt", Month::August),
    ("agustus", Month::August),
    ("aug", Month::August),
    ("august", Month::August),
    ("sep", Month::September),
    ("sept", Month::September),
    ("september", Month::September),
    ("okt", Month::October),
    ("oktober", Month::October),
    ("oct", Month::October),
    ("october", Month::October),
    ("nov", Month::November),
    ("nopember", Month::November),
    ("november", Month::November),
    ("des", Month::December),
    ("desember", Month::December),
    ("dec", Month::December),
    ("december", Month::December),
];

/// Look up a month by name, ignoring case and a trailing period ("Agu.").
pub fn month_from_name(name: &str) -> Option<Month> {
    let name = name.trim().trim_end_matches('.');
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, month)| *month)
}
