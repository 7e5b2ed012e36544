//! Phone number normalisation into the registry's `+CC.NNNN` form.

use crate::traits::PhoneFormatter;

/// Cleans `number` and formats it through `formatter`.
///
/// Everything but digits, `+` and `.` is dropped, leading zeros are removed from numbers
/// without a `+`, and a run of leading `+` is collapsed to one.
pub fn format_phone(formatter: &dyn PhoneFormatter, number: &str, country: &str) -> String {
    let cleaned: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '.'))
        .collect();
    let cleaned = if cleaned.starts_with('+') {
        cleaned
    } else {
        cleaned.trim_start_matches('0').to_string()
    };
    if cleaned.is_empty() {
        return cleaned;
    }

    let formatted = formatter.format(&cleaned, country);
    let digits = formatted.trim_start_matches('+');
    if digits.len() == formatted.len() {
        formatted
    } else {
        format!("+{digits}")
    }
}

/// Country calling codes keyed by ISO 3166 alpha-2 code.
const CALLING_CODES: &[(&str, &str)] = &[
    ("GB", "44"),
    ("UK", "44"),
    ("IM", "44"),
    ("JE", "44"),
    ("GG", "44"),
    ("IE", "353"),
    ("US", "1"),
    ("CA", "1"),
    ("FR", "33"),
    ("DE", "49"),
    ("ES", "34"),
    ("IT", "39"),
    ("NL", "31"),
    ("BE", "32"),
    ("LU", "352"),
    ("CH", "41"),
    ("AT", "43"),
    ("DK", "45"),
    ("SE", "46"),
    ("NO", "47"),
    ("FI", "358"),
    ("IS", "354"),
    ("PL", "48"),
    ("PT", "351"),
    ("GR", "30"),
    ("CZ", "420"),
    ("HU", "36"),
    ("RO", "40"),
    ("AU", "61"),
    ("NZ", "64"),
    ("IN", "91"),
    ("CN", "86"),
    ("HK", "852"),
    ("JP", "81"),
    ("SG", "65"),
    ("ZA", "27"),
    ("AE", "971"),
    ("IL", "972"),
    ("BR", "55"),
    ("MX", "52"),
];

/// Table-driven [`PhoneFormatter`].
///
/// National numbers get the country's calling code; numbers already starting with `+`
/// are split after the longest known calling code that prefixes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedPhoneFormatter;

impl DottedPhoneFormatter {
    pub fn calling_code(country: &str) -> Option<&'static str> {
        let country = country.trim().to_ascii_uppercase();
        CALLING_CODES
            .iter()
            .find(|(code, _)| *code == country)
            .map(|(_, calling)| *calling)
    }
}

impl PhoneFormatter for DottedPhoneFormatter {
    fn format(&self, number: &str, country: &str) -> String {
        if let Some(international) = number.strip_prefix('+') {
            let international = international.trim_start_matches('+');
            if international.contains('.') {
                return format!("+{international}");
            }
            let prefix = CALLING_CODES
                .iter()
                .map(|(_, calling)| *calling)
                .filter(|calling| international.starts_with(calling))
                .max_by_key(|calling| calling.len());
            return match prefix {
                Some(calling) => format!("+{calling}.{}", &international[calling.len()..]),
                None => format!("+{international}"),
            };
        }

        let national: String = number.chars().filter(char::is_ascii_digit).collect();
        match Self::calling_code(country) {
            Some(calling) => format!("+{calling}.{national}"),
            None => national,
        }
    }
}
