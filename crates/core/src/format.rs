//! Display formatting for raw SWAPI attribute strings.
//!
//! SWAPI reports measurements as free-form strings. These helpers render the
//! numeric ones and pass anything unrecognized through untouched.

use chrono::DateTime;

const UNKNOWN: &str = "unknown";

/// Render an RFC 3339 timestamp as `DD-MM-YYYY`.
///
/// ```
/// use holocron_core::format::format_date;
///
/// assert_eq!(format_date("2014-12-09T13:50:51.644000Z"), "09-12-2014");
/// assert_eq!(format_date("a long time ago"), "a long time ago");
/// ```
#[must_use]
pub fn format_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp).map_or_else(
        |_| timestamp.to_owned(),
        |date| date.format("%d-%m-%Y").to_string(),
    )
}

/// Render a height in centimetres as metres with two decimals.
#[must_use]
pub fn format_height(height: &str) -> String {
    height.trim().parse::<f64>().map_or_else(
        |_| height.to_owned(),
        |cm| format!("{:.2} m", cm / 100.0),
    )
}

/// Append the unit to a known mass.
#[must_use]
pub fn format_mass(mass: &str) -> String {
    if mass == UNKNOWN {
        return mass.to_owned();
    }
    format!("{mass} kg")
}

/// Group a numeric population into thousands.
///
/// ```
/// use holocron_core::format::format_population;
///
/// assert_eq!(format_population("200000"), "200,000");
/// assert_eq!(format_population("unknown"), "unknown");
/// ```
#[must_use]
pub fn format_population(population: &str) -> String {
    if population == UNKNOWN {
        return population.to_owned();
    }
    population
        .parse::<u64>()
        .map_or_else(|_| population.to_owned(), group_thousands)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
