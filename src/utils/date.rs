//! # Date Utilities
//!
//! Hour truncation (the booking granularity) and the pt-BR human-readable
//! date format used in notifications and cancellation emails.

use time::OffsetDateTime;

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Truncates a timestamp down to the top of its hour.
///
/// Two bookings inside the same hour map to the same slot, so `10:15` and
/// `10:45` both become `10:00`.
pub fn start_of_hour(date: OffsetDateTime) -> OffsetDateTime {
    date.replace_minute(0)
        .and_then(|d| d.replace_second(0))
        .and_then(|d| d.replace_nanosecond(0))
        .expect("zeroed time components are always in range")
}

/// Formats a timestamp as `dia {DD} de {mês}, às {H}:{MM}h`.
///
/// Example: `dia 01 de junho, às 10:00h`. Month names are Portuguese; the
/// hour keeps no leading zero, matching the message copy shown to users.
pub fn format_pt(date: OffsetDateTime) -> String {
    let month = MONTHS_PT[date.month() as usize - 1];
    format!(
        "dia {:02} de {}, às {}:{:02}h",
        date.day(),
        month,
        date.hour(),
        date.minute()
    )
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn truncates_to_hour_start() {
        let date = datetime!(2024-06-01 10:45:31.5 UTC);
        assert_eq!(start_of_hour(date), datetime!(2024-06-01 10:00:00 UTC));
    }

    #[test]
    fn truncation_is_idempotent() {
        let date = datetime!(2024-06-01 10:00:00 UTC);
        assert_eq!(start_of_hour(date), date);
    }

    #[test]
    fn formats_portuguese_dates() {
        assert_eq!(
            format_pt(datetime!(2024-06-01 10:00:00 UTC)),
            "dia 01 de junho, às 10:00h"
        );
        assert_eq!(
            format_pt(datetime!(2024-12-25 9:30:00 UTC)),
            "dia 25 de dezembro, às 9:30h"
        );
    }
}
