use chrono::{Datelike, NaiveDate};

/// Whether two users may be paired, given their ages.
///
/// Minors only pair within a one-year band keyed by the younger member,
/// so same-grade friendships survive a birthday gap; the band never
/// crosses into adulthood except for the 17/18 bridge. Adults pair
/// freely with adults.
///
/// Symmetric in its arguments. Ages at or below zero fall into the
/// most restrictive band.
pub fn allowed_pairing(age_a: i32, age_b: i32) -> bool {
    let (younger, older) = if age_a <= age_b { (age_a, age_b) } else { (age_b, age_a) };

    if younger >= 18 {
        return true;
    }

    let cap = match younger {
        15 => 16,
        16 => 17,
        17 => 18,
        _ => 15, // 14 and under, including clamped invalid ages
    };

    older <= cap
}

/// Age in whole years on `today`, not counting a birthday that has not
/// happened yet this year. Never negative.
pub fn age_from_birthdate(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age.max(0)
}

/// A user with no stored birthdate is treated as age zero, which lands
/// in the most restrictive band.
pub fn age_or_zero(birthdate: Option<NaiveDate>, today: NaiveDate) -> i32 {
    birthdate.map(|b| age_from_birthdate(b, today)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pairing_is_symmetric() {
        for a in -2..=25 {
            for b in -2..=25 {
                assert_eq!(
                    allowed_pairing(a, b),
                    allowed_pairing(b, a),
                    "asymmetric at ({a}, {b})"
                );
            }
        }
    }

    #[test]
    fn band_boundaries() {
        assert!(allowed_pairing(14, 15));
        assert!(!allowed_pairing(14, 16));
        assert!(allowed_pairing(15, 16));
        assert!(!allowed_pairing(15, 17));
        assert!(allowed_pairing(16, 17));
        assert!(!allowed_pairing(16, 18));
        assert!(allowed_pairing(17, 18));
        assert!(!allowed_pairing(17, 19));
    }

    #[test]
    fn adults_pair_freely() {
        assert!(allowed_pairing(18, 18));
        assert!(allowed_pairing(18, 99));
        assert!(allowed_pairing(45, 19));
    }

    #[test]
    fn young_and_invalid_ages_use_the_most_restrictive_band() {
        assert!(allowed_pairing(8, 12));
        assert!(allowed_pairing(0, 15));
        assert!(!allowed_pairing(0, 16));
        assert!(allowed_pairing(-3, 14));
        assert!(!allowed_pairing(-3, 16));
    }

    #[test]
    fn age_counts_only_completed_years() {
        let today = date(2026, 8, 7);
        assert_eq!(age_from_birthdate(date(2008, 8, 7), today), 18);
        assert_eq!(age_from_birthdate(date(2008, 8, 8), today), 17);
        assert_eq!(age_from_birthdate(date(2008, 12, 31), today), 17);
        assert_eq!(age_from_birthdate(date(2008, 1, 1), today), 18);
    }

    #[test]
    fn age_never_goes_negative() {
        let today = date(2026, 8, 7);
        assert_eq!(age_from_birthdate(date(2030, 1, 1), today), 0);
        assert_eq!(age_or_zero(None, today), 0);
    }
}
