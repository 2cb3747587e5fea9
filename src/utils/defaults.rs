//! Ready-made default producers for `default_with`.

use time::OffsetDateTime;
use uuid::Uuid;

use super::time::unix_seconds;

/// A 50-character, time-ordered id: zero-padded epoch milliseconds, a random
/// UUID in simple form, then `000`.
pub fn next_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("{:015}{}000", millis, Uuid::new_v4().simple())
}

/// Current time as float seconds since the epoch.
pub fn now() -> f64 {
    unix_seconds(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_fixed_width_and_unique() {
        let first = next_id();
        let second = next_id();

        assert_eq!(first.len(), 50);
        assert!(first.ends_with("000"));
        assert!(first[..15].chars().all(|c| c.is_ascii_digit()));
        assert_ne!(first, second);
    }

    #[test]
    fn ids_sort_by_creation_time() {
        let earlier = next_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = next_id();
        assert!(earlier[..15] < later[..15]);
    }

    #[test]
    fn now_is_after_2020() {
        assert!(now() > 1_577_836_800.0);
    }
}
