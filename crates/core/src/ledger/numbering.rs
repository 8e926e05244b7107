//! Voucher numbering (spec 3: `voucher_no` format `V<YYYYMMDD><3-digit
//! seq>`, assigned at first confirmation, never reused).

use chrono::NaiveDate;

/// Formats a voucher number from a posting date and a per-day sequence
/// number.
///
/// `seq` is 1-based and is expected to come from a per-day monotonic
/// counter maintained by the repository layer (e.g. `select count(*) + 1
/// from vouchers where voucher_no like 'V20250115%' for update`, or a
/// dedicated sequence table) — this function only knows how to format an
/// already-allocated sequence number, so numbering stays gap-free and
/// collision-free under concurrent confirmation (spec 5: confirm takes a
/// row lock).
///
/// # Panics
///
/// Panics if `seq` is zero or exceeds 999 — a single calendar day cannot
/// produce a fourth digit under this format; callers should treat
/// exhaustion as an operational condition to alert on, not a silent
/// rollover.
#[must_use]
pub fn format_voucher_no(date: NaiveDate, seq: u32) -> String {
    assert!((1..=999).contains(&seq), "voucher sequence out of range: {seq}");
    format!("V{}{seq:03}", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_expected_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(format_voucher_no(date, 1), "V20250115001");
        assert_eq!(format_voucher_no(date, 42), "V20250115042");
        assert_eq!(format_voucher_no(date, 999), "V20250115999");
    }

    #[test]
    #[should_panic(expected = "voucher sequence out of range")]
    fn rejects_zero_sequence() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        format_voucher_no(date, 0);
    }

    #[test]
    #[should_panic(expected = "voucher sequence out of range")]
    fn rejects_overflow_sequence() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        format_voucher_no(date, 1000);
    }
}
