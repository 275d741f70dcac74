//! Tests for ledger record encoding and decoding
//!
//! These tests verify:
//! - The fixed 136-byte little-endian layout
//! - Field truncation and NUL padding
//! - Corrupt record detection
//! - The 32-byte legacy layout

use bookledger::ledger::{
    Action, LedgerEvent, LedgerFormat, ISBN_WIDTH, LEGACY_RECORD_SIZE, RECORD_SIZE, TITLE_WIDTH,
};
use bookledger::LibraryError;

// =============================================================================
// Helper Functions
// =============================================================================

fn legacy_record(isbn: &str, quantity: i32, timestamp: i64) -> Vec<u8> {
    let mut record = vec![0u8; LEGACY_RECORD_SIZE];
    record[..isbn.len()].copy_from_slice(isbn.as_bytes());
    record[20..24].copy_from_slice(&quantity.to_le_bytes());
    record[24..32].copy_from_slice(&timestamp.to_le_bytes());
    record
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_record_sizes() {
    assert_eq!(RECORD_SIZE, 136);
    assert_eq!(LEGACY_RECORD_SIZE, 32);
    assert_eq!(LedgerFormat::Current.record_size(), RECORD_SIZE);
    assert_eq!(LedgerFormat::Legacy.record_size(), LEGACY_RECORD_SIZE);
}

#[test]
fn test_encode_field_offsets() {
    let event = LedgerEvent::new(Action::Return, "978-0", "Dune", 3).with_timestamp(1_700_000_000);

    let bytes = event.encode().unwrap();

    assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
    assert_eq!(&bytes[4..9], b"978-0");
    assert!(bytes[9..24].iter().all(|b| *b == 0));
    assert_eq!(&bytes[24..28], b"Dune");
    assert!(bytes[28..124].iter().all(|b| *b == 0));
    assert_eq!(&bytes[124..128], &3i32.to_le_bytes());
    assert_eq!(&bytes[128..136], &1_700_000_000i64.to_le_bytes());
}

#[test]
fn test_action_codes() {
    assert_eq!(Action::Loan.code(), 1);
    assert_eq!(Action::Return.code(), 2);
    assert_eq!(Action::from_code(1), Some(Action::Loan));
    assert_eq!(Action::from_code(2), Some(Action::Return));
    assert_eq!(Action::from_code(0), None);
    assert_eq!(Action::from_code(3), None);
}

#[test]
fn test_encode_decode_preserves_event() {
    let event = LedgerEvent::new(Action::Loan, "111", "C Programming", 2).with_timestamp(-5);

    let decoded = LedgerEvent::decode(&event.encode().unwrap()).unwrap();

    assert_eq!(decoded, event);
}

#[test]
fn test_new_event_is_stamped_now() {
    let before = chrono::Utc::now().timestamp();
    let event = LedgerEvent::new(Action::Loan, "1", "T", 1);
    let after = chrono::Utc::now().timestamp();

    assert!(event.timestamp >= before && event.timestamp <= after);
}

// =============================================================================
// Field Limit Tests
// =============================================================================

#[test]
fn test_long_title_is_truncated_with_terminator() {
    let title = "x".repeat(250);
    let event = LedgerEvent::new(Action::Loan, "1", title, 1);

    let bytes = event.encode().unwrap();
    assert_eq!(bytes[24 + TITLE_WIDTH - 1], 0);

    let decoded = LedgerEvent::decode(&bytes).unwrap();
    assert_eq!(decoded.title.len(), TITLE_WIDTH - 1);
}

#[test]
fn test_title_truncation_respects_char_boundaries() {
    let title = "é".repeat(60);
    let event = LedgerEvent::new(Action::Loan, "1", title, 1);

    let decoded = LedgerEvent::decode(&event.encode().unwrap()).unwrap();

    assert_eq!(decoded.title, "é".repeat(49));
}

#[test]
fn test_isbn_must_fit_field() {
    let fits = "9".repeat(ISBN_WIDTH - 1);
    let too_long = "9".repeat(ISBN_WIDTH);

    assert!(LedgerEvent::new(Action::Loan, fits, "T", 1).encode().is_ok());
    assert!(matches!(
        LedgerEvent::new(Action::Loan, too_long, "T", 1).encode(),
        Err(LibraryError::InvalidArgument(_))
    ));
    assert!(LedgerEvent::new(Action::Loan, "", "T", 1).encode().is_err());
}

#[test]
fn test_quantity_must_be_positive_and_fit() {
    assert!(LedgerEvent::new(Action::Loan, "1", "T", 0).encode().is_err());
    assert!(LedgerEvent::new(Action::Loan, "1", "T", i32::MAX as u32).encode().is_ok());
    assert!(LedgerEvent::new(Action::Loan, "1", "T", i32::MAX as u32 + 1)
        .encode()
        .is_err());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_decode_wrong_length() {
    let bytes = LedgerEvent::new(Action::Loan, "1", "T", 1).encode().unwrap();

    assert!(matches!(
        LedgerEvent::decode(&bytes[..RECORD_SIZE - 1]),
        Err(LibraryError::CorruptRecord(_))
    ));
    assert!(LedgerEvent::decode(&[]).is_err());
}

#[test]
fn test_decode_unknown_action() {
    let mut bytes = LedgerEvent::new(Action::Loan, "1", "T", 1).encode().unwrap();
    bytes[0..4].copy_from_slice(&7i32.to_le_bytes());

    assert!(matches!(
        LedgerEvent::decode(&bytes),
        Err(LibraryError::CorruptRecord(_))
    ));
}

#[test]
fn test_decode_non_positive_quantity() {
    let mut bytes = LedgerEvent::new(Action::Loan, "1", "T", 1).encode().unwrap();

    bytes[124..128].copy_from_slice(&0i32.to_le_bytes());
    assert!(LedgerEvent::decode(&bytes).is_err());

    bytes[124..128].copy_from_slice(&(-3i32).to_le_bytes());
    assert!(LedgerEvent::decode(&bytes).is_err());
}

#[test]
fn test_decode_unterminated_isbn_uses_whole_field() {
    let mut bytes = LedgerEvent::new(Action::Loan, "1", "T", 1).encode().unwrap();
    bytes[4..24].copy_from_slice(&[b'7'; 20]);

    let decoded = LedgerEvent::decode(&bytes).unwrap();

    assert_eq!(decoded.isbn, "7".repeat(20));
}

// =============================================================================
// Legacy Format Tests
// =============================================================================

#[test]
fn test_decode_legacy_is_always_a_loan() {
    let event = LedgerEvent::decode_legacy(&legacy_record("ABC", 4, 99)).unwrap();

    assert_eq!(event.action, Action::Loan);
    assert_eq!(event.isbn, "ABC");
    assert_eq!(event.title, "");
    assert_eq!(event.quantity, 4);
    assert_eq!(event.timestamp, 99);
}

#[test]
fn test_decode_legacy_via_format() {
    let event = LedgerFormat::Legacy.decode(&legacy_record("X", 1, 0)).unwrap();
    assert_eq!(event.isbn, "X");

    assert!(LedgerFormat::Current.decode(&legacy_record("X", 1, 0)).is_err());
}

#[test]
fn test_decode_legacy_rejects_bad_quantity() {
    assert!(matches!(
        LedgerEvent::decode_legacy(&legacy_record("X", 0, 0)),
        Err(LibraryError::CorruptRecord(_))
    ));
}
