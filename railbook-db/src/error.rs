//! Error taxonomy for the booking data layer.
//!
//! Validation failures are caught before persistence; constraint collisions
//! are detected by the storage engine and mapped onto domain variants so a
//! client can distinguish "fix your input" from "seat race lost, retry with
//! another seat".

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed entity state, rejected before any row is written.
    #[error("validation failed on {field}: {message}")]
    Validation { field: String, message: String },

    /// A storage-level unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Seat index outside [1, places_in_cargo] for the journey's train.
    #[error("seat {seat} must be in range [1, {max}]")]
    SeatOutOfRange { seat: i32, max: i32 },

    /// The (cargo, seat, journey) slot is already claimed by another ticket.
    #[error("seat {seat} in cargo {cargo} is already taken")]
    SeatTaken { cargo: i32, seat: i32 },

    /// An order must carry at least one ticket.
    #[error("an order must contain at least one ticket")]
    EmptyOrder,

    /// Booking against a journey whose train reference was nullified.
    #[error("journey {journey_id} has no train assigned")]
    NoTrainAssigned { journey_id: i32 },

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[source] DieselError),
}

impl LedgerError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Maps a unique-violation on the (cargo, seat, journey) constraint onto
    /// `SeatTaken`; the losing transaction of a seat race ends up here.
    pub fn seat_conflict(err: DieselError, cargo: i32, seat: i32) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                LedgerError::SeatTaken { cargo, seat }
            }
            other => other.into(),
        }
    }
}

impl From<DieselError> for LedgerError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => LedgerError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                LedgerError::UniqueViolation(info.message().to_string())
            }
            other => LedgerError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LedgerError::validation("source", "source and destination must differ");
        assert_eq!(
            err.to_string(),
            "validation failed on source: source and destination must differ"
        );

        let err = LedgerError::SeatOutOfRange { seat: 51, max: 50 };
        assert_eq!(err.to_string(), "seat 51 must be in range [1, 50]");

        let err = LedgerError::SeatTaken { cargo: 1, seat: 1 };
        assert_eq!(err.to_string(), "seat 1 in cargo 1 is already taken");

        let err = LedgerError::EmptyOrder;
        assert_eq!(err.to_string(), "an order must contain at least one ticket");
    }

    #[test]
    fn not_found_maps_to_domain_variant() {
        let err: LedgerError = DieselError::NotFound.into();
        assert!(matches!(err, LedgerError::NotFound));
    }

    #[test]
    fn seat_conflict_only_rewrites_unique_violations() {
        let err = LedgerError::seat_conflict(DieselError::NotFound, 2, 3);
        assert!(matches!(err, LedgerError::NotFound));
    }
}
