//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{FirestoreDb, NewExpense, NewTask};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const FLATS: &str = "flats";
    /// Invite code reservations (keyed by code)
    pub const INVITE_CODES: &str = "invite_codes";
    /// Subcollection of `flats/{id}`
    pub const TASKS: &str = "tasks";
    /// Subcollection of `flats/{id}`
    pub const ROTATIONS: &str = "rotations";
    /// Subcollection of `flats/{id}`
    pub const EXPENSES: &str = "expenses";
}
