//! Listing core: wire types and deterministic mock logic for the stay
//! capability provider. Used in-process by the client and over HTTP by
//! the listing tool server.

pub mod booking;
pub mod calendar;
pub mod search;

pub use booking::{BookingConfirmation, BookingRequest};
pub use calendar::{CalendarEventHandle, CalendarEventRequest};
pub use search::{ListingRecord, SearchQuery};

/// Tool names as exposed by the listing tool server.
pub const SEARCH_LISTINGS: &str = "search-listings";
pub const BOOK_LISTING: &str = "book-listing";
pub const CREATE_CALENDAR_EVENT: &str = "create-calendar-event";

/// Small stable hash used to derive mock identifiers (FNV-1a).
pub(crate) fn stable_hash(parts: &[&str]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for part in parts {
        for byte in part.bytes().chain(std::iter::once(b'|')) {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
    }
    hash
}
