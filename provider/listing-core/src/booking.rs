use serde::{Deserialize, Serialize};

use crate::stable_hash;

/// Booking arguments. Field names match the tool input schema exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub listing_url: String,
    pub date_from: String,
    pub date_to: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub status: String,
    pub confirmation_code: String,
    /// Human readable confirmation text
    pub message: String,
}

/// Mock booking. Always confirms; identifiers are derived from the request
/// so the same request yields the same confirmation.
pub fn handle(req: &BookingRequest) -> BookingConfirmation {
    let adults = req.adults.to_string();
    let children = req.children.to_string();
    let hash = stable_hash(&[
        &req.listing_url,
        &req.date_from,
        &req.date_to,
        &adults,
        &children,
    ]);

    BookingConfirmation {
        booking_id: format!("BK{:08X}", hash),
        status: "confirmed".to_string(),
        confirmation_code: format!("CONF{:06X}", hash & 0x00ff_ffff),
        message: format!(
            "Successfully booked {} from {} to {} for {} adults and {} children.",
            req.listing_url, req.date_from, req.date_to, req.adults, req.children
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> BookingRequest {
        BookingRequest {
            listing_url: url.to_string(),
            date_from: "2025-06-01".to_string(),
            date_to: "2025-06-05".to_string(),
            adults: 2,
            children: 1,
        }
    }

    #[test]
    fn test_booking_is_deterministic() {
        let first = handle(&request("https://stays.example.com/rooms/1"));
        let second = handle(&request("https://stays.example.com/rooms/1"));
        assert_eq!(first, second);
        assert_eq!(first.status, "confirmed");
        assert!(first.booking_id.starts_with("BK"));
        assert!(first.confirmation_code.starts_with("CONF"));
    }

    #[test]
    fn test_different_listings_get_different_codes() {
        let a = handle(&request("https://stays.example.com/rooms/1"));
        let b = handle(&request("https://stays.example.com/rooms/2"));
        assert_ne!(a.booking_id, b.booking_id);
    }
}
