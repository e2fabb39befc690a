// Checkout store and the checkout transition
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HotelManagementError, Result};
use crate::stay_store::StayStore;
use crate::storage::RecordCollection;
use crate::validation::Field;

// Records that the guest holding `room_key` has left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMarker {
    pub room_key: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub checkout_time: DateTime<Utc>,
}

pub struct CheckoutStore {
    collection: Box<dyn RecordCollection<CheckoutMarker>>,
}

impl CheckoutStore {
    pub fn new(collection: Box<dyn RecordCollection<CheckoutMarker>>) -> Self {
        Self { collection }
    }

    // Allowed on the departure day, and only once.
    pub fn check_out(&self, stays: &StayStore, room_key: &str, now: DateTime<Utc>) -> Result<bool> {
        let room_key = Field::RoomKey.validate(room_key)?;
        let stay = stays.find_by_room_key(&room_key)?;

        let today = now.date_naive();
        if stay.departure_date() != today {
            return Err(HotelManagementError::StateError(format!(
                "not departure day: departure is {}, today is {}",
                stay.departure_date(),
                today
            )));
        }

        let markers = self.collection.load()?;
        if markers.iter().any(|marker| marker.room_key == room_key) {
            warn!(room_key = %room_key, "checkout rejected: already checked out");
            return Err(HotelManagementError::DuplicateError(
                "already checked out".to_string(),
            ));
        }

        self.collection.append(CheckoutMarker {
            room_key: room_key.clone(),
            checkout_time: now,
        })?;
        info!(room_key = %room_key, "guest checked out");
        Ok(true)
    }

    pub fn find_by_room_key(&self, room_key: &str) -> Result<Option<CheckoutMarker>> {
        Ok(self
            .collection
            .load()?
            .into_iter()
            .find(|marker| marker.room_key == room_key))
    }
}
