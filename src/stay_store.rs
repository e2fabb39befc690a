// Stay store and the check-in transition
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{HotelManagementError, Result};
use crate::reservation_store::ReservationStore;
use crate::stay::Stay;
use crate::storage::RecordCollection;
use crate::validation::Field;

pub struct StayStore {
    collection: Box<dyn RecordCollection<Stay>>,
}

impl StayStore {
    pub fn new(collection: Box<dyn RecordCollection<Stay>>) -> Self {
        Self { collection }
    }

    // Checks a guest in against their reservation and returns the room key.
    // Every check runs before the stay is appended, so a rejected check-in
    // leaves the store untouched.
    pub fn check_in(
        &self,
        reservations: &ReservationStore,
        localizer: &str,
        id_card: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let id_card = Field::IdCard.validate(id_card)?;
        let localizer = Field::Localizer.validate(localizer)?;

        let stored = reservations.find_by_localizer(&localizer)?;
        if stored.id_card() != Some(id_card.as_str()) {
            warn!(localizer = %localizer, "check-in rejected: identity mismatch");
            return Err(HotelManagementError::IntegrityError(
                "identity mismatch: localizer is not correct for this IdCard".to_string(),
            ));
        }

        let reservation = match stored.verify() {
            Ok(reservation) => reservation,
            Err(e) => {
                warn!(localizer = %localizer, "check-in rejected: record manipulated");
                return Err(e);
            }
        };

        let today = now.date_naive();
        if reservation.arrival_date() != today {
            return Err(HotelManagementError::StateError(format!(
                "not arrival day: arrival is {}, today is {}",
                reservation.arrival_date(),
                today
            )));
        }

        let stay = Stay::new(&reservation, now)?;

        let records = self.collection.load()?;
        if records
            .iter()
            .any(|stored| stored.room_key() == stay.room_key() || stored.localizer() == localizer)
        {
            warn!(localizer = %localizer, "check-in rejected: already checked in");
            return Err(HotelManagementError::DuplicateError(
                "already checked in".to_string(),
            ));
        }

        let room_key = stay.room_key().to_string();
        let departure_date = stay.departure_date();
        self.collection.append(stay)?;
        info!(localizer = %localizer, room_key = %room_key, %departure_date, "guest checked in");
        Ok(room_key)
    }

    pub fn find_by_room_key(&self, room_key: &str) -> Result<Stay> {
        self.collection
            .load()?
            .into_iter()
            .find(|stay| stay.room_key() == room_key)
            .ok_or_else(|| {
                HotelManagementError::NotFoundError(format!("room key {} not found", room_key))
            })
    }

    pub fn all(&self) -> Result<Vec<Stay>> {
        self.collection.load()
    }
}
