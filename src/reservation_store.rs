// Reservation store: one reservation per localizer and per identity number
use tracing::{info, warn};

use crate::error::{HotelManagementError, Result};
use crate::reservation::{Reservation, StoredReservation};
use crate::storage::RecordCollection;

pub struct ReservationStore {
    collection: Box<dyn RecordCollection<StoredReservation>>,
}

impl ReservationStore {
    pub fn new(collection: Box<dyn RecordCollection<StoredReservation>>) -> Self {
        Self { collection }
    }

    // Appends `reservation` and returns its localizer.
    pub fn create(&self, reservation: Reservation) -> Result<String> {
        let records = self.collection.load()?;

        for stored in &records {
            if stored.localizer() == Some(reservation.localizer()) {
                warn!(localizer = reservation.localizer(), "reservation already exists");
                return Err(HotelManagementError::DuplicateError(
                    "Reservation already exists".to_string(),
                ));
            }
            if stored.id_card() == Some(reservation.id_card()) {
                warn!(localizer = ?stored.localizer(), "id card already holds a reservation");
                return Err(HotelManagementError::DuplicateError(
                    "This ID card has another reservation".to_string(),
                ));
            }
        }

        let localizer = reservation.localizer().to_string();
        self.collection.append(StoredReservation::from(&reservation))?;
        info!(localizer = %localizer, "reservation stored");
        Ok(localizer)
    }

    // Returns the record as stored; callers decide whether to verify it.
    pub fn find_by_localizer(&self, localizer: &str) -> Result<StoredReservation> {
        self.collection
            .load()?
            .into_iter()
            .find(|stored| stored.localizer() == Some(localizer))
            .ok_or_else(|| {
                HotelManagementError::NotFoundError(format!("localizer {} not found", localizer))
            })
    }

    pub fn all(&self) -> Result<Vec<StoredReservation>> {
        self.collection.load()
    }
}
