// Hotel manager: the public entry point for reservations, check-in and checkout
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::checkout_store::{CheckoutMarker, CheckoutStore};
use crate::config::HotelConfig;
use crate::error::{HotelManagementError, Result};
use crate::reservation::{Reservation, ReservationRequest, StoredReservation};
use crate::reservation_store::ReservationStore;
use crate::stay::Stay;
use crate::stay_store::StayStore;
use crate::storage::{JsonFileCollection, MemoryCollection, RecordCollection};
use crate::validation::Field;

// Check-in input, as supplied by the front desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckInRequest {
    pub localizer: String,
    pub id_card: String,
}

// Owns the three record stores and runs every transition against them.
// Each operation holds the manager's lock for its whole load-check-append
// cycle. Nothing guards against other processes writing the same files.
pub struct HotelManager {
    reservations: ReservationStore,
    stays: StayStore,
    checkouts: CheckoutStore,
    lock: Mutex<()>,
}

impl HotelManager {
    pub fn new(config: HotelConfig) -> Self {
        info!(data_dir = %config.data_dir.display(), "opening hotel stores");
        Self::from_collections(
            Box::new(JsonFileCollection::new(config.reservation_path())),
            Box::new(JsonFileCollection::new(config.stay_path())),
            Box::new(JsonFileCollection::new(config.checkout_path())),
        )
    }

    pub fn in_memory() -> Self {
        Self::from_collections(
            Box::new(MemoryCollection::new()),
            Box::new(MemoryCollection::new()),
            Box::new(MemoryCollection::new()),
        )
    }

    pub fn from_collections(
        reservations: Box<dyn RecordCollection<StoredReservation>>,
        stays: Box<dyn RecordCollection<Stay>>,
        checkouts: Box<dyn RecordCollection<CheckoutMarker>>,
    ) -> Self {
        Self {
            reservations: ReservationStore::new(reservations),
            stays: StayStore::new(stays),
            checkouts: CheckoutStore::new(checkouts),
            lock: Mutex::new(()),
        }
    }

    pub fn validate(field: Field, raw: &str) -> Result<String> {
        field.validate(raw)
    }

    // Returns the localizer of the stored reservation.
    pub fn room_reservation(
        &self,
        request: &ReservationRequest,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let reservation = Reservation::create(request, now)?;
        debug!(localizer = reservation.localizer(), "reservation built");

        let _guard = self.lock.lock();
        self.reservations.create(reservation)
    }

    // Returns the room key of the new stay.
    pub fn guest_arrival(&self, request: &CheckInRequest, now: DateTime<Utc>) -> Result<String> {
        let _guard = self.lock.lock();
        self.stays
            .check_in(&self.reservations, &request.localizer, &request.id_card, now)
    }

    // The file holds a single `{"Localizer": .., "IdCard": ..}` object.
    pub fn guest_arrival_from_file(
        &self,
        path: impl AsRef<Path>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let request: CheckInRequest = serde_json::from_str(&content).map_err(|e| {
            if e.is_data() {
                HotelManagementError::FormatError(format!("Invalid Key in JSON: {}", e))
            } else {
                HotelManagementError::FormatError(format!("{}: {}", path.display(), e))
            }
        })?;
        self.guest_arrival(&request, now)
    }

    pub fn guest_checkout(&self, room_key: &str, now: DateTime<Utc>) -> Result<bool> {
        let _guard = self.lock.lock();
        self.checkouts.check_out(&self.stays, room_key, now)
    }

    // Only a reservation that still matches its localizer is returned.
    pub fn find_reservation(&self, localizer: &str) -> Result<Reservation> {
        self.reservations.find_by_localizer(localizer)?.verify()
    }

    pub fn find_stay(&self, room_key: &str) -> Result<Stay> {
        self.stays.find_by_room_key(room_key)
    }

    pub fn find_checkout(&self, room_key: &str) -> Result<Option<CheckoutMarker>> {
        self.checkouts.find_by_room_key(room_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::tests::{booking_time, sample_request};
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::thread;

    const ID_CARD_LETTERS: &[u8] = b"TRWAGMYFPDXBNJZSQVHLCKE";

    fn id_card_for(number: u32) -> String {
        format!("{:08}{}", number, ID_CARD_LETTERS[(number % 23) as usize] as char)
    }

    fn arrival_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 13, 5, 0).unwrap()
    }

    fn departure_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 18, 11, 0, 0).unwrap()
    }

    fn check_in_request(localizer: &str) -> CheckInRequest {
        CheckInRequest {
            localizer: localizer.to_string(),
            id_card: "12345678Z".to_string(),
        }
    }

    #[test]
    fn test_full_lifecycle_on_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = HotelConfig::with_data_dir(dir.path());
        let manager = HotelManager::new(config.clone());

        let localizer = manager
            .room_reservation(&sample_request(), booking_time())
            .unwrap();
        let room_key = manager
            .guest_arrival(&check_in_request(&localizer), arrival_day())
            .unwrap();
        assert!(manager.guest_checkout(&room_key, departure_day()).unwrap());

        // A fresh manager over the same directory sees everything persisted.
        let reopened = HotelManager::new(config.clone());
        assert_eq!(reopened.find_reservation(&localizer).unwrap().localizer(), localizer);
        assert_eq!(reopened.find_stay(&room_key).unwrap().localizer(), localizer);
        assert!(reopened.find_checkout(&room_key).unwrap().is_some());

        let stays: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.stay_path()).unwrap()).unwrap();
        assert_eq!(stays[0]["room_key"], room_key.as_str());
        let checkouts: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.checkout_path()).unwrap()).unwrap();
        assert_eq!(checkouts[0]["checkout_time"], departure_day().timestamp());
    }

    #[test]
    fn test_check_in_reproduces_localizer() {
        let manager = HotelManager::in_memory();
        let localizer = manager
            .room_reservation(&sample_request(), booking_time())
            .unwrap();

        let stored = manager.reservations.find_by_localizer(&localizer).unwrap();
        let rebuilt = stored.verify().unwrap();
        assert_eq!(rebuilt.localizer(), localizer);
        assert_eq!(manager.find_reservation(&localizer).unwrap(), rebuilt);

        assert!(manager
            .guest_arrival(&check_in_request(&localizer), arrival_day())
            .is_ok());
    }

    #[test]
    fn test_checkout_rules_through_manager() {
        let manager = HotelManager::in_memory();
        let localizer = manager
            .room_reservation(&sample_request(), booking_time())
            .unwrap();
        let room_key = manager
            .guest_arrival(&check_in_request(&localizer), arrival_day())
            .unwrap();

        let day_before = departure_day() - chrono::Duration::days(1);
        assert!(matches!(
            manager.guest_checkout(&room_key, day_before),
            Err(HotelManagementError::StateError(_))
        ));
        assert!(manager.guest_checkout(&room_key, departure_day()).unwrap());
        assert!(matches!(
            manager.guest_checkout(&room_key, departure_day()),
            Err(HotelManagementError::DuplicateError(_))
        ));
    }

    #[test]
    fn test_second_reservation_for_same_id_card() {
        let manager = HotelManager::in_memory();
        manager
            .room_reservation(&sample_request(), booking_time())
            .unwrap();

        let mut other = sample_request();
        other.credit_card_number = "4111111111111111".to_string();
        other.room_type = "SINGLE".to_string();
        other.num_days = "1".to_string();
        assert!(matches!(
            manager.room_reservation(&other, booking_time()),
            Err(HotelManagementError::DuplicateError(_))
        ));
    }

    fn tamper_reservation(path: &Path, index: usize, field: &str, value: serde_json::Value) {
        let mut records: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        records[index][field] = value;
        fs::write(path, serde_json::to_string_pretty(&records).unwrap()).unwrap();
    }

    #[test]
    fn test_edited_reservation_file_is_detected() {
        let edits = [
            ("name_surname", serde_json::json!("Juan Lopez Garcia")),
            ("credit_card_number", serde_json::json!("4111111111111111")),
            ("phone_number", serde_json::json!("+349999999")),
            ("arrival_date", serde_json::json!("15/06/2025")),
            ("num_days", serde_json::json!(5)),
            ("room_type", serde_json::json!("SUITE")),
            ("reservation_timestamp", serde_json::json!(1746091801)),
            ("room_type", serde_json::json!("TRIPLE")),
            ("num_days", serde_json::json!("3")),
            ("num_days", serde_json::json!(-1)),
            ("arrival_date", serde_json::json!("2025-06-15")),
        ];

        for (field, value) in edits {
            let dir = tempfile::tempdir().unwrap();
            let config = HotelConfig::with_data_dir(dir.path());
            let manager = HotelManager::new(config.clone());

            let mut request = sample_request();
            request.arrival_date = "14/06/2025".to_string();
            if field == "arrival_date" && value == "15/06/2025" {
                // Move the arrival onto the check-in day so only the hash can object.
                request.arrival_date = "13/06/2025".to_string();
            }
            let localizer = manager.room_reservation(&request, booking_time()).unwrap();
            tamper_reservation(&config.reservation_path(), 0, field, value.clone());

            let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
            let result = manager.guest_arrival(&check_in_request(&localizer), now);
            match result {
                Err(HotelManagementError::IntegrityError(reason)) => {
                    assert!(reason.contains("manipulated"), "{} = {}: {}", field, value, reason)
                }
                other => panic!("editing {} to {} gave {:?}", field, value, other),
            }
            assert!(fs::metadata(config.stay_path()).is_err());
        }
    }

    #[test]
    fn test_tampered_record_does_not_block_other_guests() {
        let dir = tempfile::tempdir().unwrap();
        let config = HotelConfig::with_data_dir(dir.path());
        let manager = HotelManager::new(config.clone());

        let first = manager
            .room_reservation(&sample_request(), booking_time())
            .unwrap();
        let mut request = sample_request();
        request.id_card = "87654321X".to_string();
        let second = manager.room_reservation(&request, booking_time()).unwrap();

        tamper_reservation(&config.reservation_path(), 0, "room_type", serde_json::json!("TRIPLE"));

        match manager.guest_arrival(&check_in_request(&first), arrival_day()) {
            Err(HotelManagementError::IntegrityError(reason)) => {
                assert!(reason.contains("manipulated"))
            }
            other => panic!("expected integrity error, got {:?}", other),
        }

        let arrival = CheckInRequest {
            localizer: second.clone(),
            id_card: "87654321X".to_string(),
        };
        let room_key = manager.guest_arrival(&arrival, arrival_day()).unwrap();
        assert_eq!(manager.find_stay(&room_key).unwrap().localizer(), second);

        let mut late = sample_request();
        late.id_card = id_card_for(11_223_344);
        assert!(manager.room_reservation(&late, booking_time()).is_ok());
    }

    #[test]
    fn test_guest_arrival_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = HotelManager::new(HotelConfig::with_data_dir(dir.path()));
        let localizer = manager
            .room_reservation(&sample_request(), booking_time())
            .unwrap();

        let input = dir.path().join("arrival.json");
        fs::write(
            &input,
            format!(r#"{{"Localizer": "{}", "IdCard": "12345678Z"}}"#, localizer),
        )
        .unwrap();

        let room_key = manager.guest_arrival_from_file(&input, arrival_day()).unwrap();
        assert_eq!(manager.find_stay(&room_key).unwrap().id_card(), "12345678Z");
    }

    #[test]
    fn test_guest_arrival_from_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = HotelManager::in_memory();

        let missing =
            manager.guest_arrival_from_file(dir.path().join("none.json"), arrival_day());
        assert!(matches!(missing, Err(HotelManagementError::StorageError(_))));

        let wrong_key = dir.path().join("wrong_key.json");
        fs::write(&wrong_key, r#"{"Localiser": "abc", "IdCard": "12345678Z"}"#).unwrap();
        match manager.guest_arrival_from_file(&wrong_key, arrival_day()) {
            Err(HotelManagementError::FormatError(reason)) => {
                assert!(reason.starts_with("Invalid Key in JSON"))
            }
            other => panic!("expected format error, got {:?}", other),
        }

        let broken = dir.path().join("broken.json");
        fs::write(&broken, r#"{"Localizer": "abc", "IdCard"#).unwrap();
        assert!(matches!(
            manager.guest_arrival_from_file(&broken, arrival_day()),
            Err(HotelManagementError::FormatError(_))
        ));
    }

    #[test]
    fn test_check_in_request_wire_names() {
        let request: CheckInRequest =
            serde_json::from_str(r#"{"Localizer": "abc", "IdCard": "12345678Z"}"#).unwrap();
        assert_eq!(request.localizer, "abc");
        assert_eq!(request.id_card, "12345678Z");
    }

    #[test]
    fn test_validate_dispatches_on_field() {
        assert!(HotelManager::validate(Field::CreditCard, "4539148803436467").is_ok());
        assert!(HotelManager::validate(Field::RoomType, "DOUBLE").is_ok());
        assert!(HotelManager::validate(Field::RoomType, "4539148803436467").is_err());
    }

    #[test]
    fn test_concurrent_reservations_share_one_manager() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(HotelManager::new(HotelConfig::with_data_dir(dir.path())));
        let threads_count = 8;
        let reservations_per_thread = 5;

        let mut handles = vec![];
        for i in 0..threads_count {
            let manager = Arc::clone(&manager);
            handles.push(thread::spawn(move || {
                for j in 0..reservations_per_thread {
                    let mut request = sample_request();
                    request.id_card = id_card_for(10_000_000 + i * 100 + j);
                    manager.room_reservation(&request, booking_time()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let reloaded = HotelManager::new(HotelConfig::with_data_dir(dir.path()));
        let stored = reloaded.reservations.all().unwrap();
        assert_eq!(stored.len(), (threads_count * reservations_per_thread) as usize);
    }
}
