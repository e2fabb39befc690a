// Stay records created at check-in
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{HotelManagementError, Result};
use crate::reservation::{Reservation, RoomType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    id_card: String,
    num_days: u32,
    localizer: String,
    room_type: RoomType,
    room_key: String,
    #[serde(with = "departure_date_format")]
    departure_date: NaiveDate,
}

impl Stay {
    pub fn new(reservation: &Reservation, checkin_time: DateTime<Utc>) -> Result<Self> {
        let departure_date = reservation
            .arrival_date()
            .checked_add_days(Days::new(u64::from(reservation.num_days())))
            .ok_or_else(|| {
                HotelManagementError::StateError("departure date out of range".to_string())
            })?;

        let mut stay = Stay {
            id_card: reservation.id_card().to_string(),
            num_days: reservation.num_days(),
            localizer: reservation.localizer().to_string(),
            room_type: reservation.room_type(),
            room_key: String::new(),
            departure_date,
        };
        stay.room_key = stay.compute_room_key(checkin_time);
        Ok(stay)
    }

    fn compute_room_key(&self, checkin_time: DateTime<Utc>) -> String {
        let signature = format!(
            "HotelStay:{{alg:SHA-256,id_card:{},num_days:{},localizer:{},\
             room_type:{},checkin_time:{}}}",
            self.id_card,
            self.num_days,
            self.localizer,
            self.room_type,
            checkin_time.timestamp(),
        );
        hex::encode(Sha256::digest(signature.as_bytes()))
    }

    pub fn room_key(&self) -> &str {
        &self.room_key
    }

    pub fn localizer(&self) -> &str {
        &self.localizer
    }

    pub fn id_card(&self) -> &str {
        &self.id_card
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }
}

// Persisted as the epoch seconds of 00:00 UTC on the departure day.
mod departure_date_format {
    use chrono::{DateTime, NaiveDate, NaiveTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(date.and_time(NaiveTime::MIN).and_utc().timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        DateTime::from_timestamp(seconds, 0)
            .map(|instant| instant.date_naive())
            .ok_or_else(|| serde::de::Error::custom("departure date out of range"))
    }
}
