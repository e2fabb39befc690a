// Reservation records and the localizer that identifies and signs them
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HotelManagementError, Result};
use crate::validation::{self, Field, ARRIVAL_DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Single,
    Double,
    Suite,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "SINGLE",
            RoomType::Double => "DOUBLE",
            RoomType::Suite => "SUITE",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = HotelManagementError;

    fn from_str(raw: &str) -> Result<Self> {
        match Field::RoomType.validate(raw)?.as_str() {
            "SINGLE" => Ok(RoomType::Single),
            "DOUBLE" => Ok(RoomType::Double),
            "SUITE" => Ok(RoomType::Suite),
            _ => Err(HotelManagementError::invalid(
                Field::RoomType,
                "Invalid roomtype value",
            )),
        }
    }
}

// Raw reservation input as received from a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub id_card: String,
    pub credit_card_number: String,
    pub name_surname: String,
    pub phone_number: String,
    pub room_type: String,
    pub arrival_date: String,
    pub num_days: String,
}

impl ReservationRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id_card: impl Into<String>,
        credit_card_number: impl Into<String>,
        name_surname: impl Into<String>,
        phone_number: impl Into<String>,
        room_type: impl Into<String>,
        arrival_date: impl Into<String>,
        num_days: impl ToString,
    ) -> Self {
        Self {
            id_card: id_card.into(),
            credit_card_number: credit_card_number.into(),
            name_surname: name_surname.into(),
            phone_number: phone_number.into(),
            room_type: room_type.into(),
            arrival_date: arrival_date.into(),
            num_days: num_days.to_string(),
        }
    }
}

// A booking. Immutable once created; the localizer is a digest of every other
// field, so any later edit to a persisted copy is detectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    id_card: String,
    credit_card_number: String,
    name_surname: String,
    phone_number: String,
    reservation_timestamp: DateTime<Utc>,
    arrival_date: NaiveDate,
    num_days: u32,
    room_type: RoomType,
    localizer: String,
}

impl Reservation {
    // Never reads the system clock. The same request and the same `now` give an
    // identical record, which is how check-in verifies stored reservations.
    pub fn create(request: &ReservationRequest, now: DateTime<Utc>) -> Result<Self> {
        let id_card = Field::IdCard.validate(&request.id_card)?;
        let name_surname = Field::NameSurname.validate(&request.name_surname)?;
        let credit_card_number = Field::CreditCard.validate(&request.credit_card_number)?;
        let arrival_date = validation::parse_arrival_date(&request.arrival_date)?;
        let num_days = u32::from(validation::validate_num_days(&request.num_days)?);
        let phone_number = Field::PhoneNumber.validate(&request.phone_number)?;
        let room_type: RoomType = request.room_type.parse()?;

        let mut reservation = Reservation {
            id_card,
            credit_card_number,
            name_surname,
            phone_number,
            reservation_timestamp: now.trunc_subsecs(0),
            arrival_date,
            num_days,
            room_type,
            localizer: String::new(),
        };
        reservation.localizer = reservation.compute_localizer();
        Ok(reservation)
    }

    // Label order and spelling are part of the persisted format; changing them
    // invalidates every stored localizer.
    fn signature_string(&self) -> String {
        format!(
            "HotelReservation:{{id_card:{},name_surname:{},credit_card:{},\
             phone_number:{},reservation_date:{},arrival_date:{},num_days:{},room_type:{}}}",
            self.id_card,
            self.name_surname,
            self.credit_card_number,
            self.phone_number,
            self.reservation_timestamp.timestamp(),
            self.arrival_date.format(ARRIVAL_DATE_FORMAT),
            self.num_days,
            self.room_type,
        )
    }

    fn compute_localizer(&self) -> String {
        hex::encode(Md5::digest(self.signature_string().as_bytes()))
    }

    pub fn localizer(&self) -> &str {
        &self.localizer
    }

    pub fn id_card(&self) -> &str {
        &self.id_card
    }

    pub fn credit_card_number(&self) -> &str {
        &self.credit_card_number
    }

    pub fn name_surname(&self) -> &str {
        &self.name_surname
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn arrival_date(&self) -> NaiveDate {
        self.arrival_date
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    pub fn reservation_timestamp(&self) -> DateTime<Utc> {
        self.reservation_timestamp
    }
}

// A reservation as it sits in the store file. Values are kept as raw JSON, so an
// edited record only fails its own localizer check and the rest of the
// collection still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReservation {
    #[serde(default)]
    id_card: Value,
    #[serde(default)]
    credit_card_number: Value,
    #[serde(default)]
    name_surname: Value,
    #[serde(default)]
    phone_number: Value,
    #[serde(default)]
    reservation_timestamp: Value,
    #[serde(default)]
    arrival_date: Value,
    #[serde(default)]
    num_days: Value,
    #[serde(default)]
    room_type: Value,
    #[serde(default)]
    localizer: Value,
}

impl From<&Reservation> for StoredReservation {
    fn from(reservation: &Reservation) -> Self {
        StoredReservation {
            id_card: Value::from(reservation.id_card.as_str()),
            credit_card_number: Value::from(reservation.credit_card_number.as_str()),
            name_surname: Value::from(reservation.name_surname.as_str()),
            phone_number: Value::from(reservation.phone_number.as_str()),
            reservation_timestamp: Value::from(reservation.reservation_timestamp.timestamp()),
            arrival_date: Value::from(
                reservation
                    .arrival_date
                    .format(ARRIVAL_DATE_FORMAT)
                    .to_string(),
            ),
            num_days: Value::from(reservation.num_days),
            room_type: Value::from(reservation.room_type.as_str()),
            localizer: Value::from(reservation.localizer.as_str()),
        }
    }
}

impl StoredReservation {
    pub fn localizer(&self) -> Option<&str> {
        self.localizer.as_str()
    }

    pub fn id_card(&self) -> Option<&str> {
        self.id_card.as_str()
    }

    // Rebuilds the reservation from the stored values and original timestamp.
    // Any value that no longer validates, or a localizer that no longer
    // matches, is reported as manipulation of this record.
    pub fn verify(&self) -> Result<Reservation> {
        let rebuilt = self.rebuild().map_err(|e| {
            HotelManagementError::IntegrityError(format!(
                "reservation has been manipulated ({})",
                e
            ))
        })?;
        if self.localizer() != Some(rebuilt.localizer()) {
            return Err(HotelManagementError::IntegrityError(
                "reservation has been manipulated".to_string(),
            ));
        }
        Ok(rebuilt)
    }

    fn rebuild(&self) -> Result<Reservation> {
        let request = ReservationRequest {
            id_card: stored_text(&self.id_card, Field::IdCard)?,
            credit_card_number: stored_text(&self.credit_card_number, Field::CreditCard)?,
            name_surname: stored_text(&self.name_surname, Field::NameSurname)?,
            phone_number: stored_text(&self.phone_number, Field::PhoneNumber)?,
            room_type: stored_text(&self.room_type, Field::RoomType)?,
            arrival_date: stored_text(&self.arrival_date, Field::ArrivalDate)?,
            num_days: match &self.num_days {
                Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
                _ => {
                    return Err(HotelManagementError::invalid(
                        Field::NumDays,
                        "Numdays should be an integer",
                    ))
                }
            },
        };
        let timestamp = self
            .reservation_timestamp
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                HotelManagementError::FormatError(
                    "reservation_timestamp is not an epoch second".to_string(),
                )
            })?;
        Reservation::create(&request, timestamp)
    }
}

fn stored_text(value: &Value, field: Field) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| HotelManagementError::invalid(field, "stored value is not a string"))
}
