// Field validators for reservation, check-in and checkout input
//
// Every validator takes the raw value and returns the normalized value, or a
// ValidationError naming the field that failed.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{HotelManagementError, Result};

static ID_CARD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}[A-Z]$").expect("valid id card pattern"));
static CREDIT_CARD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16,}$").expect("valid credit card pattern"));
static NAME_SURNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]+(\s[a-zA-Z]+)+$").expect("valid name pattern")
});
static PHONE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{9}$").expect("valid phone pattern"));
// Day bound kept exactly as deployed: 30 and 31 only match with a leading '-'.
static ARRIVAL_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([0-2]\d|-3[0-1])/(0\d|1[0-2])/\d\d\d\d)$").expect("valid date pattern")
});
static LOCALIZER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{32}$").expect("valid localizer pattern"));
static ROOM_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{64}$").expect("valid room key pattern"));
static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integer pattern"));

// Control letters for identity numbers, indexed by `number % 23`.
const ID_CARD_LETTERS: &[u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";

pub const ARRIVAL_DATE_FORMAT: &str = "%d/%m/%Y";
pub const MIN_NUM_DAYS: i64 = 1;
pub const MAX_NUM_DAYS: i64 = 10;
const NAME_MIN_LEN: usize = 10;
const NAME_MAX_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    IdCard,
    CreditCard,
    NameSurname,
    PhoneNumber,
    ArrivalDate,
    NumDays,
    RoomType,
    Localizer,
    RoomKey,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::IdCard => "id card",
            Field::CreditCard => "credit card number",
            Field::NameSurname => "name and surname",
            Field::PhoneNumber => "phone number",
            Field::ArrivalDate => "arrival date",
            Field::NumDays => "number of days",
            Field::RoomType => "room type",
            Field::Localizer => "localizer",
            Field::RoomKey => "room key",
        };
        f.write_str(name)
    }
}

impl Field {
    pub fn validate(&self, raw: &str) -> Result<String> {
        match self {
            Field::IdCard => validate_id_card(raw),
            Field::CreditCard => validate_credit_card(raw),
            Field::NameSurname => validate_name_surname(raw),
            Field::PhoneNumber => {
                matching(*self, &PHONE_NUMBER_PATTERN, raw, "Invalid phone number format")
            }
            Field::ArrivalDate => {
                matching(*self, &ARRIVAL_DATE_PATTERN, raw, "Invalid date format")
            }
            Field::NumDays => validate_num_days(raw).map(|days| days.to_string()),
            Field::RoomType => match raw {
                "SINGLE" | "DOUBLE" | "SUITE" => Ok(raw.to_string()),
                _ => Err(HotelManagementError::invalid(*self, "Invalid roomtype value")),
            },
            Field::Localizer => matching(*self, &LOCALIZER_PATTERN, raw, "Invalid localizer"),
            Field::RoomKey => matching(*self, &ROOM_KEY_PATTERN, raw, "Invalid room key format"),
        }
    }
}

fn matching(field: Field, pattern: &Regex, raw: &str, message: &str) -> Result<String> {
    if pattern.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(HotelManagementError::invalid(field, message))
    }
}

fn validate_id_card(raw: &str) -> Result<String> {
    let value = matching(Field::IdCard, &ID_CARD_PATTERN, raw, "Invalid IdCard format")?;
    // The pattern guarantees eight ASCII digits followed by one letter.
    let number: u32 = value[..8]
        .parse()
        .map_err(|_| HotelManagementError::invalid(Field::IdCard, "Invalid IdCard format"))?;
    let expected = ID_CARD_LETTERS[(number % 23) as usize];
    if value.as_bytes()[8] != expected {
        return Err(HotelManagementError::invalid(
            Field::IdCard,
            "Invalid IdCard letter",
        ));
    }
    Ok(value)
}

fn validate_credit_card(raw: &str) -> Result<String> {
    let value = matching(
        Field::CreditCard,
        &CREDIT_CARD_PATTERN,
        raw,
        "Invalid credit card format",
    )?;
    if !luhn_checksum_valid(&value) {
        return Err(HotelManagementError::invalid(
            Field::CreditCard,
            "Invalid credit card number (not luhn)",
        ));
    }
    Ok(value)
}

// Luhn check over a string of ASCII digits, counting positions from the right.
pub fn luhn_checksum_valid(digits: &str) -> bool {
    let mut checksum = 0u32;
    for (position, c) in digits.chars().rev().enumerate() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        if position % 2 == 0 {
            checksum += digit;
        } else {
            let doubled = digit * 2;
            checksum += doubled / 10 + doubled % 10;
        }
    }
    checksum % 10 == 0
}

fn validate_name_surname(raw: &str) -> Result<String> {
    let length = raw.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&length) || !NAME_SURNAME_PATTERN.is_match(raw) {
        return Err(HotelManagementError::invalid(
            Field::NameSurname,
            "Invalid name format",
        ));
    }
    Ok(raw.to_string())
}

// A non-integer is a datatype error. Any integer outside 1-10 is a range error,
// including one too large for i64.
pub fn validate_num_days(raw: &str) -> Result<u8> {
    let raw = raw.trim();
    if !INTEGER_PATTERN.is_match(raw) {
        return Err(HotelManagementError::invalid(
            Field::NumDays,
            "Invalid num_days datatype",
        ));
    }
    match raw.parse::<i64>() {
        Ok(days) if (MIN_NUM_DAYS..=MAX_NUM_DAYS).contains(&days) => Ok(days as u8),
        _ => Err(HotelManagementError::invalid(
            Field::NumDays,
            "Numdays should be in the range 1-10",
        )),
    }
}

// The pattern alone lets through days that do not exist.
pub fn parse_arrival_date(raw: &str) -> Result<NaiveDate> {
    let value = Field::ArrivalDate.validate(raw)?;
    NaiveDate::parse_from_str(&value, ARRIVAL_DATE_FORMAT).map_err(|_| {
        HotelManagementError::invalid(Field::ArrivalDate, "Date does not exist in the calendar")
    })
}
