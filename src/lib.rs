// Hotel booking library: reservations, check-in and checkout backed by
// content-hashed, append-only record stores

pub mod checkout_store;
pub mod config;
pub mod error;
pub mod manager;
pub mod reservation;
pub mod reservation_store;
pub mod stay;
pub mod stay_store;
pub mod storage;
pub mod validation;

// Re-export key types for convenience
pub use checkout_store::{CheckoutMarker, CheckoutStore};
pub use config::HotelConfig;
pub use error::{HotelManagementError, Result};
pub use manager::{CheckInRequest, HotelManager};
pub use reservation::{Reservation, ReservationRequest, RoomType, StoredReservation};
pub use reservation_store::ReservationStore;
pub use stay::Stay;
pub use stay_store::StayStore;
pub use storage::{JsonFileCollection, MemoryCollection, RecordCollection};
pub use validation::Field;
