// Store locations for the file-backed manager
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelConfig {
    pub data_dir: PathBuf,
    pub reservation_file: String,
    pub stay_file: String,
    pub checkout_file: String,
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("store"),
            reservation_file: "store_reservation.json".to_string(),
            stay_file: "store_check_in.json".to_string(),
            checkout_file: "store_check_out.json".to_string(),
        }
    }
}

impl HotelConfig {
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn reservation_path(&self) -> PathBuf {
        self.data_dir.join(&self.reservation_file)
    }

    pub fn stay_path(&self) -> PathBuf {
        self.data_dir.join(&self.stay_file)
    }

    pub fn checkout_path(&self) -> PathBuf {
        self.data_dir.join(&self.checkout_file)
    }
}
