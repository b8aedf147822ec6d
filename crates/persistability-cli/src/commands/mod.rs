pub mod migrate;
pub mod status;
pub mod unit;
pub mod verify;
