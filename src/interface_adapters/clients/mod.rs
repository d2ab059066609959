pub mod rooms;

pub use rooms::{RoomDescriptor, RoomsClient, RoomsClientError};
