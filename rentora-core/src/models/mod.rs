mod auth;
mod category_area;
mod room;
mod special_price;

pub use auth::{AuthSession, AuthUser, LoginRequest, Role, RoleParseError};
pub use category_area::CategoryArea;
pub use room::{ExistingRoom, ImageSource, Room, RoomDraft};
pub use special_price::{NewSpecialPrice, RoomSpecialPrices, SpecialPrice, SpecialPriceUpdate};
