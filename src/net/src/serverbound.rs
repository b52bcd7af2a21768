//! Serverbound packet ids. Same placeholder status as `clientbound`: the
//! real id space belongs to the wire codec, out of scope here.

pub const ACCEPT_TELEPORTATION: i32 = 0;
pub const CLIENT_INFORMATION: i32 = 1;
pub const MOVE_PLAYER_POS: i32 = 2;
pub const MOVE_PLAYER_POS_ROT: i32 = 3;
pub const MOVE_PLAYER_ROT: i32 = 4;
pub const MOVE_PLAYER_STATUS_ONLY: i32 = 5;
pub const SWING: i32 = 6;
pub const USE_ITEM_ON: i32 = 7;
pub const PLAYER_ACTION: i32 = 8;
pub const SET_CARRIED_ITEM: i32 = 9;
pub const SET_CREATIVE_MODE_SLOT: i32 = 10;
pub const MOVE_VEHICLE: i32 = 11;
pub const CHAT_COMMAND: i32 = 12;

/// One past the highest id above; the dispatch table's fixed size.
pub const COUNT: usize = 13;
