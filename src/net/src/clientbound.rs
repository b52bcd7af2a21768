//! Clientbound packet ids. The real id space is owned by the wire codec
//! (out of scope); these are placeholders stable enough to exercise the
//! core end-to-end and to give `Disconnect` a recognizable id for the
//! send task's clean-shutdown check.

pub const CHUNK_LOAD: i32 = 0;
pub const CHUNK_UNLOAD: i32 = 1;
pub const SET_CHUNK_CACHE_CENTER: i32 = 2;
pub const ADD_ENTITY: i32 = 3;
pub const ADD_PLAYER: i32 = 4;
pub const REMOVE_ENTITIES: i32 = 5;
pub const MOVE_ENTITY_POS: i32 = 6;
pub const MOVE_ENTITY_ROT: i32 = 7;
pub const MOVE_ENTITY_POS_AND_ROT: i32 = 8;
pub const ROTATE_HEAD: i32 = 9;
pub const SET_ENTITY_MOTION: i32 = 10;
pub const ANIMATE: i32 = 11;
pub const PLAYER_POSITION: i32 = 12;
pub const SYSTEM_CHAT: i32 = 13;
pub const DISCONNECT: i32 = 14;
pub const SET_PLAYER_INVENTORY_SLOT: i32 = 15;
