mod history;
mod index;
mod item;
mod record_store;

pub use self::history::{
    action_type, Action, ActionHistory, MAX_ACTION_ITEM_NAME_LEN, MAX_ACTION_TYPE_LEN,
    MAX_STACK_SIZE,
};
pub use self::index::{bucket_for, IndexOperation, IndexStats, KeywordIndex, HASH_TABLE_SIZE};
pub use self::item::{
    Item, ItemBuilder, ItemId, ItemType, MAX_CATEGORY_LEN, MAX_COLOR_LEN, MAX_CONTACT_LEN,
    MAX_DATE_LEN, MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_NAME_LEN,
};
pub use self::record_store::{Iter, RecordStore};
