pub mod notification_record;

pub use notification_record::{
    ListRecentNotifications, NotificationRecord, canonical_json, new_notification_id,
};
