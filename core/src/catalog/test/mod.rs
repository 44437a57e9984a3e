use chrono::{DateTime, TimeZone, Utc};

use crate::model::Album;


pub const OWNER: &str = "selma";

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn album(folder_name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Album {
    Album {
        owner: OWNER.to_owned(),
        folder_name: folder_name.to_owned(),
        start,
        end,
    }
}
