//! Upstream field names and fixed defaults.

/// Column headers as published by the TWSE auction announcement API.
pub mod fields {
    pub const OPEN_DATE: &str = "開標日期";
    pub const NAME: &str = "證券名稱";
    pub const CODE: &str = "證券代號";
    pub const MARKET: &str = "發行市場";
    pub const ISSUE_TYPE: &str = "發行性質";
    pub const AUCTION_METHOD: &str = "競拍方式";
    pub const BID_START: &str = "投標開始日";
    pub const BID_END: &str = "投標結束日";
    pub const QUANTITY: &str = "競拍數量(張)";
    pub const MIN_PRICE: &str = "最低投標價格(元)";
    pub const MIN_BID_LOT: &str = "最低每標單投標數量(張)";
    pub const MAX_AWARD_LOT: &str = "最高投(得)標數量(張)";
    pub const DEPOSIT_PCT: &str = "保證金成數(%)";
    pub const HANDLING_FEE: &str = "每一投標單投標處理費(元)";
    pub const LISTING_DATE: &str = "撥券日期(上市、上櫃日期)";
    pub const LEAD_UNDERWRITER: &str = "主辦券商";
    pub const CANCEL_REASON: &str = "取消競價拍賣(流標或取消)";
}

/// Fixed display order of record fields, paired with their human labels.
///
/// Used for event descriptions and for ordering field-level diffs.
pub const FIELD_LABELS: &[(&str, &str)] = &[
    (fields::NAME, "證券名稱"),
    (fields::CODE, "證券代號"),
    (fields::MARKET, "發行市場"),
    (fields::ISSUE_TYPE, "發行性質"),
    (fields::AUCTION_METHOD, "競拍方式"),
    (fields::LEAD_UNDERWRITER, "主辦券商"),
    (fields::BID_START, "投標開始日"),
    (fields::BID_END, "投標結束日"),
    (fields::OPEN_DATE, "開標日期"),
    (fields::LISTING_DATE, "撥券日期"),
    (fields::QUANTITY, "競拍數量(張)"),
    (fields::MIN_PRICE, "最低投標價格(元)"),
    (fields::MIN_BID_LOT, "最低每標單投標數量(張)"),
    (fields::MAX_AWARD_LOT, "最高投(得)標數量(張)"),
    (fields::DEPOSIT_PCT, "保證金成數(%)"),
    (fields::HANDLING_FEE, "投標處理費(元)"),
    (fields::CANCEL_REASON, "取消原因"),
];

/// Fields whose values are quantities or prices shown without thousands separators.
pub const NUMERIC_FIELDS: &[&str] = &[
    fields::QUANTITY,
    fields::MIN_PRICE,
    fields::MIN_BID_LOT,
    fields::MAX_AWARD_LOT,
    fields::HANDLING_FEE,
];

pub const DEFAULT_SOURCE_PAGE: &str = "https://www.twse.com.tw/zh/announcement/auction.html";
pub const DEFAULT_API_BASE: &str = "https://www.twse.com.tw/rwd/zh/announcement";
pub const DEFAULT_TIMEZONE: &str = "Asia/Taipei";
pub const DEFAULT_UID_DOMAIN: &str = "twse-auction";

/// Stat text TWSE returns when a year has no announcements yet.
pub const NO_DATA_STAT: &str = "沒有符合條件的資料";

/// Most message units a webhook accepts in one call.
pub const MAX_MESSAGES_PER_DISPATCH: usize = 10;

/// Category shared by every generated event.
pub const CALENDAR_CATEGORY: &str = "TWSE競價拍賣";

/// Placeholder shown for empty values in human-readable output.
pub const EMPTY_VALUE: &str = "-";
