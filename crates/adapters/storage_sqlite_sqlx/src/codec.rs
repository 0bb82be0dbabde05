//! Column encoding helpers shared by the stores.

use chrono::SubsecRound;

use greencue_domain::time::{Timestamp, now, parse_rfc3339, to_sortable_string};

pub(crate) fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Current time at the precision the text columns keep.
pub(crate) fn stamp() -> Timestamp {
    now().trunc_subsecs(6)
}

pub(crate) fn encode_timestamp(ts: &Timestamp) -> String {
    to_sortable_string(ts)
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    parse_rfc3339(raw).map_err(decode_error)
}
