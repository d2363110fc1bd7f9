//! Normalization and aggregation: the pure core that turns stored records
//! into date-indexed sums, month summaries, balances, and rankings.

pub mod aggregate;
pub mod normalize;

pub use aggregate::{
    aggregate, day_summaries, month_summary, rank_categories, records_on, running_balance,
    Aggregation,
};
pub use normalize::{parse_amount, parse_date_string, DateSource, Normalizer};
