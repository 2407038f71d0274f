//! Value objects - immutable types that represent domain concepts

mod snowflake;
mod user_pair;

pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use user_pair::UserPair;
