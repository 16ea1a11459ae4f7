pub mod prefix_coded;

pub use prefix_coded::{encode_all_precisions, encode_i64, PrefixCoded, PrefixCodedError};

/// Precision step used when indexing date values: terms at shifts 0, 16, 32 and 48.
pub const DATE_PRECISION_STEP: u32 = 16;
