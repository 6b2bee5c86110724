//! Order lifecycle: statuses, transition rules and derived values

mod number;
mod status;

pub use number::{
    MAX_ESTIMATED_MINUTES, MIN_ESTIMATED_MINUTES, estimated_time_minutes, generate_order_number,
};
pub use status::{
    OrderStatus, PaymentMethod, PaymentStatus, TransitionParseError, TransitionTable,
    UnknownStatus,
};
