//! Draft session orchestration.

mod draft_engine;

pub use draft_engine::{ConfirmReceipt, DraftEngine};
