//! HTTP endpoint implementations for the order form and admin views.

mod admin_handlers;
mod auth_handlers;
mod order_handlers;
pub mod envelope;
pub mod request_utils;

pub use admin_handlers::{
    company_area, dashboard, download_ledger, download_order_file, order_files,
    LEDGER_DOWNLOAD_NAME,
};
pub use auth_handlers::{is_authenticated, login, login_form, logout, PASSWORD_FIELD};
pub use order_handlers::{index, submit_order, ITEM_ORDER_ACCEPTED};
pub use envelope::{Envelope, ErrorBody};
