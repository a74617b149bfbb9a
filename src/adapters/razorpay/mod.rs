//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for order creation. Checkout and
//! webhook signatures are verified in the domain layer with the same
//! secrets, so this adapter only talks to the orders API.
//!
//! # Configuration
//!
//! - `ZENITH__PAYMENT__RAZORPAY_KEY_ID`: public key id (rzp_test_... / rzp_live_...)
//! - `ZENITH__PAYMENT__RAZORPAY_KEY_SECRET`: merchant key secret

mod mock_gateway;
mod razorpay_adapter;
mod wire_types;

pub use mock_gateway::MockPaymentGateway;
pub use razorpay_adapter::{RazorpayConfig, RazorpayGateway, DEFAULT_API_BASE_URL};
