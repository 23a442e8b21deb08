//! Real-time delivery over WebSocket.
//!
//! [`hub::ChannelHub`] is the in-process [`skillswap_core::bus::DeliveryBus`];
//! [`socket`] upgrades HTTP connections and speaks the `{event, data}` frame
//! protocol.

pub mod hub;
pub mod socket;
